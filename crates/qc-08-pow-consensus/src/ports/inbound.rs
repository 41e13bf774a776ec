//! Driving ports (Inbound API)

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use num_bigint::BigUint;
use shared_types::{Address, Block, ContractResult, Hash, Header, Receipt, ShardBlockInfo};

use crate::domain::AbortHandle;
use crate::error::ConsensusResult;
use crate::ports::{ChainReader, StateMutator};

/// Handle to an in-flight batch header verification
///
/// Results arrive on `results` strictly in input order. Dropping `results`
/// stops the batch as if [`AbortHandle::abort`] had been called.
pub struct BatchVerification {
    /// Cancels the batch
    pub abort: AbortHandle,
    /// One result per header, in input order
    pub results: Receiver<ConsensusResult<()>>,
}

impl BatchVerification {
    /// Split into the abort handle and the ordered result stream.
    pub fn into_parts(self) -> (AbortHandle, Receiver<ConsensusResult<()>>) {
        (self.abort, self.results)
    }
}

/// Primary consensus engine API
///
/// Everything except [`ConsensusEngine::verify_headers`] runs synchronously
/// on the caller's thread.
pub trait ConsensusEngine: Send + Sync {
    /// Address credited with the block reward
    fn author(&self, header: &Header) -> Address;

    /// Verify a single header against the chain it extends.
    fn verify_header(&self, chain: &dyn ChainReader, header: &Header, seal: bool)
        -> ConsensusResult<()>;

    /// Verify a batch of headers concurrently.
    ///
    /// `seals[i]` selects seal verification for `headers[i]`; missing entries
    /// default to `true`.
    fn verify_headers(
        &self,
        chain: Arc<dyn ChainReader>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> BatchVerification;

    /// Verify the uncle set of a block.
    fn verify_uncles(&self, chain: &dyn ChainReader, block: &Block) -> ConsensusResult<()>;

    /// Verify the proof-of-work seal of a header using the light cache.
    fn verify_seal(&self, chain: &dyn ChainReader, header: &Header) -> ConsensusResult<()>;

    /// Fill in the difficulty of a header about to be mined.
    fn prepare(&self, chain: &dyn ChainReader, header: &mut Header) -> ConsensusResult<()>;

    /// Pay rewards, set the state root and assemble the block.
    fn finalize(
        &self,
        chain: &dyn ChainReader,
        header: Header,
        state: &mut dyn StateMutator,
        shard_blocks: Vec<ShardBlockInfo>,
        results: Vec<ContractResult>,
        receipts: Vec<Receipt>,
    ) -> Block;

    /// Difficulty a child of `parent` created at `time` must have
    fn calc_difficulty(&self, chain: &dyn ChainReader, time: u64, parent: &Header) -> BigUint;

    /// Hash of the header without its seal fields
    fn seal_hash(&self, header: &Header) -> Hash;
}
