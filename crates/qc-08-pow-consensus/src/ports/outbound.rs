//! Driven ports (Outbound dependencies)
//!
//! Collaborators the engine reads from or writes through. None of them are
//! implemented by the engine itself; see [`crate::adapters`] for in-memory
//! reference implementations.

use std::sync::Arc;

use primitive_types::U256;
use shared_types::{Address, Block, Hash, Header};

use crate::config::ChainConfig;

/// Read-only view of the local chain
///
/// Shared by every batch verification worker, so implementations must allow
/// concurrent reads.
pub trait ChainReader: Send + Sync {
    /// Chain rules of this network
    fn config(&self) -> &ChainConfig;

    /// Current head header
    fn current_header(&self) -> Header;

    /// Header with `hash` at height `number`, if known
    fn get_header(&self, hash: &Hash, number: u64) -> Option<Header>;

    /// Block with `hash` at height `number`, if known
    fn get_block(&self, hash: &Hash, number: u64) -> Option<Block>;
}

/// Output of the memory-hard hashing primitive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowOutput {
    /// Mix digest, compared against the header's declared digest
    pub digest: Hash,
    /// Final hash, compared against the difficulty target
    pub result: Hash,
}

/// Verification cache for one epoch
#[derive(Clone, Debug)]
pub struct PowCache {
    /// Epoch the cache was generated for
    pub epoch: u64,
    /// Cache contents
    pub bytes: Arc<[u8]>,
}

impl PowCache {
    /// Wrap generated cache bytes.
    pub fn new(epoch: u64, bytes: Arc<[u8]>) -> Self {
        Self { epoch, bytes }
    }

    /// The cache holds usable data.
    pub fn generated(&self) -> bool {
        !self.bytes.is_empty()
    }
}

/// Full mining dataset for one epoch
#[derive(Clone, Debug)]
pub struct PowDataset {
    /// Epoch the dataset belongs to
    pub epoch: u64,
    /// Dataset contents, `None` while generation is still in progress
    pub bytes: Option<Arc<[u8]>>,
}

impl PowDataset {
    /// A materialized dataset.
    pub fn ready(epoch: u64, bytes: Arc<[u8]>) -> Self {
        Self {
            epoch,
            bytes: Some(bytes),
        }
    }

    /// A dataset whose generation has not finished.
    pub fn pending(epoch: u64) -> Self {
        Self { epoch, bytes: None }
    }

    /// The dataset has been fully generated.
    pub fn generated(&self) -> bool {
        self.bytes.is_some()
    }
}

/// Provider of PoW verification inputs and the hashing primitive
///
/// Cache and dataset generation happen behind this port; the engine only
/// picks the light or full path and checks the outputs.
pub trait PowDataProvider: Send + Sync {
    /// Light verification cache for `epoch`
    fn cache(&self, epoch: u64) -> PowCache;

    /// Full dataset for `epoch`; may still be pending. `prefer_full` asks the
    /// provider to start generation if it has not yet.
    fn dataset(&self, epoch: u64, prefer_full: bool) -> PowDataset;

    /// Dataset size in bytes for `epoch`
    fn dataset_size(&self, epoch: u64) -> u64;

    /// Light (cache-backed) hashing
    fn hashimoto_light(&self, size: u64, cache: &PowCache, seal_hash: &Hash, nonce: u64)
        -> PowOutput;

    /// Full (dataset-backed) hashing
    fn hashimoto_full(&self, dataset: &PowDataset, seal_hash: &Hash, nonce: u64) -> PowOutput;
}

/// State database mutations needed at finalization
pub trait StateMutator {
    /// Credit `amount` wei to `address`
    fn add_balance(&mut self, address: &Address, amount: U256);

    /// State root after pending changes; `delete_empty` enables EIP-158 cleanup
    fn intermediate_root(&mut self, delete_empty: bool) -> Hash;
}

/// Time source for future-block checks
pub trait TimeSource: Send + Sync {
    /// Get current unix timestamp in seconds
    fn now(&self) -> u64;
}

/// Default time source using system time
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
