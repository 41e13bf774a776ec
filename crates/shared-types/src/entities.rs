//! # Core Domain Entities
//!
//! Defines the chain entities shared by the consensus engine and the chain
//! manager.
//!
//! ## Clusters
//!
//! - **Chain**: `Header`, `Block`, `BlockBody`
//! - **Sharding**: `ShardBlockInfo`, `ShardState`, shard enablement bitmap
//! - **Execution**: `Receipt`, `ContractResult`

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

// Re-export U256 from primitive-types for balance arithmetic across crates
pub use primitive_types::U256;

use crate::encoding;

// =============================================================================
// CLUSTER A: PRIMITIVES
// =============================================================================

/// A 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// Shard identifier. [`SHARD_MASTER`] is reserved for the master chain.
pub type ShardId = u16;

/// Shard identifier of the master chain.
pub const SHARD_MASTER: ShardId = u16::MAX;

/// Size of the logs bloom in bytes.
pub const BLOOM_BYTE_LENGTH: usize = 256;

/// A 2048-bit logs bloom.
pub type Bloom = [u8; BLOOM_BYTE_LENGTH];

/// An 8-byte proof-of-work nonce, big-endian.
pub type BlockNonce = [u8; 8];

/// Number of bytes in the shard enablement bitmap (256 addressable shards).
pub const SHARD_BITMAP_BYTES: usize = 32;

/// Bitmap of enabled shards; bit `i` of byte `s` enables shard `8 * s + i`.
pub type ShardBitmap = [u8; SHARD_BITMAP_BYTES];

/// The all-zero hash.
pub const ZERO_HASH: Hash = [0u8; 32];

// =============================================================================
// CLUSTER B: SHARD LEDGER
// =============================================================================

/// Per-shard reward ledger entry carried from master header to master header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShardState {
    /// Shard this entry belongs to.
    pub shard_id: ShardId,
    /// Highest shard block number rewarded so far.
    pub block_number: u64,
    /// Reward units not yet paid out to the shard's miners.
    pub reward_remains: u64,
}

impl ShardState {
    /// Create a ledger entry.
    pub fn new(shard_id: ShardId, block_number: u64, reward_remains: u64) -> Self {
        Self {
            shard_id,
            block_number,
            reward_remains,
        }
    }
}

/// Reference to a shard block included by a master block.
///
/// Produced by the shard chains and consumed by the master finalizer. Never
/// mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardBlockInfo {
    /// Shard the block was mined on.
    pub shard_id: ShardId,
    /// Height of the block on its shard chain.
    pub block_number: u64,
    /// Hash of the shard block.
    pub block_hash: Hash,
    /// Miner to be rewarded for the shard block.
    pub coinbase: Address,
    /// Opaque execution result payload.
    pub result: Vec<u8>,
}

impl ShardBlockInfo {
    /// Create a shard block reference with an empty result payload.
    pub fn new(shard_id: ShardId, block_number: u64, coinbase: Address) -> Self {
        Self {
            shard_id,
            block_number,
            block_hash: ZERO_HASH,
            coinbase,
            result: Vec::new(),
        }
    }
}

// =============================================================================
// CLUSTER C: EXECUTION OUTPUTS
// =============================================================================

/// Transaction receipt recorded on the master chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Receipt {
    /// Hash of the transaction this receipt belongs to.
    pub tx_hash: Hash,
    /// Execution succeeded.
    pub status: bool,
    /// Gas used by the block up to and including this transaction.
    pub cumulative_gas_used: u64,
}

/// Contract execution result recorded on a shard chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContractResult {
    /// Hash of the transaction that produced the result.
    pub tx_hash: Hash,
    /// Opaque result payload.
    pub payload: Vec<u8>,
}

// =============================================================================
// CLUSTER D: THE CHAIN
// =============================================================================

/// Block header for both the master chain and the shard chains.
///
/// A header is owned and freely mutable while a block is being assembled
/// (difficulty, state root and shard ledger are filled in by the engine).
/// Once sealed it is shared immutably, e.g. as `Arc<[Header]>` in batch
/// verification.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Hash of the parent block.
    pub parent_hash: Hash,
    /// Hash of the RLP-encoded uncle list.
    pub uncle_hash: Hash,
    /// Address credited with the block reward.
    pub coinbase: Address,
    /// State root after applying this block.
    pub root: Hash,
    /// Transaction trie root.
    pub tx_hash: Hash,
    /// Receipt trie root.
    pub receipt_hash: Hash,
    /// Logs bloom.
    #[serde_as(as = "Bytes")]
    pub bloom: Bloom,
    /// Proof-of-work difficulty.
    pub difficulty: BigUint,
    /// Block height.
    pub number: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas used by the block's transactions.
    pub gas_used: u64,
    /// Unix timestamp in seconds.
    pub time: u64,
    /// Free-form extra data.
    pub extra: Vec<u8>,
    /// Proof-of-work mix digest.
    pub mix_digest: Hash,
    /// Proof-of-work nonce.
    pub nonce: BlockNonce,
    /// Shard this header belongs to ([`SHARD_MASTER`] for the master chain).
    pub shard_id: ShardId,
    /// Shards enabled as of this header.
    pub shard_enabled: ShardBitmap,
    /// Per-shard reward ledger (master headers only).
    pub shard_state: Vec<ShardState>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            parent_hash: ZERO_HASH,
            uncle_hash: encoding::empty_uncle_hash(),
            coinbase: [0u8; 20],
            root: ZERO_HASH,
            tx_hash: ZERO_HASH,
            receipt_hash: ZERO_HASH,
            bloom: [0u8; BLOOM_BYTE_LENGTH],
            difficulty: BigUint::default(),
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            time: 0,
            extra: Vec::new(),
            mix_digest: ZERO_HASH,
            nonce: [0u8; 8],
            shard_id: SHARD_MASTER,
            shard_enabled: [0u8; SHARD_BITMAP_BYTES],
            shard_state: Vec::new(),
        }
    }
}

impl Header {
    /// Keccak-256 hash of the full RLP encoding, seal fields included.
    pub fn hash(&self) -> Hash {
        encoding::keccak256(&rlp::encode(self))
    }

    /// True for master chain headers.
    pub fn is_master(&self) -> bool {
        self.shard_id == SHARD_MASTER
    }

    /// The proof-of-work nonce as an integer.
    pub fn nonce_u64(&self) -> u64 {
        u64::from_be_bytes(self.nonce)
    }

    /// Store `nonce` big-endian into the seal field.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce.to_be_bytes();
    }

    /// Check whether `shard` is enabled in this header's bitmap.
    pub fn is_shard_enabled(&self, shard: ShardId) -> bool {
        let (byte, bit) = (shard as usize / 8, shard as usize % 8);
        byte < SHARD_BITMAP_BYTES && self.shard_enabled[byte] & (1 << bit) != 0
    }

    /// Set the enablement bit for `shard`. Out-of-range ids are ignored.
    pub fn enable_shard(&mut self, shard: ShardId) {
        let (byte, bit) = (shard as usize / 8, shard as usize % 8);
        if byte < SHARD_BITMAP_BYTES {
            self.shard_enabled[byte] |= 1 << bit;
        }
    }

    /// Look up the carried ledger entry for `shard`.
    pub fn shard_state_of(&self, shard: ShardId) -> Option<&ShardState> {
        self.shard_state.iter().find(|s| s.shard_id == shard)
    }
}

/// Chain-specific block contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockBody {
    /// Master chain block: shard block references and receipts.
    Master {
        /// Shard blocks referenced (and rewarded) by this master block.
        shard_blocks: Vec<ShardBlockInfo>,
        /// Transaction receipts.
        receipts: Vec<Receipt>,
    },
    /// Shard chain block: contract execution results.
    Shard {
        /// Contract execution results.
        results: Vec<ContractResult>,
    },
}

/// A block on either the master chain or a shard chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The block header.
    pub header: Header,
    /// Uncle headers included by this block.
    pub uncles: Vec<Header>,
    /// Chain-specific contents.
    pub body: BlockBody,
}

impl Block {
    /// Assemble a master chain block.
    pub fn master(header: Header, shard_blocks: Vec<ShardBlockInfo>, receipts: Vec<Receipt>) -> Self {
        Self {
            header,
            uncles: Vec::new(),
            body: BlockBody::Master {
                shard_blocks,
                receipts,
            },
        }
    }

    /// Assemble a shard chain block.
    pub fn shard(header: Header, results: Vec<ContractResult>) -> Self {
        Self {
            header,
            uncles: Vec::new(),
            body: BlockBody::Shard { results },
        }
    }

    /// Attach uncles, updating the header's uncle hash to match.
    pub fn with_uncles(mut self, uncles: Vec<Header>) -> Self {
        self.header.uncle_hash = encoding::uncle_hash(&uncles);
        self.uncles = uncles;
        self
    }

    /// Hash of the block header.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Block height.
    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Parent block hash.
    pub fn parent_hash(&self) -> Hash {
        self.header.parent_hash
    }

    /// Shard block references; empty for shard chain blocks.
    pub fn shard_blocks(&self) -> &[ShardBlockInfo] {
        match &self.body {
            BlockBody::Master { shard_blocks, .. } => shard_blocks,
            BlockBody::Shard { .. } => &[],
        }
    }

    /// Contract results; empty for master chain blocks.
    pub fn results(&self) -> &[ContractResult] {
        match &self.body {
            BlockBody::Shard { results } => results,
            BlockBody::Master { .. } => &[],
        }
    }
}
