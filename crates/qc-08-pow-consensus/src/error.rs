//! Error types for the PoW consensus engine
//!
//! Every error is terminal for the header or block under test; nothing is
//! retried internally.

use num_bigint::BigUint;
use shared_types::Hash;
use thiserror::Error;

/// Result type alias for consensus operations
pub type ConsensusResult<T> = std::result::Result<T, ConsensusError>;

/// Consensus validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    /// Parent (or another referenced ancestor) could not be resolved
    #[error("unknown ancestor")]
    UnknownAncestor,

    /// Timestamp too far ahead of local time
    #[error("block in the future: timestamp {timestamp}, local time {now}")]
    FutureBlock {
        /// Header timestamp
        timestamp: u64,
        /// Local time at verification
        now: u64,
    },

    /// Uncle timestamp above the absolute cap
    #[error("timestamp too big")]
    LargeBlockTime,

    /// Timestamp not strictly after the parent's
    #[error("timestamp equals parent's")]
    ZeroBlockTime,

    /// Extra-data section longer than allowed
    #[error("extra-data too long: {size} > {limit}")]
    ExtraDataTooLong {
        /// Actual length
        size: usize,
        /// Maximum length
        limit: usize,
    },

    /// Declared difficulty differs from the protocol difficulty
    #[error("invalid difficulty: have {have}, want {want}")]
    InvalidDifficulty {
        /// Declared difficulty
        have: BigUint,
        /// Computed difficulty
        want: BigUint,
    },

    /// Zero difficulty on a header whose seal is being checked
    #[error("non-positive difficulty")]
    NonPositiveDifficulty,

    /// Gas limit above 2^63 - 1
    #[error("invalid gasLimit: have {have}, max {max}")]
    GasLimitTooHigh {
        /// Declared gas limit
        have: u64,
        /// Protocol maximum
        max: u64,
    },

    /// Gas used above gas limit
    #[error("invalid gasUsed: have {gas_used}, gasLimit {gas_limit}")]
    GasUsedExceedsLimit {
        /// Declared gas used
        gas_used: u64,
        /// Declared gas limit
        gas_limit: u64,
    },

    /// Gas limit moved too far from the parent's, or below the minimum
    #[error("invalid gas limit: have {have}, want {parent} += {bound}")]
    InvalidGasLimit {
        /// Declared gas limit
        have: u64,
        /// Parent gas limit
        parent: u64,
        /// Allowed movement (exclusive)
        bound: u64,
    },

    /// Block number is not parent + 1
    #[error("invalid block number: have {have}, parent {parent}")]
    InvalidNumber {
        /// Declared number
        have: u64,
        /// Parent number
        parent: u64,
    },

    /// Recomputed mix digest differs from the header's
    #[error("invalid mix digest")]
    InvalidMixDigest,

    /// PoW result above the difficulty target
    #[error("invalid proof-of-work")]
    InvalidPoW,

    /// Engine has no way to recompute seals
    #[error("no PoW data provider configured")]
    SealBackendMissing,

    /// Verification of this header panicked (for example in the chain reader)
    #[error("header verification panicked")]
    VerificationPanicked,

    /// More uncles than allowed
    #[error("too many uncles: {count} > {limit}")]
    TooManyUncles {
        /// Uncles in the block
        count: usize,
        /// Maximum allowed
        limit: usize,
    },

    /// Uncle already included (or is the block itself)
    #[error("duplicate uncle")]
    DuplicateUncle,

    /// Uncle is a direct ancestor of the block
    #[error("uncle is ancestor")]
    UncleIsAncestor,

    /// Uncle's parent is outside the window or is the block's own parent
    #[error("uncle's parent is not ancestor")]
    DanglingUncle,

    /// Fork-specific header rule violated
    #[error(transparent)]
    Fork(#[from] ForkError),
}

impl ConsensusError {
    /// Error raised by seal verification
    pub fn is_seal_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidMixDigest
                | Self::InvalidPoW
                | Self::NonPositiveDifficulty
                | Self::SealBackendMissing
        )
    }

    /// Error raised by uncle-set legality checks
    pub fn is_uncle_failure(&self) -> bool {
        matches!(
            self,
            Self::TooManyUncles { .. }
                | Self::DuplicateUncle
                | Self::UncleIsAncestor
                | Self::DanglingUncle
        )
    }
}

/// Hard-fork header rule violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForkError {
    /// Pro-fork node saw a header without the DAO marker in the fork window
    #[error("bad DAO pro-fork extra-data")]
    BadProDaoExtra,

    /// No-fork node saw a header carrying the DAO marker in the fork window
    #[error("bad DAO no-fork extra-data")]
    BadNoDaoExtra,

    /// Header at the EIP-150 height does not match the pinned hash
    #[error("homestead gas reprice fork at {number}: have 0x{}, want 0x{}", hex::encode(.have), hex::encode(.want))]
    BadForkHash {
        /// Fork height
        number: u64,
        /// Header hash
        have: Hash,
        /// Pinned hash
        want: Hash,
    },
}
