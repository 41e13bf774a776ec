//! Domain layer for PoW consensus
//!
//! Pure rules, no threads and no I/O:
//! - difficulty: era-dependent difficulty adjustment
//! - header_validation: field checks against the parent
//! - forks: DAO and EIP-150 header rules
//! - seal: seal hash and PoW acceptance
//! - uncles: uncle set legality
//! - rewards: master/shard reward accumulation
//! - reorder: ordered delivery for batch verification

mod difficulty;
mod forks;
mod header_validation;
mod reorder;
mod rewards;
mod seal;
mod uncles;

pub use difficulty::*;
pub use forks::*;
pub use header_validation::*;
pub use reorder::*;
pub use rewards::*;
pub use seal::*;
pub use uncles::*;
