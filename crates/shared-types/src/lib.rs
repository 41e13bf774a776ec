//! # Shared Types Crate
//!
//! Chain entities shared by the PoW consensus engine and the collaborators
//! that feed it (chain manager, miner, shard chains).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: headers, blocks and the shard reward ledger
//!   are defined once, here.
//! - **Canonical Encoding**: every hash is Keccak-256 over the RLP encoding
//!   produced by [`encoding`].
//! - **Owned Headers**: headers are plain owned values, mutated only while a
//!   block is assembled and shared immutably afterwards.

pub mod encoding;
pub mod entities;

pub use encoding::{empty_uncle_hash, keccak256, uncle_hash};
pub use entities::*;
