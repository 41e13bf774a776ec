//! # Quantum Chain - PoW Consensus Engine (Subsystem 8)
//!
//! **Bounded Context:** Proof-of-Work Consensus for a sharded chain
//! **Architecture Compliance:** DDD + Hexagonal + TDD
//!
//! ## Purpose
//!
//! Decides whether master and shard chain headers are valid and settles the
//! rewards of every master block:
//! - Era-dependent difficulty adjustment (Frontier, Homestead, Byzantium,
//!   Constantinople) with the delayed difficulty bomb
//! - Header validation against the parent and the local clock
//! - Concurrent batch verification with in-order results and cancellation
//! - Uncle legality over a seven-generation window
//! - Seal verification through a pluggable memory-hard hash provider
//! - Master rewards plus per-shard reward budgets carried header to header
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Adapters (Outer)                                   │
//! │  - InMemoryChain, InMemoryState                     │
//! │  - ReferencePowProvider, FixedTimeSource            │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports (Middle)                                     │
//! │  - Inbound: ConsensusEngine                         │
//! │  - Outbound: ChainReader, PowDataProvider,          │
//! │              StateMutator, TimeSource               │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (Inner - Pure Logic)                        │
//! │  - calc_difficulty, ValidationContext               │
//! │  - seal_hash, verify_uncles, accumulate_rewards     │
//! │  - ReorderBuffer                                    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Critical Invariants
//!
//! 1. **Number**: `header.number == parent.number + 1`
//! 2. **Timestamp**: strictly increasing, at most 15s ahead of local time
//! 3. **Difficulty**: equals [`domain::calc_difficulty`] for the parent
//! 4. **Gas**: `gas_used <= gas_limit <= 2^63 - 1`, limited movement
//! 5. **Uncles**: at most two, never repeated, parent within the window
//! 6. **Rewards**: a shard is never paid more than its remaining budget
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use qc_08_pow_consensus::{ConsensusEngine, EngineConfig, PowEngine};
//! use qc_08_pow_consensus::adapters::{InMemoryChain, ReferencePowProvider};
//!
//! let engine = PowEngine::new(EngineConfig::default(), Arc::new(ReferencePowProvider::new()));
//! let chain: Arc<dyn ChainReader> = Arc::new(InMemoryChain::new(Default::default()));
//!
//! let (abort, results) = engine.verify_headers(chain, headers, seals).into_parts();
//! for result in results {
//!     result?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use config::{ChainConfig, EngineConfig, PowMode, ProtocolParams};
pub use domain::{AbortHandle, DifficultyEra, RewardOutcome, ShardPayout};
pub use error::{ConsensusError, ConsensusResult, ForkError};
pub use metrics::{Metrics, MetricsSnapshot};
pub use ports::{
    BatchVerification, ChainReader, ConsensusEngine, PowCache, PowDataProvider, PowDataset,
    PowOutput, StateMutator, SystemTimeSource, TimeSource,
};
pub use service::PowEngine;
