//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports, used by tests, tooling
//! and single-process development networks.

mod memory_chain;
mod memory_state;
mod reference_pow;
mod time;

pub use memory_chain::InMemoryChain;
pub use memory_state::InMemoryState;
pub use reference_pow::ReferencePowProvider;
pub use time::FixedTimeSource;
