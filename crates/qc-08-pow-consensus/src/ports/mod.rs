//! Ports layer (Hexagonal Architecture)
//!
//! Inbound: the engine API driven by the chain manager and miner.
//! Outbound: chain view, PoW data, state database and clock.

mod inbound;
mod outbound;

pub use inbound::*;
pub use outbound::*;
