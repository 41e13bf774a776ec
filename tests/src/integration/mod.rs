//! # Integration Scenarios
//!
//! Each module drives the engine through its public ports only, with the
//! in-memory adapters standing in for the chain, the state and the clock.

pub mod batch;
pub mod seal;
pub mod uncles;
