//! # Quantum-Chain PoW Consensus Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks
//! │   └── consensus_benchmarks.rs
//! └── src/
//!     ├── fixtures.rs   # Engines, chain builders, jittery chain view
//!     └── integration/  # Multi-block scenarios
//!         ├── batch.rs
//!         ├── rewards.rs
//!         ├── seal.rs
//!         └── uncles.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # By category
//! cargo test -p qc-tests integration::batch::
//! cargo test -p qc-tests integration::rewards::
//!
//! # With engine logs
//! RUST_LOG=qc_08_pow_consensus=debug cargo test -p qc-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
