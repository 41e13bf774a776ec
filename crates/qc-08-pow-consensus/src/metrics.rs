//! Engine counters
//!
//! Lock-free counters shared by the engine and its batch workers. Read them
//! through [`Metrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ConsensusError;

/// Thread-safe counters for consensus operations
#[derive(Debug, Default)]
pub struct Metrics {
    /// Headers that passed verification
    pub headers_verified: AtomicU64,
    /// Headers that failed verification
    pub headers_rejected: AtomicU64,
    /// Seals recomputed or simulated
    pub seals_checked: AtomicU64,
    /// Seals that failed
    pub seals_rejected: AtomicU64,
    /// Blocks whose uncle set was rejected
    pub uncles_rejected: AtomicU64,
    /// Blocks finalized
    pub blocks_finalized: AtomicU64,
    /// Shard block payouts made
    pub shard_rewards_paid: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a header verification
    pub fn record_header(&self, result: &Result<(), ConsensusError>) {
        match result {
            Ok(()) => self.headers_verified.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.headers_rejected.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Record the outcome of a seal check
    pub fn record_seal(&self, result: &Result<(), ConsensusError>) {
        self.seals_checked.fetch_add(1, Ordering::Relaxed);
        if result.is_err() {
            self.seals_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a rejected uncle set
    pub fn record_uncles_rejected(&self) {
        self.uncles_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finalized block and its shard payouts
    pub fn record_finalized(&self, shard_payouts: usize) {
        self.blocks_finalized.fetch_add(1, Ordering::Relaxed);
        self.shard_rewards_paid
            .fetch_add(shard_payouts as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            headers_verified: self.headers_verified.load(Ordering::Relaxed),
            headers_rejected: self.headers_rejected.load(Ordering::Relaxed),
            seals_checked: self.seals_checked.load(Ordering::Relaxed),
            seals_rejected: self.seals_rejected.load(Ordering::Relaxed),
            uncles_rejected: self.uncles_rejected.load(Ordering::Relaxed),
            blocks_finalized: self.blocks_finalized.load(Ordering::Relaxed),
            shard_rewards_paid: self.shard_rewards_paid.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`Metrics`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Headers that passed verification
    pub headers_verified: u64,
    /// Headers that failed verification
    pub headers_rejected: u64,
    /// Seals recomputed or simulated
    pub seals_checked: u64,
    /// Seals that failed
    pub seals_rejected: u64,
    /// Blocks whose uncle set was rejected
    pub uncles_rejected: u64,
    /// Blocks finalized
    pub blocks_finalized: u64,
    /// Shard block payouts made
    pub shard_rewards_paid: u64,
}
