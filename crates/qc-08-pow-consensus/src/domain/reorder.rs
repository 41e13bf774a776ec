//! Ordered delivery of out-of-order completions
//!
//! Batch verification finishes items in arbitrary order but must report them
//! in input order. [`ReorderBuffer`] holds one slot per item and releases the
//! contiguous completed prefix; [`AbortHandle`] cancels the coordinator that
//! drives it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::error::ConsensusResult;

/// Fixed-size completion buffer with a monotonically advancing emit cursor
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    slots: Vec<Option<T>>,
    next: usize,
}

impl<T> ReorderBuffer<T> {
    /// Buffer for `len` items, indexed `0..len`.
    pub fn new(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self { slots, next: 0 }
    }

    /// Number of items the buffer was sized for
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Buffer sized for zero items
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Items released so far
    pub fn emitted(&self) -> usize {
        self.next
    }

    /// Every item has been released.
    pub fn is_complete(&self) -> bool {
        self.next == self.slots.len()
    }

    /// Record the completion of item `index`.
    ///
    /// Returns `false` (and drops `value`) if `index` is out of range, already
    /// released, or already completed.
    pub fn complete(&mut self, index: usize, value: T) -> bool {
        if index < self.next {
            return false;
        }
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    /// Release the next item if it has completed.
    pub fn pop_ready(&mut self) -> Option<T> {
        let value = self.slots.get_mut(self.next)?.take()?;
        self.next += 1;
        Some(value)
    }
}

/// Message from a batch worker (or the abort handle) to the coordinator
#[derive(Debug)]
pub enum BatchEvent {
    /// Item `index` finished with the given result
    Done(usize, ConsensusResult<()>),
    /// The batch was cancelled
    Abort,
}

/// Cooperative cancellation for a batch verification
///
/// Aborting stops workers from picking up new items and wakes the
/// coordinator, which exits without emitting further results. Items already
/// being verified run to completion and their results are discarded.
#[derive(Clone, Debug)]
pub struct AbortHandle {
    aborted: Arc<AtomicBool>,
    wake: Option<Sender<BatchEvent>>,
}

impl AbortHandle {
    /// Handle over a shared flag, waking the coordinator through `wake`.
    pub fn new(aborted: Arc<AtomicBool>, wake: Sender<BatchEvent>) -> Self {
        Self {
            aborted,
            wake: Some(wake),
        }
    }

    /// Handle for a batch that has no coordinator (already fully answered).
    pub fn detached() -> Self {
        Self {
            aborted: Arc::new(AtomicBool::new(false)),
            wake: None,
        }
    }

    /// Cancel the batch. Idempotent.
    pub fn abort(&self) {
        if self.aborted.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(wake) = &self.wake {
            // Coordinator may already have exited.
            let _ = wake.send(BatchEvent::Abort);
        }
    }

    /// The batch has been cancelled.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}
