//! Concurrent batch header verification
//!
//! Workers pull indices from a shared cursor and report `(index, result)` on
//! one event channel; a single coordinator thread puts the results back into
//! input order. The abort handle shares the event channel so a cancellation
//! wakes the coordinator immediately.

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use shared_types::Header;
use tracing::{debug, trace, warn};

use super::PowEngine;
use crate::config::PowMode;
use crate::domain::{AbortHandle, BatchEvent, ReorderBuffer};
use crate::error::{ConsensusError, ConsensusResult};
use crate::ports::{BatchVerification, ChainReader};

impl PowEngine {
    #[tracing::instrument(skip_all, fields(headers = headers.len()))]
    pub(super) fn spawn_batch(
        &self,
        chain: Arc<dyn ChainReader>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> BatchVerification {
        let len = headers.len();
        let (result_tx, results) = mpsc::channel();

        if len == 0 || self.config.pow_mode == PowMode::FullFake {
            for _ in 0..len {
                // Receiver is still in scope.
                let _ = result_tx.send(Ok(()));
            }
            return BatchVerification {
                abort: AbortHandle::detached(),
                results,
            };
        }

        let headers: Arc<[Header]> = headers.into();
        let seals: Arc<[bool]> = seals.into();
        let aborted = Arc::new(AtomicBool::new(false));
        let cursor = Arc::new(AtomicUsize::new(0));
        let (event_tx, event_rx) = mpsc::channel();

        let workers = num_cpus::get().clamp(1, len);
        debug!(workers, "starting batch verification");

        let mut spawned = 0;
        for worker in 0..workers {
            let engine = self.clone();
            let chain = Arc::clone(&chain);
            let headers = Arc::clone(&headers);
            let seals = Arc::clone(&seals);
            let aborted = Arc::clone(&aborted);
            let cursor = Arc::clone(&cursor);
            let events = event_tx.clone();

            let handle = thread::Builder::new()
                .name(format!("pow-verify-{worker}"))
                .spawn(move || loop {
                    if aborted.load(Ordering::SeqCst) {
                        break;
                    }
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    if index >= headers.len() {
                        break;
                    }
                    let result = engine.verify_isolated(chain.as_ref(), &headers, &seals, index);
                    if events.send(BatchEvent::Done(index, result)).is_err() {
                        break;
                    }
                });
            match handle {
                Ok(_) => spawned += 1,
                Err(err) => warn!(worker, %err, "failed to spawn verification worker"),
            }
        }
        if spawned == 0 {
            warn!(len, "no verification worker started, verifying on the caller thread");
            self.verify_inline(chain.as_ref(), &headers, &seals, &result_tx);
            return BatchVerification {
                abort: AbortHandle::detached(),
                results,
            };
        }

        let abort = AbortHandle::new(Arc::clone(&aborted), event_tx);
        let coordinator = thread::Builder::new()
            .name("pow-verify-order".into())
            .spawn(move || coordinate(len, event_rx, result_tx, aborted));
        if let Err(err) = coordinator {
            warn!(%err, "failed to spawn batch coordinator");
            abort.abort();
        }

        BatchVerification { abort, results }
    }

    /// Verify the whole batch in order on the current thread.
    pub(super) fn verify_inline(
        &self,
        chain: &dyn ChainReader,
        headers: &[Header],
        seals: &[bool],
        results: &Sender<ConsensusResult<()>>,
    ) {
        for index in 0..headers.len() {
            let result = self.verify_isolated(chain, headers, seals, index);
            if results.send(result).is_err() {
                return;
            }
        }
    }

    /// [`Self::verify_batch_item`], with a panic turned into an error for
    /// that index so the coordinator still hears about it.
    fn verify_isolated(
        &self,
        chain: &dyn ChainReader,
        headers: &[Header],
        seals: &[bool],
        index: usize,
    ) -> ConsensusResult<()> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            self.verify_batch_item(chain, headers, seals, index)
        }))
        .unwrap_or_else(|_| {
            warn!(index, "header verification panicked");
            self.metrics.record_header(&Err(ConsensusError::VerificationPanicked));
            Err(ConsensusError::VerificationPanicked)
        })
    }

    /// Verify `headers[index]`, taking its parent from the batch when the
    /// previous header links to it, and from the chain for the first header.
    fn verify_batch_item(
        &self,
        chain: &dyn ChainReader,
        headers: &[Header],
        seals: &[bool],
        index: usize,
    ) -> ConsensusResult<()> {
        let header = &headers[index];
        let parent = if index == 0 {
            Self::parent_of(chain, header).map(Cow::Owned)
        } else {
            let previous = &headers[index - 1];
            (previous.hash() == header.parent_hash).then_some(Cow::Borrowed(previous))
        };

        let result = match parent {
            None => {
                debug!(index, number = header.number, "batch header has unknown parent");
                Err(ConsensusError::UnknownAncestor)
            }
            Some(_) if chain.get_header(&header.hash(), header.number).is_some() => Ok(()),
            Some(parent) => {
                let seal = seals.get(index).copied().unwrap_or(true);
                self.verify_against_parent(chain.config(), header, &parent, false, seal)
            }
        };
        self.metrics.record_header(&result);
        result
    }
}

/// Forward completions in input order until the batch is done, aborted, or
/// nobody is listening anymore.
fn coordinate(
    len: usize,
    events: Receiver<BatchEvent>,
    results: Sender<ConsensusResult<()>>,
    aborted: Arc<AtomicBool>,
) {
    let mut buffer = ReorderBuffer::new(len);

    while let Ok(event) = events.recv() {
        let (index, result) = match event {
            BatchEvent::Done(index, result) => (index, result),
            BatchEvent::Abort => break,
        };
        if aborted.load(Ordering::SeqCst) {
            break;
        }
        buffer.complete(index, result);

        while let Some(result) = buffer.pop_ready() {
            if results.send(result).is_err() {
                trace!("batch results dropped by receiver");
                aborted.store(true, Ordering::SeqCst);
                return;
            }
        }
        if buffer.is_complete() {
            trace!(len, "batch verification complete");
            return;
        }
    }
    debug!(emitted = buffer.emitted(), len, "batch verification aborted");
}
