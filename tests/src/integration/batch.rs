//! # Batch Verification Under Contention
//!
//! Drives `verify_headers` against a chain view with random lookup stalls
//! and checks that:
//!
//! 1. **Ordering**: results come back in input order and match a serial
//!    `verify_header` pass header for header
//! 2. **Cancellation**: an aborted batch closes its channel, delivers no more
//!    results than headers and never reports a result for an unverified header

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use qc_08_pow_consensus::adapters::InMemoryChain;
    use qc_08_pow_consensus::{
        ChainConfig, ChainReader, ConsensusEngine, ConsensusError, ConsensusResult, PowEngine,
    };
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_types::{Block, Header};

    use crate::fixtures::{
        genesis_for, init_tracing, pending_headers, test_engine, with_clock, JitterChain,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Damage some headers so the batch mixes successes and failures.
    fn tamper(headers: &mut [Header], rng: &mut StdRng) -> Vec<usize> {
        let mut damaged = Vec::new();
        for (index, header) in headers.iter_mut().enumerate() {
            match rng.gen_range(0..8) {
                0 => header.gas_used = header.gas_limit + 1,
                1 => header.extra = vec![0xab; 64],
                2 => header.set_nonce(header.nonce_u64() ^ 0x8000),
                _ => continue,
            }
            damaged.push(index);
        }
        damaged
    }

    /// Verify one header at a time, feeding each header into the chain
    /// afterwards so its successor can find it.
    fn serial_results(
        engine: &PowEngine,
        genesis: &Header,
        headers: &[Header],
        seals: &[bool],
    ) -> Vec<ConsensusResult<()>> {
        let chain = InMemoryChain::with_genesis(
            ChainConfig::default(),
            Block::master(genesis.clone(), vec![], vec![]),
        );
        headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let seal = seals.get(index).copied().unwrap_or(true);
                let result = engine.verify_header(&chain, header, seal);
                chain.insert_header(header.clone());
                result
            })
            .collect()
    }

    // =========================================================================
    // ORDERING
    // =========================================================================

    #[test]
    fn test_batch_matches_serial_under_jitter() {
        init_tracing();
        let engine = test_engine();

        for seed in 0..6u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let count = rng.gen_range(1..40);
            let (chain, mut headers) = pending_headers(&engine, count, true);
            let damaged = tamper(&mut headers, &mut rng);
            let seals: Vec<bool> = (0..count).map(|_| rng.gen_bool(0.8)).collect();

            let expected = serial_results(&engine, &genesis_for(&engine), &headers, &seals);
            let jitter: Arc<dyn ChainReader> =
                Arc::new(JitterChain::new(chain, Duration::from_millis(2)));
            let batch = engine.verify_headers(jitter, headers, seals);
            let actual: Vec<_> = batch.results.iter().collect();

            assert_eq!(actual, expected, "seed {seed}, damaged {damaged:?}");
        }
    }

    #[test]
    fn test_broken_link_only_fails_the_next_header() {
        let engine = test_engine();
        let (chain, mut headers) = pending_headers(&engine, 6, true);
        // Re-parent header 3 onto nothing; header 4 still links to the old hash.
        headers[3].parent_hash = [0x42; 32];

        let batch = engine.verify_headers(chain, headers, vec![true; 6]);
        let results: Vec<_> = batch.results.iter().collect();

        assert_eq!(results.len(), 6);
        assert!(results[..3].iter().all(Result::is_ok));
        assert_eq!(results[3], Err(ConsensusError::UnknownAncestor));
        assert_eq!(results[4], Err(ConsensusError::UnknownAncestor));
        assert_eq!(results[5], Ok(()));
    }

    #[test]
    fn test_full_fake_batch_accepts_garbage() {
        let engine = PowEngine::new_full_faker();
        let chain: Arc<dyn ChainReader> = Arc::new(InMemoryChain::new(ChainConfig::default()));
        let garbage = vec![Header::default(); 5];

        let results: Vec<_> = engine
            .verify_headers(chain, garbage, vec![])
            .results
            .iter()
            .collect();
        assert_eq!(results, vec![Ok(()); 5]);
    }

    // =========================================================================
    // CANCELLATION
    // =========================================================================

    fn slow_engine() -> PowEngine {
        with_clock(PowEngine::new_fake_delayer(Duration::from_millis(20)))
    }

    /// Enough headers that every worker needs several rounds.
    fn long_batch() -> usize {
        let workers = std::thread::available_parallelism().map_or(4, |n| n.get());
        (workers * 6).max(48)
    }

    #[test]
    fn test_abort_midway_closes_channel() {
        init_tracing();
        let engine = slow_engine();
        let count = long_batch();
        let (chain, headers) = pending_headers(&engine, count, false);

        let (abort, results) = engine.verify_headers(chain, headers, vec![true; count]).into_parts();
        let first = results.recv().expect("first result");
        assert_eq!(first, Ok(()));

        abort.abort();
        assert!(abort.is_aborted());

        // The coordinator drops its sender after the abort, ending iteration.
        let rest: Vec<_> = results.iter().collect();
        assert!(1 + rest.len() < count, "abort did not stop the batch");
        assert!(rest.iter().all(Result::is_ok));
    }

    #[test]
    fn test_abort_before_any_result() {
        let engine = slow_engine();
        let count = long_batch();
        let (chain, headers) = pending_headers(&engine, count, false);

        let batch = engine.verify_headers(chain, headers, vec![]);
        batch.abort.abort();
        batch.abort.abort();

        let delivered: Vec<_> = batch.results.iter().collect();
        assert!(delivered.len() < count);
        assert!(delivered.iter().all(Result::is_ok));
    }

    #[test]
    fn test_abort_after_completion_is_harmless() {
        let engine = test_engine();
        let (chain, headers) = pending_headers(&engine, 4, true);

        let (abort, results) = engine.verify_headers(chain, headers, vec![true; 4]).into_parts();
        let all: Vec<_> = results.iter().collect();
        assert_eq!(all, vec![Ok(()); 4]);

        abort.abort();
        assert!(abort.is_aborted());
    }
}
