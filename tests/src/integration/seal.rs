//! # Seal Round Trips
//!
//! Mines headers with the reference provider and verifies them through
//! every seal backend: light, full dataset, shared engine and the fakes.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use num_bigint::BigUint;
    use qc_08_pow_consensus::adapters::{InMemoryChain, ReferencePowProvider};
    use qc_08_pow_consensus::domain;
    use qc_08_pow_consensus::{
        ChainConfig, ConsensusEngine, ConsensusError, EngineConfig, PowEngine, PowMode,
        ProtocolParams,
    };
    use shared_types::Header;

    use crate::fixtures::{init_tracing, seal, test_engine, with_clock};

    fn normal_config() -> EngineConfig {
        EngineConfig {
            pow_mode: PowMode::Normal,
            params: ProtocolParams {
                minimum_difficulty: 16,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn header_at(number: u64) -> Header {
        Header {
            number,
            difficulty: BigUint::from(64u32),
            coinbase: [0x5a; 20],
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_across_epochs() {
        init_tracing();
        let engine = with_clock(PowEngine::new(
            normal_config(),
            Arc::new(ReferencePowProvider::new()),
        ));
        let chain = InMemoryChain::new(ChainConfig::default());
        let epoch_length = engine.config().epoch_length;

        for number in [1, epoch_length - 1, epoch_length, 3 * epoch_length + 7] {
            let mut header = header_at(number);
            seal(&engine, &mut header);
            assert_eq!(engine.verify_seal(&chain, &header), Ok(()), "height {number}");

            // Carried to another epoch, the same nonce no longer fits.
            let mut moved = header.clone();
            moved.number = number + epoch_length;
            assert_ne!(engine.verify_seal(&chain, &moved), Ok(()));
        }
        assert_eq!(engine.metrics().snapshot().seals_checked, 8);
    }

    #[test]
    fn test_light_and_full_verifiers_agree() {
        let light = PowEngine::new(normal_config(), Arc::new(ReferencePowProvider::new()));
        let full = PowEngine::new(
            normal_config(),
            Arc::new(ReferencePowProvider::with_full_dataset()),
        );

        let mut header = header_at(42);
        seal(&light, &mut header);
        assert_eq!(light.verify_seal_with(&header, true), Ok(()));
        assert_eq!(full.verify_seal_with(&header, true), Ok(()));
        assert_eq!(full.verify_seal_with(&header, false), Ok(()));

        header.mix_digest[31] ^= 1;
        assert_eq!(
            full.verify_seal_with(&header, true),
            Err(ConsensusError::InvalidMixDigest)
        );
    }

    #[test]
    fn test_shared_engine_counts_delegated_checks() {
        let provider = Arc::new(ReferencePowProvider::new());
        let shared = Arc::new(PowEngine::new(normal_config(), provider));
        let front = PowEngine::new_shared(normal_config(), Arc::clone(&shared));

        let mut header = header_at(7);
        seal(&shared, &mut header);
        assert_eq!(front.verify_seal_with(&header, false), Ok(()));
        assert_eq!(shared.metrics().snapshot().seals_checked, 1);
        assert_eq!(front.metrics().snapshot().seals_checked, 0);
    }

    #[test]
    fn test_seal_hash_ignores_seal_fields() {
        let engine = test_engine();
        let mut header = header_at(3);
        let before = engine.seal_hash(&header);
        seal(&engine, &mut header);
        assert_eq!(engine.seal_hash(&header), before);
        assert_eq!(domain::seal_hash(&header), before);

        header.shard_id = 1;
        assert_ne!(engine.seal_hash(&header), before);
    }

    #[test]
    fn test_fake_failure_only_hits_its_height() {
        let engine = PowEngine::new_fake_failure(9);
        let chain = InMemoryChain::new(ChainConfig::default());
        assert_eq!(engine.verify_seal(&chain, &header_at(8)), Ok(()));
        assert_eq!(
            engine.verify_seal(&chain, &header_at(9)),
            Err(ConsensusError::InvalidPoW)
        );
    }
}
