//! Keccak-based stand-in for the memory-hard PoW function
//!
//! Deterministic and cheap: the "cache" and "dataset" of an epoch are the
//! same 32-byte seed, and both hashing paths agree whenever the light path
//! is given the real dataset size. Good enough to exercise every branch of
//! seal verification, not to secure a network.

use std::sync::Arc;

use num_bigint::BigUint;
use sha3::{Digest, Keccak256};
use shared_types::{Hash, Header};
use tracing::debug;

use crate::domain::pow_target;
use crate::ports::{PowCache, PowDataProvider, PowDataset, PowOutput};

/// Dataset size of epoch 0.
const DATASET_INIT_BYTES: u64 = 1 << 30;

/// Dataset growth per epoch.
const DATASET_GROWTH_BYTES: u64 = 1 << 23;

/// Reference [`PowDataProvider`]
#[derive(Debug, Clone, Default)]
pub struct ReferencePowProvider {
    full_dataset: bool,
}

impl ReferencePowProvider {
    /// Provider whose datasets are never ready (light verification only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose datasets are always generated.
    pub fn with_full_dataset() -> Self {
        Self { full_dataset: true }
    }

    fn epoch_seed(epoch: u64) -> Arc<[u8]> {
        let seed: [u8; 32] = Keccak256::new()
            .chain_update(b"reference-pow-epoch")
            .chain_update(epoch.to_be_bytes())
            .finalize()
            .into();
        Arc::from(seed.to_vec())
    }

    fn hashimoto(seed: &[u8], size: u64, seal_hash: &Hash, nonce: u64) -> PowOutput {
        let mix: Hash = Keccak256::new()
            .chain_update(seal_hash)
            .chain_update(nonce.to_be_bytes())
            .finalize()
            .into();
        let digest: Hash = Keccak256::new()
            .chain_update(mix)
            .chain_update(seed)
            .chain_update(size.to_be_bytes())
            .finalize()
            .into();
        let result: Hash = Keccak256::new()
            .chain_update(mix)
            .chain_update(digest)
            .finalize()
            .into();
        PowOutput { digest, result }
    }

    /// Search nonces from zero until one meets `header`'s difficulty, then
    /// write the nonce and mix digest into the header.
    ///
    /// `size` must match what the verifier will use (the test-mode size in
    /// [`PowMode::Test`](crate::config::PowMode::Test)).
    pub fn mine(&self, header: &mut Header, seal_hash: &Hash, epoch: u64, size: u64) -> Option<u64> {
        if header.difficulty.bits() == 0 {
            return None;
        }
        let target = pow_target(&header.difficulty);
        let seed = Self::epoch_seed(epoch);

        let (nonce, output) = (0..=u64::MAX).find_map(|nonce| {
            let output = Self::hashimoto(&seed, size, seal_hash, nonce);
            (BigUint::from_bytes_be(&output.result) <= target).then_some((nonce, output))
        })?;
        debug!(number = header.number, nonce, "reference seal found");

        header.set_nonce(nonce);
        header.mix_digest = output.digest;
        Some(nonce)
    }
}

impl PowDataProvider for ReferencePowProvider {
    fn cache(&self, epoch: u64) -> PowCache {
        PowCache::new(epoch, Self::epoch_seed(epoch))
    }

    fn dataset(&self, epoch: u64, _prefer_full: bool) -> PowDataset {
        if self.full_dataset {
            PowDataset::ready(epoch, Self::epoch_seed(epoch))
        } else {
            PowDataset::pending(epoch)
        }
    }

    fn dataset_size(&self, epoch: u64) -> u64 {
        DATASET_INIT_BYTES.saturating_add(epoch.saturating_mul(DATASET_GROWTH_BYTES))
    }

    fn hashimoto_light(&self, size: u64, cache: &PowCache, seal_hash: &Hash, nonce: u64) -> PowOutput {
        Self::hashimoto(&cache.bytes, size, seal_hash, nonce)
    }

    fn hashimoto_full(&self, dataset: &PowDataset, seal_hash: &Hash, nonce: u64) -> PowOutput {
        let seed = dataset
            .bytes
            .clone()
            .unwrap_or_else(|| Self::epoch_seed(dataset.epoch));
        Self::hashimoto(&seed, self.dataset_size(dataset.epoch), seal_hash, nonce)
    }
}
