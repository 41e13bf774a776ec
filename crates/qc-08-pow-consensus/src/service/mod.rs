//! PoW Engine Service
//!
//! Wires the pure domain rules to the outbound ports and exposes them
//! through [`ConsensusEngine`].
//!
//! # Modes
//! - `Normal`/`Test`: seals are recomputed through a [`PowDataProvider`]
//!   (or delegated to a shared engine).
//! - `Fake`: seals are accepted after a configurable delay, except for one
//!   configurable block number.
//! - `FullFake`: headers, batches, uncles and seals are all accepted
//!   unchecked.

mod batch;


use std::sync::Arc;
use std::time::Duration;

use num_bigint::BigUint;
use shared_types::{Address, Block, ContractResult, Hash, Header, Receipt, ShardBlockInfo};
use tracing::{debug, info, trace};

use crate::config::{ChainConfig, EngineConfig, PowMode};
use crate::domain::{self, ValidationContext};
use crate::error::{ConsensusError, ConsensusResult};
use crate::metrics::Metrics;
use crate::ports::{
    BatchVerification, ChainReader, ConsensusEngine, PowDataProvider, StateMutator,
    SystemTimeSource, TimeSource,
};

/// Where seal recomputation happens
#[derive(Clone)]
enum SealBackend {
    /// No provider (fake modes)
    Missing,
    /// Recompute with this provider
    Local(Arc<dyn PowDataProvider>),
    /// Hand the check to another engine
    Shared(Arc<PowEngine>),
}

/// Proof-of-work consensus engine
///
/// Cheap to clone; clones share configuration, seal backend, clock and
/// metrics. Batch workers run on clones.
#[derive(Clone)]
pub struct PowEngine {
    config: Arc<EngineConfig>,
    seal: SealBackend,
    time_source: Arc<dyn TimeSource>,
    metrics: Arc<Metrics>,
}

impl PowEngine {
    /// Engine recomputing seals through `provider`.
    pub fn new(config: EngineConfig, provider: Arc<dyn PowDataProvider>) -> Self {
        Self::build(config, SealBackend::Local(provider))
    }

    /// Engine delegating seal checks to `shared`.
    ///
    /// Useful when several engines in one process should share a single set
    /// of caches.
    pub fn new_shared(config: EngineConfig, shared: Arc<PowEngine>) -> Self {
        Self::build(config, SealBackend::Shared(shared))
    }

    /// Engine with no way to recompute seals.
    ///
    /// Only the fake modes can verify seals; any other mode reports
    /// [`ConsensusError::SealBackendMissing`].
    pub fn without_provider(config: EngineConfig) -> Self {
        Self::build(config, SealBackend::Missing)
    }

    /// Engine accepting every seal.
    pub fn new_faker() -> Self {
        Self::build(EngineConfig::fake(PowMode::Fake), SealBackend::Missing)
    }

    /// Engine accepting every seal except the one at height `fail`.
    pub fn new_fake_failure(fail: u64) -> Self {
        let config = EngineConfig {
            fake_fail: Some(fail),
            ..EngineConfig::fake(PowMode::Fake)
        };
        Self::build(config, SealBackend::Missing)
    }

    /// Engine accepting every seal after sleeping for `delay`.
    pub fn new_fake_delayer(delay: Duration) -> Self {
        let config = EngineConfig {
            fake_delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            ..EngineConfig::fake(PowMode::Fake)
        };
        Self::build(config, SealBackend::Missing)
    }

    /// Engine accepting everything without looking.
    pub fn new_full_faker() -> Self {
        Self::build(EngineConfig::fake(PowMode::FullFake), SealBackend::Missing)
    }

    fn build(config: EngineConfig, seal: SealBackend) -> Self {
        Self {
            config: Arc::new(config),
            seal,
            time_source: Arc::new(SystemTimeSource),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Engine counters
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn is_full_fake(&self) -> bool {
        self.config.pow_mode == PowMode::FullFake
    }

    /// Parent of `header` as known to `chain`.
    fn parent_of(chain: &dyn ChainReader, header: &Header) -> Option<Header> {
        let number = header.number.checked_sub(1)?;
        chain.get_header(&header.parent_hash, number)
    }

    /// Field checks, then the seal (if asked), then fork rules.
    fn verify_against_parent(
        &self,
        rules: &ChainConfig,
        header: &Header,
        parent: &Header,
        uncle: bool,
        seal: bool,
    ) -> ConsensusResult<()> {
        let ctx = ValidationContext {
            rules,
            params: &self.config.params,
            now: self.time_source.now(),
            allowed_future_secs: self.config.allowed_future_block_secs,
        };
        ctx.verify_fields(header, parent, uncle)?;
        if seal {
            self.verify_seal_with(header, false)?;
        }
        rules.verify_fork_rules(header, uncle)?;
        Ok(())
    }

    /// Verify the seal of `header`, using the full dataset when
    /// `prefer_full` is set and the dataset is ready.
    ///
    /// A delegated check is counted by the shared engine only.
    pub fn verify_seal_with(&self, header: &Header, prefer_full: bool) -> ConsensusResult<()> {
        if let SealBackend::Shared(shared) = &self.seal {
            if !self.config.pow_mode.is_fake() {
                return shared.verify_seal_with(header, prefer_full);
            }
        }
        let result = self.check_seal(header, prefer_full);
        self.metrics.record_seal(&result);
        result
    }

    fn check_seal(&self, header: &Header, prefer_full: bool) -> ConsensusResult<()> {
        if self.config.pow_mode.is_fake() {
            if self.config.fake_delay_ms > 0 {
                std::thread::sleep(Duration::from_millis(self.config.fake_delay_ms));
            }
            if self.config.fake_fail == Some(header.number) {
                return Err(ConsensusError::InvalidPoW);
            }
            return Ok(());
        }

        let provider = match &self.seal {
            SealBackend::Shared(shared) => return shared.check_seal(header, prefer_full),
            SealBackend::Local(provider) => provider,
            SealBackend::Missing => return Err(ConsensusError::SealBackendMissing),
        };
        if header.difficulty.bits() == 0 {
            return Err(ConsensusError::NonPositiveDifficulty);
        }

        let epoch = domain::epoch(header.number, self.config.epoch_length);
        let seal_hash = domain::seal_hash(header);
        let nonce = header.nonce_u64();

        let full = if prefer_full {
            let dataset = provider.dataset(epoch, true);
            dataset
                .generated()
                .then(|| provider.hashimoto_full(&dataset, &seal_hash, nonce))
        } else {
            None
        };
        let output = match full {
            Some(output) => output,
            None => {
                let cache = provider.cache(epoch);
                let size = self.light_dataset_size(provider.as_ref(), epoch);
                provider.hashimoto_light(size, &cache, &seal_hash, nonce)
            }
        };
        trace!(number = header.number, epoch, full = full.is_some(), "seal recomputed");
        domain::check_pow_output(header, &output)
    }

    /// Dataset size handed to the light hasher for `epoch`.
    pub fn light_dataset_size(&self, provider: &dyn PowDataProvider, epoch: u64) -> u64 {
        if self.config.pow_mode == PowMode::Test {
            self.config.test_dataset_size
        } else {
            provider.dataset_size(epoch)
        }
    }
}

impl ConsensusEngine for PowEngine {
    fn author(&self, header: &Header) -> Address {
        header.coinbase
    }

    fn verify_header(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        seal: bool,
    ) -> ConsensusResult<()> {
        if self.is_full_fake() {
            return Ok(());
        }
        if chain.get_header(&header.hash(), header.number).is_some() {
            return Ok(());
        }
        let result = match Self::parent_of(chain, header) {
            Some(parent) => self.verify_against_parent(chain.config(), header, &parent, false, seal),
            None => Err(ConsensusError::UnknownAncestor),
        };
        if let Err(err) = &result {
            debug!(number = header.number, %err, "header rejected");
        }
        self.metrics.record_header(&result);
        result
    }

    fn verify_headers(
        &self,
        chain: Arc<dyn ChainReader>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> BatchVerification {
        self.spawn_batch(chain, headers, seals)
    }

    fn verify_uncles(&self, chain: &dyn ChainReader, block: &Block) -> ConsensusResult<()> {
        if self.is_full_fake() {
            return Ok(());
        }
        let rules = chain.config();
        let result = domain::verify_uncles(
            chain,
            block,
            self.config.max_uncles,
            self.config.uncle_window,
            |uncle, parent| self.verify_against_parent(rules, uncle, parent, true, true),
        );
        if let Err(err) = &result {
            debug!(number = block.number(), uncles = block.uncles.len(), %err, "uncles rejected");
            self.metrics.record_uncles_rejected();
        }
        result
    }

    fn verify_seal(&self, _chain: &dyn ChainReader, header: &Header) -> ConsensusResult<()> {
        self.verify_seal_with(header, false)
    }

    fn prepare(&self, chain: &dyn ChainReader, header: &mut Header) -> ConsensusResult<()> {
        let parent = Self::parent_of(chain, header).ok_or(ConsensusError::UnknownAncestor)?;
        header.difficulty = self.calc_difficulty(chain, header.time, &parent);
        Ok(())
    }

    fn finalize(
        &self,
        chain: &dyn ChainReader,
        mut header: Header,
        state: &mut dyn StateMutator,
        shard_blocks: Vec<ShardBlockInfo>,
        results: Vec<ContractResult>,
        receipts: Vec<Receipt>,
    ) -> Block {
        let delete_empty = chain.config().is_eip158(header.number);

        if !header.is_master() {
            header.root = state.intermediate_root(delete_empty);
            self.metrics.record_finalized(0);
            return Block::shard(header, results);
        }

        let parent = Self::parent_of(chain, &header);
        let outcome = domain::accumulate_rewards(
            &self.config.params,
            state,
            parent.as_ref(),
            &mut header,
            &shard_blocks,
        );
        header.root = state.intermediate_root(delete_empty);

        info!(
            number = header.number,
            multiplier = outcome.multiplier,
            master_reward = %outcome.master_reward,
            shard_payouts = outcome.payouts.len(),
            "master block finalized"
        );
        self.metrics.record_finalized(outcome.payouts.len());
        Block::master(header, shard_blocks, receipts)
    }

    fn calc_difficulty(&self, chain: &dyn ChainReader, time: u64, parent: &Header) -> BigUint {
        domain::calc_difficulty(chain.config(), &self.config.params, time, parent)
    }

    fn seal_hash(&self, header: &Header) -> Hash {
        domain::seal_hash(header)
    }
}
