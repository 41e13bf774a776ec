//! # Shared Fixtures
//!
//! Chain builders, engines and chain wrappers used across the integration
//! scenarios and the benchmarks.

use std::sync::{Arc, Once};
use std::time::Duration;

use num_bigint::BigUint;
use qc_08_pow_consensus::adapters::{FixedTimeSource, InMemoryChain, ReferencePowProvider};
use qc_08_pow_consensus::domain;
use qc_08_pow_consensus::{
    ChainConfig, ChainReader, ConsensusEngine, EngineConfig, PowEngine, PowMode, ProtocolParams,
};
use rand::Rng;
use shared_types::{Block, Hash, Header};

/// Wall clock seen by every fixture engine.
pub const NOW: u64 = 1_700_000_000;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Test-mode config with a difficulty floor of 16 so seals mine instantly.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        pow_mode: PowMode::Test,
        params: ProtocolParams {
            minimum_difficulty: 16,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Test-mode engine on the reference provider with a frozen clock.
pub fn test_engine() -> PowEngine {
    with_clock(PowEngine::new(test_config(), Arc::new(ReferencePowProvider::new())))
}

/// Pin `engine`'s clock to [`NOW`].
pub fn with_clock(engine: PowEngine) -> PowEngine {
    engine.with_time_source(Arc::new(FixedTimeSource::new(NOW)))
}

/// Genesis header sitting at `engine`'s difficulty floor.
pub fn genesis_for(engine: &PowEngine) -> Header {
    Header {
        time: NOW - 100_000,
        gas_limit: 8_000_000,
        difficulty: BigUint::from(engine.config().params.minimum_difficulty),
        ..Default::default()
    }
}

/// Mine a seal for `header` the way `engine` will check it.
pub fn seal(engine: &PowEngine, header: &mut Header) {
    let provider = ReferencePowProvider::new();
    let epoch = domain::epoch(header.number, engine.config().epoch_length);
    let size = engine.light_dataset_size(&provider, epoch);
    let seal_hash = domain::seal_hash(header);
    provider
        .mine(header, &seal_hash, epoch, size)
        .expect("difficulty is positive");
}

/// Valid child of `parent`, ten seconds later, optionally sealed.
pub fn child(
    engine: &PowEngine,
    chain: &dyn ChainReader,
    parent: &Header,
    extra: &[u8],
    sealed: bool,
) -> Header {
    let mut header = Header {
        parent_hash: parent.hash(),
        number: parent.number + 1,
        time: parent.time + 10,
        gas_limit: parent.gas_limit,
        coinbase: [0x11; 20],
        extra: extra.to_vec(),
        ..Default::default()
    };
    header.difficulty = engine.calc_difficulty(chain, header.time, parent);
    if sealed {
        seal(engine, &mut header);
    }
    header
}

/// A chain holding only genesis, plus `count` descendants not yet inserted.
pub fn pending_headers(
    engine: &PowEngine,
    count: usize,
    sealed: bool,
) -> (Arc<InMemoryChain>, Vec<Header>) {
    let genesis = genesis_for(engine);
    let chain = Arc::new(InMemoryChain::with_genesis(
        ChainConfig::default(),
        Block::master(genesis.clone(), vec![], vec![]),
    ));

    let mut headers = Vec::with_capacity(count);
    let mut parent = genesis;
    for _ in 0..count {
        let header = child(engine, chain.as_ref(), &parent, b"", sealed);
        parent = header.clone();
        headers.push(header);
    }
    (chain, headers)
}

/// Chain view that stalls for a random time on every lookup, so batch
/// workers finish in an unpredictable order.
pub struct JitterChain {
    inner: Arc<InMemoryChain>,
    max_stall: Duration,
}

impl JitterChain {
    /// Wrap `inner`, stalling up to `max_stall` per lookup.
    pub fn new(inner: Arc<InMemoryChain>, max_stall: Duration) -> Self {
        Self { inner, max_stall }
    }

    fn stall(&self) {
        let micros = self.max_stall.as_micros() as u64;
        if micros > 0 {
            let pause = rand::thread_rng().gen_range(0..=micros);
            std::thread::sleep(Duration::from_micros(pause));
        }
    }
}

impl ChainReader for JitterChain {
    fn config(&self) -> &ChainConfig {
        self.inner.config()
    }

    fn current_header(&self) -> Header {
        self.inner.current_header()
    }

    fn get_header(&self, hash: &Hash, number: u64) -> Option<Header> {
        self.stall();
        self.inner.get_header(hash, number)
    }

    fn get_block(&self, hash: &Hash, number: u64) -> Option<Block> {
        self.stall();
        self.inner.get_block(hash, number)
    }
}
