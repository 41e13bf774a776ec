//! # Quantum-Chain PoW Consensus Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Difficulty | `calc_difficulty` in every era |
//! | Seal | light verification of a mined header |
//! | Batch | `verify_headers` over chains of growing length |
//! | Rewards | master finalization with many shard blocks |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use num_bigint::BigUint;
use qc_08_pow_consensus::adapters::{InMemoryChain, InMemoryState};
use qc_08_pow_consensus::domain::calc_difficulty;
use qc_08_pow_consensus::{ChainConfig, ChainReader, ConsensusEngine, ProtocolParams};
use qc_tests::fixtures::{pending_headers, seal, test_engine};
use rand::Rng;
use shared_types::{Header, ShardBlockInfo};

// ============================================================================
// Difficulty
// ============================================================================

fn bench_difficulty(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-08-difficulty");
    let params = ProtocolParams::default();
    let parent = Header {
        number: 4_999_999,
        time: 1_000,
        difficulty: BigUint::from(2u64).pow(40),
        ..Default::default()
    };

    let eras = [
        ("frontier", ChainConfig::frontier()),
        (
            "homestead",
            ChainConfig {
                byzantium_block: None,
                constantinople_block: None,
                ..ChainConfig::default()
            },
        ),
        (
            "byzantium",
            ChainConfig {
                constantinople_block: None,
                ..ChainConfig::default()
            },
        ),
        ("constantinople", ChainConfig::default()),
    ];
    for (name, rules) in &eras {
        group.bench_with_input(BenchmarkId::new("calc", name), rules, |b, rules| {
            let mut rng = rand::thread_rng();
            b.iter(|| {
                let time = parent.time + rng.gen_range(1..60);
                black_box(calc_difficulty(rules, &params, time, &parent))
            })
        });
    }
    group.finish();
}

// ============================================================================
// Seal
// ============================================================================

fn bench_seal(c: &mut Criterion) {
    let engine = test_engine();
    let chain = InMemoryChain::new(ChainConfig::default());
    let mut header = Header {
        number: 1,
        difficulty: BigUint::from(64u32),
        ..Default::default()
    };
    seal(&engine, &mut header);

    c.bench_function("qc-08-seal/verify_light", |b| {
        b.iter(|| black_box(engine.verify_seal(&chain, &header)))
    });
}

// ============================================================================
// Batch verification
// ============================================================================

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-08-batch");
    group.measurement_time(Duration::from_secs(10));
    let engine = test_engine();

    for size in [1usize, 16, 64, 256] {
        let (chain, headers) = pending_headers(&engine, size, true);
        let chain: Arc<dyn ChainReader> = chain;
        let seals = vec![true; size];

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("verify_headers", size), &size, |b, _| {
            b.iter(|| {
                let batch =
                    engine.verify_headers(Arc::clone(&chain), headers.clone(), seals.clone());
                black_box(batch.results.iter().count())
            })
        });
    }
    group.finish();
}

// ============================================================================
// Rewards
// ============================================================================

fn bench_finalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-08-finalize");
    let engine = test_engine();
    let chain = InMemoryChain::new(ChainConfig::default());

    for shards in [1u16, 16, 128] {
        let mut header = Header {
            number: 1,
            coinbase: [0xaa; 20],
            ..Default::default()
        };
        for shard in 1..=shards {
            header.enable_shard(shard);
        }
        let blocks: Vec<ShardBlockInfo> = (1..=shards)
            .flat_map(|shard| {
                (0..4u64).map(move |n| ShardBlockInfo::new(shard, n, [shard as u8; 20]))
            })
            .collect();

        group.throughput(Throughput::Elements(blocks.len() as u64));
        group.bench_with_input(BenchmarkId::new("master", shards), &shards, |b, _| {
            b.iter(|| {
                let mut state = InMemoryState::new();
                black_box(engine.finalize(
                    &chain,
                    header.clone(),
                    &mut state,
                    blocks.clone(),
                    vec![],
                    vec![],
                ))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_difficulty, bench_seal, bench_batch, bench_finalize);
criterion_main!(benches);
