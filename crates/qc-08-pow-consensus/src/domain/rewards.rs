//! Master and shard block rewards
//!
//! Every master block pays its miner a fixed, era-scaled reward and tops up a
//! per-shard budget (the ledger carried in [`ShardState`]). Shard blocks
//! included by the master block are paid out of their shard's budget; once a
//! budget runs short it is split evenly across the included blocks and
//! drained to zero.

use std::collections::BTreeMap;

use primitive_types::U256;
use shared_types::{Address, Header, ShardBitmap, ShardBlockInfo, ShardId, ShardState};
use tracing::{trace, warn};

use crate::config::ProtocolParams;
use crate::ports::StateMutator;

/// Reward multiplier at master height `number`.
///
/// Starts at `max_reward_multiplier` and halves at each stage threshold.
pub fn era_multiplier(params: &ProtocolParams, number: u64) -> u64 {
    let passed = params
        .reward_stage_thresholds
        .iter()
        .filter(|&&threshold| number >= threshold)
        .count();
    params
        .max_reward_multiplier
        .checked_shr(passed as u32)
        .unwrap_or(0)
        .max(1)
}

/// Shards enabled in `bitmap`, ascending. Shard 0 is always enabled.
pub fn enabled_shards(bitmap: &ShardBitmap) -> Vec<ShardId> {
    let mut bitmap = *bitmap;
    bitmap[0] |= 0x01;

    let mut shards = Vec::new();
    for (byte_index, byte) in bitmap.iter().enumerate() {
        for bit in 0..8 {
            if byte & (1 << bit) != 0 {
                shards.push((byte_index * 8 + bit) as ShardId);
            }
        }
    }
    shards
}

/// Reward units added to each active shard's budget per master block.
pub fn shard_quota(params: &ProtocolParams, active_shards: usize, multiplier: u64) -> u64 {
    let active = active_shards.max(1) as u64;
    (params.shard_reward_pool / active).saturating_mul(multiplier)
}

/// A single shard block payout
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardPayout {
    /// Shard the block was mined on
    pub shard_id: ShardId,
    /// Height of the shard block
    pub block_number: u64,
    /// Credited miner
    pub coinbase: Address,
    /// Reward units paid
    pub units: u64,
    /// Wei paid, `units * reward_base_unit`
    pub amount: U256,
}

/// Everything credited while finalizing one master block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardOutcome {
    /// Era multiplier in force
    pub multiplier: u64,
    /// Wei credited to the master block's coinbase
    pub master_reward: U256,
    /// Per-shard budget top-up for this block
    pub shard_quota: u64,
    /// Shard payouts in ascending shard order
    pub payouts: Vec<ShardPayout>,
}

impl RewardOutcome {
    /// Total wei paid to shard miners
    pub fn shard_total(&self) -> U256 {
        self.payouts
            .iter()
            .fold(U256::zero(), |acc, payout| acc.saturating_add(payout.amount))
    }
}

/// Credit the master reward and shard rewards for `header`, and write the
/// updated ledger into `header.shard_state` (sorted by shard id).
///
/// `parent` supplies the ledger carried forward; without one every active
/// shard starts from a fresh quota.
pub fn accumulate_rewards(
    params: &ProtocolParams,
    state: &mut dyn StateMutator,
    parent: Option<&Header>,
    header: &mut Header,
    shard_blocks: &[ShardBlockInfo],
) -> RewardOutcome {
    let multiplier = era_multiplier(params, header.number);
    let master_reward = params
        .block_reward_base
        .saturating_mul(U256::from(multiplier));
    trace!(number = header.number, multiplier, %master_reward, "master block reward");
    state.add_balance(&header.coinbase, master_reward);

    let active = enabled_shards(&header.shard_enabled);
    let quota = shard_quota(params, active.len(), multiplier);

    let mut ledger = carried_ledger(parent);
    for shard in &active {
        ledger
            .entry(*shard)
            .and_modify(|entry| entry.reward_remains = entry.reward_remains.saturating_add(quota))
            .or_insert_with(|| ShardState::new(*shard, 0, quota));
    }

    let mut by_shard: BTreeMap<ShardId, Vec<&ShardBlockInfo>> = BTreeMap::new();
    for block in shard_blocks {
        by_shard.entry(block.shard_id).or_default().push(block);
    }

    let mut payouts = Vec::with_capacity(shard_blocks.len());
    for (shard, blocks) in by_shard {
        let Some(entry) = ledger.get_mut(&shard) else {
            warn!(shard, blocks = blocks.len(), "shard blocks included without a reward ledger entry");
            continue;
        };
        pay_shard(params, state, entry, quota, &blocks, &mut payouts);
    }

    header.shard_state = ledger.into_values().collect();
    RewardOutcome {
        multiplier,
        master_reward,
        shard_quota: quota,
        payouts,
    }
}

/// Parent ledger keyed by shard; a repeated shard id keeps its last entry.
fn carried_ledger(parent: Option<&Header>) -> BTreeMap<ShardId, ShardState> {
    parent
        .map(|parent| {
            parent
                .shard_state
                .iter()
                .map(|state| (state.shard_id, *state))
                .collect()
        })
        .unwrap_or_default()
}

fn pay_shard(
    params: &ProtocolParams,
    state: &mut dyn StateMutator,
    entry: &mut ShardState,
    quota: u64,
    blocks: &[&ShardBlockInfo],
    payouts: &mut Vec<ShardPayout>,
) {
    let count = blocks.len() as u64;
    let budget = entry.reward_remains;
    let exhausted = budget < quota.saturating_mul(count);
    let per_block = if exhausted { budget / count } else { quota };

    for (index, block) in blocks.iter().enumerate() {
        let last = index + 1 == blocks.len();
        let units = if exhausted && last {
            // Final block of a short round takes the indivisible dust.
            entry.reward_remains
        } else {
            per_block.min(entry.reward_remains)
        };
        let amount = params.reward_base_unit.saturating_mul(U256::from(units));
        trace!(shard = block.shard_id, number = block.block_number, units, "shard block reward");
        state.add_balance(&block.coinbase, amount);

        entry.reward_remains -= units;
        entry.block_number = entry.block_number.max(block.block_number);
        payouts.push(ShardPayout {
            shard_id: block.shard_id,
            block_number: block.block_number,
            coinbase: block.coinbase,
            units,
            amount,
        });
    }
}
