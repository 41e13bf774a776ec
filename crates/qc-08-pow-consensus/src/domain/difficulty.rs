//! Difficulty adjustment
//!
//! Four eras, selected by the height of the block being created:
//!
//! | Era | Step divisor | Bomb period source |
//! |---|---|---|
//! | Constantinople | 9 | `parent.number - (5_000_000 - 1)` |
//! | Byzantium | 9 | `parent.number - (3_000_000 - 1)` |
//! | Homestead | 10 | `parent.number + 1` |
//! | Frontier | fixed ±1 step around a 13s threshold | `parent.number + 1` |
//!
//! All results are at least the minimum difficulty. The step term of the
//! Byzantium formula nominally depends on whether the parent had uncles; that
//! branch is dormant on this network and the base is always 1.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed};
use shared_types::Header;

use crate::config::{ChainConfig, ProtocolParams};

/// Lower bound on the adjustment factor of the Homestead-style formulas.
const MIN_ADJUSTMENT_FACTOR: i128 = -99;

/// Homestead step divisor in seconds.
const HOMESTEAD_STEP_SECS: i128 = 10;

/// Byzantium/Constantinople step divisor in seconds.
const BYZANTIUM_STEP_SECS: i128 = 9;

/// Largest bomb exponent ever materialized.
///
/// Reached only past height ~409M; any difficulty this large is already far
/// beyond what a 256-bit seal can satisfy, so saturating here changes no
/// sealable outcome.
pub const MAX_BOMB_EXPONENT: u64 = 4096;

/// Difficulty rule set in force at a given height
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DifficultyEra {
    /// Launch rules
    Frontier,
    /// EIP-2
    Homestead,
    /// EIP-100 with a 3M block bomb delay
    Byzantium,
    /// EIP-1234 with a 5M block bomb delay
    Constantinople,
}

impl DifficultyEra {
    /// Era whose rules govern block `number`.
    pub fn at(rules: &ChainConfig, number: u64) -> Self {
        if rules.is_constantinople(number) {
            Self::Constantinople
        } else if rules.is_byzantium(number) {
            Self::Byzantium
        } else if rules.is_homestead(number) {
            Self::Homestead
        } else {
            Self::Frontier
        }
    }
}

/// Difficulty a child of `parent` created at `time` must have.
pub fn calc_difficulty(
    rules: &ChainConfig,
    params: &ProtocolParams,
    time: u64,
    parent: &Header,
) -> BigUint {
    let next = parent.number.saturating_add(1);
    match DifficultyEra::at(rules, next) {
        DifficultyEra::Constantinople => {
            delayed_bomb(params, params.constantinople_bomb_delay, time, parent)
        }
        DifficultyEra::Byzantium => delayed_bomb(params, params.byzantium_bomb_delay, time, parent),
        DifficultyEra::Homestead => homestead(params, time, parent),
        DifficultyEra::Frontier => frontier(params, time, parent),
    }
}

/// Signed seconds between the parent and the new block.
fn time_delta(time: u64, parent: &Header) -> i128 {
    i128::from(time) - i128::from(parent.time)
}

/// `parent_diff + parent_diff / divisor * max(1 - delta / step, -99)`, floored
/// at the minimum difficulty.
fn stepped(params: &ProtocolParams, step_secs: i128, time: u64, parent: &Header) -> BigUint {
    let quotient = time_delta(time, parent).div_euclid(step_secs);
    let factor = (1 - quotient).max(MIN_ADJUSTMENT_FACTOR);

    let step = BigInt::from(&parent.difficulty / params.difficulty_bound_divisor);
    let adjusted = BigInt::from(parent.difficulty.clone()) + step * BigInt::from(factor);
    floor_at_minimum(params, adjusted)
}

fn floor_at_minimum(params: &ProtocolParams, value: BigInt) -> BigUint {
    let minimum = BigUint::from(params.minimum_difficulty);
    if value.is_negative() {
        return minimum;
    }
    value.into_parts().1.max(minimum)
}

/// `2^(period - 2)` once `period > 1`, zero before that. The exponent
/// saturates at [`MAX_BOMB_EXPONENT`].
fn bomb(params: &ProtocolParams, height: u64) -> BigUint {
    let period = height / params.exp_diff_period.max(1);
    if period > 1 {
        BigUint::one() << (period - 2).min(MAX_BOMB_EXPONENT)
    } else {
        BigUint::default()
    }
}

fn delayed_bomb(params: &ProtocolParams, delay: u64, time: u64, parent: &Header) -> BigUint {
    let diff = stepped(params, BYZANTIUM_STEP_SECS, time, parent);

    // The parent sits one below the block being built.
    let delay_from_parent = delay.saturating_sub(1);
    let fake_number = parent.number.saturating_sub(delay_from_parent);
    diff + bomb(params, fake_number)
}

fn homestead(params: &ProtocolParams, time: u64, parent: &Header) -> BigUint {
    let diff = stepped(params, HOMESTEAD_STEP_SECS, time, parent);
    diff + bomb(params, parent.number.saturating_add(1))
}

fn frontier(params: &ProtocolParams, time: u64, parent: &Header) -> BigUint {
    let minimum = BigUint::from(params.minimum_difficulty);
    let adjust = &parent.difficulty / params.difficulty_bound_divisor;

    let mut diff = if time_delta(time, parent) < i128::from(params.duration_limit) {
        &parent.difficulty + &adjust
    } else {
        // adjust <= parent difficulty, never underflows
        &parent.difficulty - &adjust
    };
    if diff < minimum {
        diff = minimum.clone();
    }

    let diff = diff + bomb(params, parent.number.saturating_add(1));
    diff.max(minimum)
}
