//! Configuration types for the PoW consensus engine
//!
//! Everything here is loaded once at engine construction and then passed by
//! reference into the pure domain functions. Nothing is read from globals.

use primitive_types::U256;
use serde::Deserialize;
use shared_types::Hash;

/// Default future-block tolerance in seconds.
pub const DEFAULT_ALLOWED_FUTURE_BLOCK_SECS: u64 = 15;

/// Default number of blocks per PoW cache/dataset epoch.
pub const DEFAULT_EPOCH_LENGTH: u64 = 30_000;

/// Dataset size used by [`PowMode::Test`].
pub const TEST_DATASET_SIZE: u64 = 32 * 1024;

/// Proof-of-work operating mode
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PowMode {
    /// Full verification against the real cache/dataset sizes.
    #[default]
    Normal,
    /// Full verification against a tiny dataset size.
    Test,
    /// Accept any seal after an artificial delay (optionally failing one block).
    Fake,
    /// Accept every header, uncle set and seal without looking at it.
    FullFake,
}

impl PowMode {
    /// Seals are simulated rather than recomputed.
    pub fn is_fake(self) -> bool {
        matches!(self, Self::Fake | Self::FullFake)
    }
}

/// Runtime configuration for the consensus engine
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// PoW operating mode
    pub pow_mode: PowMode,

    /// Artificial seal verification delay in fake modes (milliseconds)
    pub fake_delay_ms: u64,

    /// Block number whose seal is rejected in fake modes
    pub fake_fail: Option<u64>,

    /// Maximum seconds a non-uncle header may be ahead of local time
    pub allowed_future_block_secs: u64,

    /// Maximum number of uncles per block
    pub max_uncles: usize,

    /// Number of ancestors searched for uncle legality
    pub uncle_window: usize,

    /// Blocks per cache/dataset epoch
    pub epoch_length: u64,

    /// Dataset size handed to the light hasher in [`PowMode::Test`]
    pub test_dataset_size: u64,

    /// Protocol constants
    pub params: ProtocolParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pow_mode: PowMode::Normal,
            fake_delay_ms: 0,
            fake_fail: None,
            allowed_future_block_secs: DEFAULT_ALLOWED_FUTURE_BLOCK_SECS,
            max_uncles: 2,
            uncle_window: 7,
            epoch_length: DEFAULT_EPOCH_LENGTH,
            test_dataset_size: TEST_DATASET_SIZE,
            params: ProtocolParams::default(),
        }
    }
}

impl EngineConfig {
    /// Config for a fake engine with the given mode.
    pub fn fake(mode: PowMode) -> Self {
        Self {
            pow_mode: mode,
            ..Default::default()
        }
    }
}

/// Protocol constants shared by validation, difficulty and rewards
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProtocolParams {
    /// Maximum header extra-data length in bytes
    pub max_extra_data_size: usize,

    /// Divisor bounding gas limit movement between parent and child
    pub gas_limit_bound_divisor: u64,

    /// Minimum gas limit
    pub min_gas_limit: u64,

    /// Maximum gas limit (2^63 - 1)
    pub max_gas_limit: u64,

    /// Timestamp cap applied to uncles instead of the future-block check
    pub uncle_time_cap: u64,

    /// Divisor used in the difficulty adjustment step
    pub difficulty_bound_divisor: u64,

    /// Difficulty floor before the exponential term
    pub minimum_difficulty: u64,

    /// Frontier block time threshold in seconds
    pub duration_limit: u64,

    /// Blocks per exponential difficulty period
    pub exp_diff_period: u64,

    /// Ice-age delay in the Byzantium era
    pub byzantium_bomb_delay: u64,

    /// Ice-age delay in the Constantinople era
    pub constantinople_bomb_delay: u64,

    /// Master block reward before the era multiplier (wei)
    pub block_reward_base: U256,

    /// Value of one shard reward unit (wei)
    pub reward_base_unit: U256,

    /// Heights at which the reward multiplier halves
    pub reward_stage_thresholds: Vec<u64>,

    /// Reward multiplier before the first threshold
    pub max_reward_multiplier: u64,

    /// Reward units split across active shards per master block
    pub shard_reward_pool: u64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            max_extra_data_size: 32,
            gas_limit_bound_divisor: 1024,
            min_gas_limit: 5000,
            max_gas_limit: 0x7fff_ffff_ffff_ffff,
            uncle_time_cap: u64::MAX,
            difficulty_bound_divisor: 2048,
            minimum_difficulty: 131_072,
            duration_limit: 13,
            exp_diff_period: 100_000,
            byzantium_bomb_delay: 3_000_000,
            constantinople_bomb_delay: 5_000_000,
            // 3125 * 10^14 wei
            block_reward_base: U256::from(3125u64) * U256::exp10(14),
            // 3125 * 10^10 wei
            reward_base_unit: U256::from(3125u64) * U256::exp10(10),
            reward_stage_thresholds: vec![
                13_200_000, 26_400_000, 39_600_000, 52_800_000, 66_000_000, 79_200_000,
            ],
            max_reward_multiplier: 64,
            shard_reward_pool: 10_000,
        }
    }
}

/// Chain rules: fork activation heights and fork-specific header rules
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChainConfig {
    /// Network chain id
    pub chain_id: u64,

    /// Homestead activation height
    pub homestead_block: Option<u64>,

    /// DAO hard-fork height
    pub dao_fork_block: Option<u64>,

    /// Whether this node supports the DAO hard-fork
    pub dao_fork_support: bool,

    /// EIP-150 activation height
    pub eip150_block: Option<u64>,

    /// Header hash pinned at the EIP-150 height
    pub eip150_hash: Option<Hash>,

    /// EIP-155 activation height
    pub eip155_block: Option<u64>,

    /// EIP-158 activation height
    pub eip158_block: Option<u64>,

    /// Byzantium activation height
    pub byzantium_block: Option<u64>,

    /// Constantinople activation height
    pub constantinople_block: Option<u64>,
}

impl Default for ChainConfig {
    /// Developer network: every fork active from genesis, no DAO fork.
    fn default() -> Self {
        Self {
            chain_id: 1337,
            homestead_block: Some(0),
            dao_fork_block: None,
            dao_fork_support: false,
            eip150_block: Some(0),
            eip150_hash: None,
            eip155_block: Some(0),
            eip158_block: Some(0),
            byzantium_block: Some(0),
            constantinople_block: Some(0),
        }
    }
}

fn is_forked(fork: Option<u64>, number: u64) -> bool {
    fork.is_some_and(|block| number >= block)
}

impl ChainConfig {
    /// A chain with no forks scheduled (Frontier rules forever).
    pub fn frontier() -> Self {
        Self {
            chain_id: 1337,
            homestead_block: None,
            dao_fork_block: None,
            dao_fork_support: false,
            eip150_block: None,
            eip150_hash: None,
            eip155_block: None,
            eip158_block: None,
            byzantium_block: None,
            constantinople_block: None,
        }
    }

    /// Homestead rules apply at `number`.
    pub fn is_homestead(&self, number: u64) -> bool {
        is_forked(self.homestead_block, number)
    }

    /// Byzantium rules apply at `number`.
    pub fn is_byzantium(&self, number: u64) -> bool {
        is_forked(self.byzantium_block, number)
    }

    /// Constantinople rules apply at `number`.
    pub fn is_constantinople(&self, number: u64) -> bool {
        is_forked(self.constantinople_block, number)
    }

    /// EIP-158 (empty account deletion) applies at `number`.
    pub fn is_eip158(&self, number: u64) -> bool {
        is_forked(self.eip158_block, number)
    }
}
