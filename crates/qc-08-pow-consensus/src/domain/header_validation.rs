//! Header field validation against the parent
//!
//! Covers every rule that needs only the header, its parent and the clock.
//! Seal and fork checks are layered on top by the engine, in that order.

use shared_types::Header;

use super::difficulty::calc_difficulty;
use crate::config::{ChainConfig, ProtocolParams};
use crate::error::{ConsensusError, ConsensusResult};

/// Everything a field check needs besides the two headers
#[derive(Clone, Copy, Debug)]
pub struct ValidationContext<'a> {
    /// Fork schedule
    pub rules: &'a ChainConfig,
    /// Protocol constants
    pub params: &'a ProtocolParams,
    /// Local unix time in seconds
    pub now: u64,
    /// Future tolerance for non-uncle headers
    pub allowed_future_secs: u64,
}

impl ValidationContext<'_> {
    /// Check `header` against `parent`; the first failing rule is reported.
    ///
    /// Order: extra-data, timestamp bound, timestamp monotonicity, difficulty,
    /// gas limit cap, gas used, gas limit movement, block number.
    pub fn verify_fields(&self, header: &Header, parent: &Header, uncle: bool) -> ConsensusResult<()> {
        self.verify_extra(header)?;
        self.verify_time(header, parent, uncle)?;
        self.verify_difficulty(header, parent)?;
        self.verify_gas(header, parent)?;
        verify_number(header, parent)
    }

    fn verify_extra(&self, header: &Header) -> ConsensusResult<()> {
        let limit = self.params.max_extra_data_size;
        if header.extra.len() > limit {
            return Err(ConsensusError::ExtraDataTooLong {
                size: header.extra.len(),
                limit,
            });
        }
        Ok(())
    }

    fn verify_time(&self, header: &Header, parent: &Header, uncle: bool) -> ConsensusResult<()> {
        if uncle {
            if header.time > self.params.uncle_time_cap {
                return Err(ConsensusError::LargeBlockTime);
            }
        } else if header.time > self.now.saturating_add(self.allowed_future_secs) {
            return Err(ConsensusError::FutureBlock {
                timestamp: header.time,
                now: self.now,
            });
        }
        if header.time <= parent.time {
            return Err(ConsensusError::ZeroBlockTime);
        }
        Ok(())
    }

    fn verify_difficulty(&self, header: &Header, parent: &Header) -> ConsensusResult<()> {
        let want = calc_difficulty(self.rules, self.params, header.time, parent);
        if want != header.difficulty {
            return Err(ConsensusError::InvalidDifficulty {
                have: header.difficulty.clone(),
                want,
            });
        }
        Ok(())
    }

    fn verify_gas(&self, header: &Header, parent: &Header) -> ConsensusResult<()> {
        if header.gas_limit > self.params.max_gas_limit {
            return Err(ConsensusError::GasLimitTooHigh {
                have: header.gas_limit,
                max: self.params.max_gas_limit,
            });
        }
        if header.gas_used > header.gas_limit {
            return Err(ConsensusError::GasUsedExceedsLimit {
                gas_used: header.gas_used,
                gas_limit: header.gas_limit,
            });
        }

        let diff = parent.gas_limit.abs_diff(header.gas_limit);
        let bound = parent.gas_limit / self.params.gas_limit_bound_divisor;
        if diff >= bound || header.gas_limit < self.params.min_gas_limit {
            return Err(ConsensusError::InvalidGasLimit {
                have: header.gas_limit,
                parent: parent.gas_limit,
                bound,
            });
        }
        Ok(())
    }
}

fn verify_number(header: &Header, parent: &Header) -> ConsensusResult<()> {
    if parent.number.checked_add(1) != Some(header.number) {
        return Err(ConsensusError::InvalidNumber {
            have: header.number,
            parent: parent.number,
        });
    }
    Ok(())
}
