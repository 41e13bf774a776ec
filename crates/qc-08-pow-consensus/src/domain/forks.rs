//! Hard-fork specific header rules

use shared_types::Header;

use crate::config::ChainConfig;
use crate::error::ForkError;

/// Extra-data marker required (or forbidden) in the DAO fork window.
pub const DAO_FORK_EXTRA: &[u8] = b"dao-hard-fork";

/// Number of blocks, starting at the DAO fork, that carry the marker rule.
pub const DAO_FORK_EXTRA_RANGE: u64 = 10;

impl ChainConfig {
    /// Check the fork-specific header rules.
    ///
    /// The EIP-150 hash pin never applies to uncles.
    pub fn verify_fork_rules(&self, header: &Header, uncle: bool) -> Result<(), ForkError> {
        self.verify_dao_extra(header)?;
        if !uncle {
            self.verify_fork_hash(header)?;
        }
        Ok(())
    }

    fn verify_dao_extra(&self, header: &Header) -> Result<(), ForkError> {
        let Some(fork) = self.dao_fork_block else {
            return Ok(());
        };
        let window = fork..fork.saturating_add(DAO_FORK_EXTRA_RANGE);
        if !window.contains(&header.number) {
            return Ok(());
        }

        let marked = header.extra == DAO_FORK_EXTRA;
        match (self.dao_fork_support, marked) {
            (true, false) => Err(ForkError::BadProDaoExtra),
            (false, true) => Err(ForkError::BadNoDaoExtra),
            _ => Ok(()),
        }
    }

    fn verify_fork_hash(&self, header: &Header) -> Result<(), ForkError> {
        let (Some(number), Some(want)) = (self.eip150_block, self.eip150_hash) else {
            return Ok(());
        };
        if header.number != number {
            return Ok(());
        }
        let have = header.hash();
        if have != want {
            return Err(ForkError::BadForkHash { number, have, want });
        }
        Ok(())
    }
}
