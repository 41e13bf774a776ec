//! In-memory balance state

use std::collections::BTreeMap;

use primitive_types::U256;
use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash};

use crate::ports::StateMutator;

/// Balance-only state database.
///
/// The root is Keccak-256 over the address-sorted `(address, balance)`
/// pairs; it stands in for a real trie root.
#[derive(Debug, Default, Clone)]
pub struct InMemoryState {
    balances: BTreeMap<Address, U256>,
}

impl InMemoryState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `address`, zero if untouched
    pub fn balance(&self, address: &Address) -> U256 {
        self.balances.get(address).copied().unwrap_or_default()
    }

    /// Sum of all balances
    pub fn total_supply(&self) -> U256 {
        self.balances
            .values()
            .fold(U256::zero(), |acc, balance| acc.saturating_add(*balance))
    }

    /// Accounts present, including zero-balance ones
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    fn root(&self) -> Hash {
        let mut hasher = Keccak256::new();
        let mut word = [0u8; 32];
        for (address, balance) in &self.balances {
            balance.to_big_endian(&mut word);
            hasher.update(address);
            hasher.update(word);
        }
        hasher.finalize().into()
    }
}

impl StateMutator for InMemoryState {
    fn add_balance(&mut self, address: &Address, amount: U256) {
        let balance = self.balances.entry(*address).or_default();
        *balance = balance.saturating_add(amount);
    }

    fn intermediate_root(&mut self, delete_empty: bool) -> Hash {
        if delete_empty {
            self.balances.retain(|_, balance| !balance.is_zero());
        }
        self.root()
    }
}
