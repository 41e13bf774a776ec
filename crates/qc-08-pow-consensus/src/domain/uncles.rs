//! Uncle set legality
//!
//! An uncle must be a recent sibling of the main chain: its parent is one of
//! the last few ancestors (but not the block's own parent), it is not itself
//! an ancestor, and it has not been rewarded before.

use std::collections::{HashMap, HashSet};

use shared_types::{Block, Hash, Header};
use tracing::trace;

use crate::error::{ConsensusError, ConsensusResult};
use crate::ports::ChainReader;

/// Recent ancestry of a block, gathered per call
#[derive(Debug, Default)]
pub struct Ancestry {
    /// Ancestor headers by hash, including the block itself
    pub ancestors: HashMap<Hash, Header>,
    /// Hashes already rewarded as uncles, including the block itself
    pub rewarded: HashSet<Hash>,
}

impl Ancestry {
    /// Walk up to `window` ancestors of `block`, stopping early at the first
    /// block the chain cannot resolve.
    pub fn collect(chain: &dyn ChainReader, block: &Block, window: usize) -> Self {
        let mut ancestry = Self::default();

        let mut parent = block.parent_hash();
        let mut number = block.number().checked_sub(1);
        for _ in 0..window {
            let Some(height) = number else { break };
            let Some(ancestor) = chain.get_block(&parent, height) else {
                trace!(height, "uncle ancestry walk stopped early");
                break;
            };
            ancestry
                .rewarded
                .extend(ancestor.uncles.iter().map(Header::hash));
            parent = ancestor.parent_hash();
            number = height.checked_sub(1);
            ancestry.ancestors.insert(ancestor.hash(), ancestor.header);
        }

        let hash = block.hash();
        ancestry.ancestors.insert(hash, block.header.clone());
        ancestry.rewarded.insert(hash);
        ancestry
    }
}

/// Check the uncle set of `block`.
///
/// `verify_uncle(uncle, parent)` runs the full header check on each uncle
/// once its placement is legal.
pub fn verify_uncles<F>(
    chain: &dyn ChainReader,
    block: &Block,
    max_uncles: usize,
    window: usize,
    mut verify_uncle: F,
) -> ConsensusResult<()>
where
    F: FnMut(&Header, &Header) -> ConsensusResult<()>,
{
    if block.uncles.len() > max_uncles {
        return Err(ConsensusError::TooManyUncles {
            count: block.uncles.len(),
            limit: max_uncles,
        });
    }
    if block.uncles.is_empty() {
        return Ok(());
    }

    let Ancestry {
        ancestors,
        mut rewarded,
    } = Ancestry::collect(chain, block, window);

    for uncle in &block.uncles {
        let hash = uncle.hash();
        if !rewarded.insert(hash) {
            return Err(ConsensusError::DuplicateUncle);
        }
        if ancestors.contains_key(&hash) {
            return Err(ConsensusError::UncleIsAncestor);
        }
        let parent = match ancestors.get(&uncle.parent_hash) {
            Some(parent) if uncle.parent_hash != block.parent_hash() => parent,
            _ => return Err(ConsensusError::DanglingUncle),
        };
        verify_uncle(uncle, parent)?;
    }
    Ok(())
}
