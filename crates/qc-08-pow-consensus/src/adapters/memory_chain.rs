//! In-memory chain view

use std::collections::HashMap;

use parking_lot::RwLock;
use shared_types::{Block, Hash, Header};
use tracing::debug;

use crate::config::ChainConfig;
use crate::ports::ChainReader;

/// Chain view backed by hash maps.
///
/// Blocks and bare headers can be inserted in any order; the head is the
/// highest inserted header (first one wins on ties).
pub struct InMemoryChain {
    config: ChainConfig,
    headers: RwLock<HashMap<Hash, Header>>,
    blocks: RwLock<HashMap<Hash, Block>>,
    head: RwLock<Option<Header>>,
}

impl InMemoryChain {
    /// Empty chain following `config`.
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            headers: RwLock::new(HashMap::new()),
            blocks: RwLock::new(HashMap::new()),
            head: RwLock::new(None),
        }
    }

    /// Chain seeded with `genesis`.
    pub fn with_genesis(config: ChainConfig, genesis: Block) -> Self {
        let chain = Self::new(config);
        chain.insert_block(genesis);
        chain
    }

    /// Store a full block (its header becomes resolvable too).
    pub fn insert_block(&self, block: Block) -> Hash {
        let hash = self.insert_header(block.header.clone());
        self.blocks.write().insert(hash, block);
        hash
    }

    /// Store a header without a body.
    pub fn insert_header(&self, header: Header) -> Hash {
        let hash = header.hash();
        debug!(number = header.number, hash = %hex::encode(hash), "chain insert");

        let mut head = self.head.write();
        if head.as_ref().map_or(true, |current| header.number > current.number) {
            *head = Some(header.clone());
        }
        self.headers.write().insert(hash, header);
        hash
    }

    /// Number of stored headers
    pub fn len(&self) -> usize {
        self.headers.read().len()
    }

    /// No headers stored.
    pub fn is_empty(&self) -> bool {
        self.headers.read().is_empty()
    }
}

impl ChainReader for InMemoryChain {
    fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn current_header(&self) -> Header {
        self.head.read().clone().unwrap_or_default()
    }

    fn get_header(&self, hash: &Hash, number: u64) -> Option<Header> {
        self.headers
            .read()
            .get(hash)
            .filter(|header| header.number == number)
            .cloned()
    }

    fn get_block(&self, hash: &Hash, number: u64) -> Option<Block> {
        self.blocks
            .read()
            .get(hash)
            .filter(|block| block.number() == number)
            .cloned()
    }
}
