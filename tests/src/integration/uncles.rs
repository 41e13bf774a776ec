//! # Uncle Legality Over a Long Chain
//!
//! Builds a ten-block chain with side branches and checks the seven-block
//! uncle window from both ends.

#[cfg(test)]
mod tests {
    use qc_08_pow_consensus::adapters::InMemoryChain;
    use qc_08_pow_consensus::{ChainConfig, ConsensusEngine, ConsensusError, PowEngine};
    use shared_types::{Block, Header};

    use crate::fixtures::{child, genesis_for, init_tracing, test_engine};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    struct LongChain {
        engine: PowEngine,
        chain: InMemoryChain,
        /// `main[n]` is the canonical header at height `n`
        main: Vec<Header>,
    }

    impl LongChain {
        /// Genesis plus `length` canonical blocks, all stored as full blocks.
        fn new(length: usize) -> Self {
            init_tracing();
            let engine = test_engine();
            let genesis = genesis_for(&engine);
            let chain = InMemoryChain::with_genesis(
                ChainConfig::default(),
                Block::master(genesis.clone(), vec![], vec![]),
            );
            let mut main = vec![genesis];
            for _ in 0..length {
                let parent = main[main.len() - 1].clone();
                let header = child(&engine, &chain, &parent, b"", true);
                chain.insert_block(Block::master(header.clone(), vec![], vec![]));
                main.push(header);
            }
            Self { engine, chain, main }
        }

        /// A sealed side-branch header hanging off height `height`.
        fn side(&self, height: usize, tag: &[u8]) -> Header {
            child(&self.engine, &self.chain, &self.main[height], tag, true)
        }

        /// Next canonical block carrying `uncles`.
        fn tip_with(&self, uncles: Vec<Header>) -> Block {
            let parent = &self.main[self.main.len() - 1];
            let tip = child(&self.engine, &self.chain, parent, b"", true);
            Block::master(tip, vec![], vec![]).with_uncles(uncles)
        }
    }

    // =========================================================================
    // WINDOW BOUNDARIES
    // =========================================================================

    #[test]
    fn test_oldest_legal_uncle_parent() {
        // Tip at height 10: ancestors 9..=3 are inside the window.
        let fixture = LongChain::new(9);
        let uncle = fixture.side(3, b"old");
        let block = fixture.tip_with(vec![uncle]);
        assert_eq!(fixture.engine.verify_uncles(&fixture.chain, &block), Ok(()));
    }

    #[test]
    fn test_uncle_parent_outside_window_dangles() {
        let fixture = LongChain::new(9);
        let uncle = fixture.side(2, b"too-old");
        let block = fixture.tip_with(vec![uncle]);
        assert_eq!(
            fixture.engine.verify_uncles(&fixture.chain, &block),
            Err(ConsensusError::DanglingUncle)
        );
    }

    #[test]
    fn test_two_uncles_from_different_depths() {
        let fixture = LongChain::new(9);
        let uncles = vec![fixture.side(8, b"near"), fixture.side(4, b"far")];
        let block = fixture.tip_with(uncles);
        assert_eq!(fixture.engine.verify_uncles(&fixture.chain, &block), Ok(()));
    }

    #[test]
    fn test_short_chain_window_stops_at_genesis() {
        let fixture = LongChain::new(2);
        let uncle = fixture.side(0, b"genesis-sibling");
        let block = fixture.tip_with(vec![uncle]);
        assert_eq!(fixture.engine.verify_uncles(&fixture.chain, &block), Ok(()));
    }

    // =========================================================================
    // REWARD HISTORY
    // =========================================================================

    #[test]
    fn test_uncle_rewarded_within_window_is_duplicate() {
        let fixture = LongChain::new(5);
        let uncle = fixture.side(3, b"twice");

        // Height 6 rewards the uncle and becomes canonical.
        let first = fixture.tip_with(vec![uncle.clone()]);
        assert_eq!(fixture.engine.verify_uncles(&fixture.chain, &first), Ok(()));
        fixture.chain.insert_block(first.clone());

        let tip = child(&fixture.engine, &fixture.chain, &first.header, b"", true);
        let second = Block::master(tip, vec![], vec![]).with_uncles(vec![uncle]);
        assert_eq!(
            fixture.engine.verify_uncles(&fixture.chain, &second),
            Err(ConsensusError::DuplicateUncle)
        );
    }

    #[test]
    fn test_block_cannot_be_its_own_uncle() {
        let fixture = LongChain::new(3);
        let mut block = fixture.tip_with(vec![]);
        block.uncles = vec![block.header.clone()];
        assert_eq!(
            fixture.engine.verify_uncles(&fixture.chain, &block),
            Err(ConsensusError::DuplicateUncle)
        );
    }

    #[test]
    fn test_full_faker_skips_uncle_rules() {
        let fixture = LongChain::new(3);
        let ancestor = fixture.main[2].clone();
        let block = fixture.tip_with(vec![ancestor.clone(), ancestor.clone(), ancestor]);
        assert_eq!(
            PowEngine::new_full_faker().verify_uncles(&fixture.chain, &block),
            Ok(())
        );
    }
}
