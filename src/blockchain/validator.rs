use thiserror::Error;

use super::{Block, ProofOfWork};

/// Why a chain failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidChain {
    #[error("block at position {position} does not link to the hash of its predecessor")]
    BrokenLink { position: usize },
    #[error("block at position {position} does not solve its predecessor's puzzle")]
    BadProof { position: usize },
}

/// Structural chain check: hash linkage and puzzle validity between every
/// adjacent pair. Transaction content is not inspected.
#[derive(Debug, Clone, Copy)]
pub struct ChainValidator {
    pow: ProofOfWork,
}

impl ChainValidator {
    pub fn new(difficulty: u32) -> Self {
        Self {
            pow: ProofOfWork::new(difficulty),
        }
    }

    /// Empty and single-block chains pass: there is no pair to check. A lone
    /// block is accepted even when it is not this node's genesis.
    pub fn validate(&self, chain: &[Block]) -> Result<(), InvalidChain> {
        for (position, pair) in chain.windows(2).enumerate() {
            let (prev, cur) = (&pair[0], &pair[1]);
            let position = position + 1;

            if cur.previous_hash != prev.hash() {
                return Err(InvalidChain::BrokenLink { position });
            }
            if !self.pow.is_valid(prev.proof, cur.proof) {
                return Err(InvalidChain::BadProof { position });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self, chain: &[Block]) -> bool {
        self.validate(chain).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChainValidator, InvalidChain};
    use crate::blockchain::{Block, Ledger};
    use crate::transaction::Transaction;

    const DIFFICULTY: u32 = 2;

    fn mined_chain(blocks: usize) -> Vec<Block> {
        let mut ledger = Ledger::new(DIFFICULTY);
        for i in 0..blocks - 1 {
            ledger.new_transaction("alice", "bob", i as f64);
            ledger.mine("miner");
        }
        ledger.chain().to_vec()
    }

    #[test]
    fn mined_chain_is_valid() {
        let chain = mined_chain(4);
        assert_eq!(chain.len(), 4);
        assert!(ChainValidator::new(DIFFICULTY).is_valid(&chain));
    }

    #[test]
    fn trivial_chains_pass() {
        let validator = ChainValidator::new(DIFFICULTY);
        assert!(validator.is_valid(&[]));
        assert!(validator.is_valid(&[Block::genesis()]));
    }

    #[test]
    fn lone_non_genesis_block_still_passes() {
        // Known edge case: nothing to compare a single block against.
        let stray = Block::new(9, vec![Transaction::new("x", "y", 5.0)], 1, "junk".into());
        assert!(!stray.is_genesis());
        assert!(ChainValidator::new(DIFFICULTY).is_valid(&[stray]));
    }

    #[test]
    fn tampered_previous_hash_fails() {
        let validator = ChainValidator::new(DIFFICULTY);
        for i in 1..4 {
            let mut chain = mined_chain(4);
            chain[i].previous_hash = "f".repeat(64);
            assert_eq!(
                validator.validate(&chain),
                Err(InvalidChain::BrokenLink { position: i })
            );
        }
    }

    #[test]
    fn tampered_proof_fails() {
        let validator = ChainValidator::new(DIFFICULTY);
        for i in 0..4 {
            let mut chain = mined_chain(4);
            chain[i].proof += 1;
            assert!(!validator.is_valid(&chain), "tampered proof at {i} accepted");
        }
    }

    #[test]
    fn tampered_transactions_break_the_next_link() {
        let mut chain = mined_chain(3);
        chain[1].transactions[0].amount = 1_000.0;
        assert_eq!(
            ChainValidator::new(DIFFICULTY).validate(&chain),
            Err(InvalidChain::BrokenLink { position: 2 })
        );
    }
}
