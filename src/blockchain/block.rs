use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::codec;
use super::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::transaction::Transaction;

/// A single block in the chain holding a snapshot of the pending pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain.
    pub index: u64,
    pub timestamp: f64, // seconds since epoch (UTC), sub-second precision
    pub transactions: Vec<Transaction>,
    /// Puzzle solution against the previous block's proof.
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis() -> Self {
        Self::new(1, Vec::new(), GENESIS_PROOF, GENESIS_PREVIOUS_HASH.to_string())
    }

    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        Self {
            index,
            timestamp: now_secs(),
            transactions,
            proof,
            previous_hash,
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 1
            && self.proof == GENESIS_PROOF
            && self.previous_hash == GENESIS_PREVIOUS_HASH
    }

    /// Canonical SHA-256 of this block, see [`codec::canonical_hash`].
    pub fn hash(&self) -> String {
        codec::canonical_hash(self)
    }
}

fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
