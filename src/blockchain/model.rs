use super::{Block, ChainValidator, ProofOfWork};
use crate::transaction::Transaction;

/// In-memory chain plus the pool of transactions waiting for the next block.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    pow: ProofOfWork,
}

impl Ledger {
    /// Initialize a new ledger with a genesis block.
    pub fn new(difficulty: u32) -> Self {
        Self {
            chain: vec![Block::genesis()],
            pending: Vec::new(),
            pow: ProofOfWork::new(difficulty),
        }
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("ledger always holds at least the genesis block")
    }

    /// Queue a transfer for the next block. Returns that block's index.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
    ) -> u64 {
        self.add_transaction(Transaction::new(sender, recipient, amount))
    }

    pub fn add_transaction(&mut self, tx: Transaction) -> u64 {
        self.pending.push(tx);
        log::debug!("LEDGER - pending pool size now {}", self.pending.len());
        self.next_index()
    }

    /// Seal the pending pool into a block linked to `previous_hash`, or to
    /// the current tip's canonical hash when none is given. The pool is
    /// emptied once the block has taken its snapshot.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> &Block {
        let previous_hash = previous_hash.unwrap_or_else(|| self.last_block().hash());
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(self.next_index(), transactions, proof, previous_hash);

        self.chain.push(block);
        self.last_block()
    }

    /// Reward `recipient`, solve against the tip's proof and append the block.
    pub fn mine(&mut self, recipient: &str) -> &Block {
        let last = self.last_block();
        let (last_proof, previous_hash) = (last.proof, last.hash());
        let proof = self.pow.solve(last_proof);
        self.forge(recipient, proof, previous_hash)
    }

    /// Append a block for a proof found elsewhere against `previous_hash`.
    pub fn forge(&mut self, recipient: &str, proof: u64, previous_hash: String) -> &Block {
        self.add_transaction(Transaction::reward(recipient));
        let block = self.new_block(proof, Some(previous_hash));
        log::debug!(
            "LEDGER - forged block #{} (proof={}, txs={})",
            block.index,
            block.proof,
            block.transactions.len()
        );
        block
    }

    /// Swap in `candidate` if it is strictly longer than the current chain
    /// and structurally valid. The pending pool is kept.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> bool {
        if candidate.len() <= self.chain.len() || !self.validator().is_valid(&candidate) {
            return false;
        }
        log::info!(
            "LEDGER - chain replaced: {} -> {} blocks",
            self.chain.len(),
            candidate.len()
        );
        self.chain = candidate;
        true
    }

    pub fn is_valid_chain(&self) -> bool {
        self.validator().is_valid(&self.chain)
    }

    pub fn validator(&self) -> ChainValidator {
        ChainValidator::new(self.pow.difficulty())
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn pow(&self) -> ProofOfWork {
        self.pow
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    fn next_index(&self) -> u64 {
        self.chain.len() as u64 + 1
    }
}
