use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use crate::error::{LedgerError, Result};

/// How many candidates `solve_cancellable` tries between token checks.
const CHECK_INTERVAL: u64 = 4096;

/// Does SHA-256 of `"{reference}{nonce}"` start with `difficulty` zero hex digits?
pub fn valid_proof(reference: u64, nonce: u64, difficulty: u32) -> bool {
    let guess = format!("{reference}{nonce}");
    let digest = Sha256::digest(guess.as_bytes());
    leading_zero_nibbles(&digest) >= difficulty
}

fn leading_zero_nibbles(digest: &[u8]) -> u32 {
    let mut count = 0;
    for byte in digest {
        if *byte == 0 {
            count += 2;
            continue;
        }
        if byte >> 4 == 0 {
            count += 1;
        }
        break;
    }
    count
}

/// Brute-force puzzle search at a fixed difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn is_valid(&self, reference: u64, nonce: u64) -> bool {
        valid_proof(reference, nonce, self.difficulty)
    }

    /// Smallest nonce satisfying the puzzle against `reference`.
    /// Linear scan from 0 with no upper bound.
    pub fn solve(&self, reference: u64) -> u64 {
        let mut nonce = 0;
        while !self.is_valid(reference, nonce) {
            nonce += 1;
        }
        nonce
    }

    /// Same search as [`solve`](Self::solve), abandoned with
    /// [`LedgerError::Cancelled`] once `token` fires. The search keeps no
    /// state between candidates, so stopping at any point is safe.
    pub fn solve_cancellable(&self, reference: u64, token: &CancellationToken) -> Result<u64> {
        let mut nonce = 0;
        loop {
            if nonce % CHECK_INTERVAL == 0 && token.is_cancelled() {
                log::debug!("POW - search against {reference} cancelled at nonce {nonce}");
                return Err(LedgerError::Cancelled);
            }
            if self.is_valid(reference, nonce) {
                return Ok(nonce);
            }
            nonce += 1;
        }
    }
}
