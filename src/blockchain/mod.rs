pub mod block;
pub mod codec;
pub mod model;
pub mod pow;
pub mod validator;

pub use block::Block;
pub use model::Ledger;
pub use pow::{ProofOfWork, valid_proof};
pub use validator::{ChainValidator, InvalidChain};

/// Default Proof-of-Work difficulty (number of leading hex zeros).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// A SHA-256 hex digest has 64 characters; no nonce can beat more zeros.
pub const MAX_DIFFICULTY: u32 = 64;

/// Proof carried by the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// Placeholder `previous_hash` of the genesis block (not a real digest).
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Amount minted to the miner of each block.
pub const MINING_REWARD: f64 = 1.0;

/// Sender used for the mining reward transaction.
pub const REWARD_SENDER: &str = "0";
