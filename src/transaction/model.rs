use serde::{Deserialize, Serialize};

/// A value transfer waiting in the pending pool or recorded in a block.
///
/// There is no transaction id: two transactions with the same sender,
/// recipient and amount are indistinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Mining reward: sender "0" means the coin was minted by this node.
    pub fn reward(recipient: impl Into<String>) -> Self {
        Self::new(
            crate::blockchain::REWARD_SENDER,
            recipient,
            crate::blockchain::MINING_REWARD,
        )
    }

    pub fn is_reward(&self) -> bool {
        self.sender == crate::blockchain::REWARD_SENDER
    }
}
