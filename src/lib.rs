pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod network;
pub mod node;
pub mod transaction;

pub use config::NodeConfig;
pub use error::{LedgerError, Result};
pub use node::{Node, ResolveOutcome};
