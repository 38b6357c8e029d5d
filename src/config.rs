use std::env;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::blockchain::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use crate::error::{LedgerError, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_PEER_TIMEOUT_SECS: u64 = 10;

/// Settings of one node, normally read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    /// Leading hex zeros the puzzle requires. Fixed for the node's lifetime.
    pub difficulty: u32,
    /// Recipient of this node's mining rewards.
    pub node_id: String,
    /// Per-peer fetch limit during consensus; `None` waits forever.
    pub peer_timeout: Option<Duration>,
    /// Peers registered at startup.
    pub peers: Vec<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            difficulty: DEFAULT_DIFFICULTY,
            node_id: new_node_id(),
            peer_timeout: Some(Duration::from_secs(DEFAULT_PEER_TIMEOUT_SECS)),
            peers: Vec::new(),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Missing keys take their defaults; present
    /// but unparseable numbers are an error.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timeout_secs: u64 = parse_var(&lookup, "PEER_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_PEER_TIMEOUT_SECS);
        let difficulty = parse_var(&lookup, "DIFFICULTY")?.unwrap_or(defaults.difficulty);
        if difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::Config(format!(
                "DIFFICULTY={difficulty} is above the maximum of {MAX_DIFFICULTY}"
            )));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            difficulty,
            node_id: lookup("NODE_ID")
                .filter(|id| !id.trim().is_empty())
                .unwrap_or(defaults.node_id),
            peer_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            peers: lookup("PEERS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| LedgerError::Config(format!("{key}={raw:?} is not a valid number"))),
    }
}

/// Random identity without dashes.
pub fn new_node_id() -> String {
    Uuid::new_v4().simple().to_string()
}
