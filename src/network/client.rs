use super::consensus::{ChainSnapshot, ChainSource};
use crate::error::{LedgerError, Result};

/// Path every node serves its chain snapshot on.
pub const CHAIN_PATH: &str = "/api/v1/chain/";

/// Fetches peer chains over plain HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpChainSource {
    client: reqwest::Client,
}

impl HttpChainSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain_url(peer: &str) -> String {
        format!("http://{peer}{CHAIN_PATH}")
    }
}

impl ChainSource for HttpChainSource {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot> {
        let peer_error = |reason: String| LedgerError::Peer {
            peer: peer.to_string(),
            reason,
        };

        let response = self
            .client
            .get(Self::chain_url(peer))
            .send()
            .await
            .map_err(|e| peer_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(peer_error(format!("status {status}")));
        }

        response
            .json::<ChainSnapshot>()
            .await
            .map_err(|e| peer_error(format!("malformed chain: {e}")))
    }
}
