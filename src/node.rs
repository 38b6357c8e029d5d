use std::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::blockchain::{Block, Ledger};
use crate::config::NodeConfig;
use crate::error::{LedgerError, Result};
use crate::network::{
    ChainSnapshot, ChainSource, ConsensusResolver, HttpChainSource, PeerRegistry, Resolution,
};
use crate::transaction::Transaction;

/// Result of a consensus round.
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    pub replaced: bool,
    pub chain: Vec<Block>,
}

/// One ledger participant: its chain, pending pool, peers and settings.
///
/// Chain and pool mutations go through one lock, so concurrent requests
/// against the same node are serialized. Several nodes can share a process.
pub struct Node<S = HttpChainSource> {
    config: NodeConfig,
    ledger: Mutex<Ledger>,
    peers: Mutex<PeerRegistry>,
    source: S,
    shutdown: CancellationToken,
}

impl Node<HttpChainSource> {
    pub fn new(config: NodeConfig) -> Result<Self> {
        Self::with_source(config, HttpChainSource::new())
    }
}

impl<S: ChainSource> Node<S> {
    /// Build a node that fetches peer chains through `source`. Peers listed
    /// in the config are registered up front.
    pub fn with_source(config: NodeConfig, source: S) -> Result<Self> {
        let mut peers = PeerRegistry::new();
        peers.register_all(&config.peers)?;

        Ok(Self {
            ledger: Mutex::new(Ledger::new(config.difficulty)),
            peers: Mutex::new(peers),
            config,
            source,
            shutdown: CancellationToken::new(),
        })
    }

    /// Token that aborts in-flight mining and consensus when cancelled.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn submit_transaction(&self, tx: Transaction) -> u64 {
        self.ledger().add_transaction(tx)
    }

    /// Solve against the current tip off the async executor, then commit.
    /// The lock is not held while searching; if the tip moved in the
    /// meantime (another block or a consensus swap) the search restarts
    /// against the new tip.
    pub async fn mine(&self) -> Result<Block> {
        loop {
            let (last_proof, previous_hash, pow) = {
                let ledger = self.ledger();
                let tip = ledger.last_block();
                (tip.proof, tip.hash(), ledger.pow())
            };

            let token = self.shutdown.clone();
            let search = move || pow.solve_cancellable(last_proof, &token);
            let proof = tokio::task::spawn_blocking(search)
                .await
                .map_err(|e| LedgerError::Internal(format!("puzzle worker failed: {e}")))??;

            let mut ledger = self.ledger();
            if ledger.last_block().hash() == previous_hash {
                return Ok(ledger.forge(&self.config.node_id, proof, previous_hash).clone());
            }
            log::debug!("NODE - tip moved while solving against proof {last_proof}, retrying");
        }
    }

    pub fn chain(&self) -> ChainSnapshot {
        ChainSnapshot::new(self.ledger().chain().to_vec())
    }

    pub fn pending(&self) -> Vec<Transaction> {
        self.ledger().pending().to_vec()
    }

    pub fn is_valid(&self) -> bool {
        self.ledger().is_valid_chain()
    }

    /// Register a batch of peer addresses; returns the full peer set.
    pub fn register_peers<I, A>(&self, addresses: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        let mut peers = self.peers();
        let added = peers.register_all(addresses)?;
        log::info!("NODE - {added} new peers, {} known", peers.len());
        Ok(peers.all())
    }

    pub fn peers_list(&self) -> Vec<String> {
        self.peers().all()
    }

    /// Run consensus against every registered peer and adopt the winner.
    pub async fn resolve(&self) -> Result<ResolveOutcome> {
        let local = self.ledger().chain().to_vec();
        let peers = self.peers_list();
        let validator = self.ledger().validator();

        let resolution = ConsensusResolver::new(&self.source, validator)
            .with_timeout(self.config.peer_timeout)
            .resolve(&local, &peers, &self.shutdown)
            .await?;

        let mut ledger = self.ledger();
        let replaced = match resolution {
            Resolution::Replaced(chain) => ledger.replace_chain(chain),
            Resolution::Authoritative => false,
        };
        Ok(ResolveOutcome {
            replaced,
            chain: ledger.chain().to_vec(),
        })
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().expect("mutex poisoned")
    }

    fn peers(&self) -> MutexGuard<'_, PeerRegistry> {
        self.peers.lock().expect("mutex poisoned")
    }
}
