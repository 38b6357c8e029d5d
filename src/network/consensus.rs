use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::blockchain::{Block, ChainValidator};
use crate::error::{LedgerError, Result};

/// What a node reports for "fetch chain": its blocks and their count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl ChainSnapshot {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len();
        Self { chain, length }
    }
}

/// Where consensus gets peer chains from.
pub trait ChainSource {
    fn fetch_chain(&self, peer: &str) -> impl Future<Output = Result<ChainSnapshot>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A strictly longer valid chain was found; it should replace ours.
    Replaced(Vec<Block>),
    /// No peer beat the local chain.
    Authoritative,
}

impl Resolution {
    pub fn adopted(&self) -> bool {
        matches!(self, Resolution::Replaced(_))
    }
}

/// Longest-valid-chain rule over a set of peers.
pub struct ConsensusResolver<'a, S> {
    source: &'a S,
    validator: ChainValidator,
    timeout: Option<Duration>,
}

impl<'a, S: ChainSource> ConsensusResolver<'a, S> {
    pub fn new(source: &'a S, validator: ChainValidator) -> Self {
        Self {
            source,
            validator,
            timeout: None,
        }
    }

    /// Bound each peer fetch; a peer that does not answer in time is skipped.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Visit `peers` in order and keep the longest valid chain that is
    /// strictly longer than `local` and than every candidate kept before it.
    /// Equal lengths never win. Unreachable, failing or malformed peers are
    /// skipped. Returns [`LedgerError::Cancelled`] if `token` fires first.
    pub async fn resolve(
        &self,
        local: &[Block],
        peers: &[String],
        token: &CancellationToken,
    ) -> Result<Resolution> {
        let mut best_length = local.len();
        let mut best_chain = None;

        for peer in peers {
            let fetched = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    log::debug!("CONSENSUS - resolution cancelled before {peer}");
                    return Err(LedgerError::Cancelled);
                }
                fetched = self.fetch(peer) => fetched,
            };

            let snapshot = match fetched {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    log::warn!("CONSENSUS - skipping {peer}: {error}");
                    continue;
                }
            };
            if snapshot.length != snapshot.chain.len() {
                log::warn!(
                    "CONSENSUS - skipping {peer}: reported length {} but sent {} blocks",
                    snapshot.length,
                    snapshot.chain.len()
                );
                continue;
            }
            if snapshot.length <= best_length {
                log::debug!(
                    "CONSENSUS - {peer} has {} blocks, best so far {best_length}",
                    snapshot.length
                );
                continue;
            }
            if let Err(reason) = self.validator.validate(&snapshot.chain) {
                log::warn!("CONSENSUS - discarding chain from {peer}: {reason}");
                continue;
            }

            log::debug!("CONSENSUS - {peer} leads with {} blocks", snapshot.length);
            best_length = snapshot.length;
            best_chain = Some(snapshot.chain);
        }

        Ok(match best_chain {
            Some(chain) => Resolution::Replaced(chain),
            None => Resolution::Authoritative,
        })
    }

    async fn fetch(&self, peer: &str) -> Result<ChainSnapshot> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.source.fetch_chain(peer))
                .await
                .map_err(|_| LedgerError::Peer {
                    peer: peer.to_string(),
                    reason: format!("no answer within {limit:?}"),
                })?,
            None => self.source.fetch_chain(peer).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChainSnapshot, ChainSource, ConsensusResolver, Resolution};
    use crate::blockchain::{Block, ChainValidator, Ledger};
    use crate::error::{LedgerError, Result};
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const DIFFICULTY: u32 = 1;

    enum Reply {
        Chain(ChainSnapshot),
        Down,
        Hang,
    }

    #[derive(Default)]
    struct FakePeers {
        replies: HashMap<String, Reply>,
    }

    impl FakePeers {
        fn with(mut self, peer: &str, reply: Reply) -> Self {
            self.replies.insert(peer.to_string(), reply);
            self
        }
    }

    impl ChainSource for FakePeers {
        async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot> {
            match self.replies.get(peer) {
                Some(Reply::Chain(snapshot)) => Ok(snapshot.clone()),
                Some(Reply::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!("hanging peer answered")
                }
                Some(Reply::Down) | None => Err(LedgerError::Peer {
                    peer: peer.to_string(),
                    reason: "connection refused".into(),
                }),
            }
        }
    }

    fn chain_of(len: usize, miner: &str) -> Vec<Block> {
        let mut ledger = Ledger::new(DIFFICULTY);
        while ledger.len() < len {
            ledger.mine(miner);
        }
        ledger.chain().to_vec()
    }

    fn invalid_chain_of(len: usize) -> Vec<Block> {
        let mut chain = chain_of(len, "liar");
        chain[len - 1].previous_hash = "0".repeat(64);
        chain
    }

    fn peers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn adopts_longer_valid_chain_only() {
        let local = chain_of(3, "me");
        let five = chain_of(5, "peer-a");
        let source = FakePeers::default()
            .with("a:1", Reply::Chain(ChainSnapshot::new(five.clone())))
            .with("b:1", Reply::Chain(ChainSnapshot::new(invalid_chain_of(6))))
            .with("c:1", Reply::Chain(ChainSnapshot::new(chain_of(2, "peer-c"))));

        let resolver = ConsensusResolver::new(&source, ChainValidator::new(DIFFICULTY));
        let outcome = resolver
            .resolve(&local, &peers(&["a:1", "b:1", "c:1"]), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, Resolution::Replaced(five));
    }

    #[tokio::test]
    async fn equal_length_is_not_adopted() {
        let local = chain_of(3, "me");
        let source = FakePeers::default()
            .with("a:1", Reply::Chain(ChainSnapshot::new(chain_of(3, "peer"))));
        let resolver = ConsensusResolver::new(&source, ChainValidator::new(DIFFICULTY));
        let outcome = resolver
            .resolve(&local, &peers(&["a:1"]), &CancellationToken::new())
            .await
            .unwrap();
        assert!(!outcome.adopted());
    }

    #[tokio::test]
    async fn later_longer_chain_overrides_earlier() {
        let local = chain_of(1, "me");
        let four = chain_of(4, "b");
        let source = FakePeers::default()
            .with("a:1", Reply::Chain(ChainSnapshot::new(chain_of(3, "a"))))
            .with("b:1", Reply::Chain(ChainSnapshot::new(four.clone())))
            .with("c:1", Reply::Chain(ChainSnapshot::new(chain_of(4, "c"))));
        let resolver = ConsensusResolver::new(&source, ChainValidator::new(DIFFICULTY));
        let outcome = resolver
            .resolve(&local, &peers(&["a:1", "b:1", "c:1"]), &CancellationToken::new())
            .await
            .unwrap();
        // c:1 ties with b:1 and so does not displace it.
        assert_eq!(outcome, Resolution::Replaced(four));
    }

    #[tokio::test]
    async fn unreachable_and_lying_peers_are_skipped() {
        let local = chain_of(2, "me");
        let mut short = ChainSnapshot::new(chain_of(2, "x"));
        short.length = 10;
        let source = FakePeers::default()
            .with("down:1", Reply::Down)
            .with("liar:1", Reply::Chain(short));
        let resolver = ConsensusResolver::new(&source, ChainValidator::new(DIFFICULTY));
        let outcome = resolver
            .resolve(
                &local,
                &peers(&["down:1", "liar:1", "unknown:1"]),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(outcome, Resolution::Authoritative);
    }

    #[tokio::test]
    async fn lone_foreign_block_beats_empty_local_chain() {
        // A single block passes validation whatever it contains.
        let stray = vec![Block::new(42, Vec::new(), 7, "nowhere".into())];
        let source =
            FakePeers::default().with("a:1", Reply::Chain(ChainSnapshot::new(stray.clone())));
        let resolver = ConsensusResolver::new(&source, ChainValidator::new(DIFFICULTY));
        let outcome = resolver
            .resolve(&[], &peers(&["a:1"]), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, Resolution::Replaced(stray));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_peer_times_out() {
        let local = chain_of(1, "me");
        let two = chain_of(2, "b");
        let source = FakePeers::default()
            .with("hang:1", Reply::Hang)
            .with("ok:1", Reply::Chain(ChainSnapshot::new(two.clone())));
        let resolver = ConsensusResolver::new(&source, ChainValidator::new(DIFFICULTY))
            .with_timeout(Some(Duration::from_secs(5)));
        let outcome = resolver
            .resolve(&local, &peers(&["hang:1", "ok:1"]), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, Resolution::Replaced(two));
    }

    #[tokio::test]
    async fn cancellation_aborts_resolution() {
        let source = FakePeers::default().with("hang:1", Reply::Hang);
        let resolver = ConsensusResolver::new(&source, ChainValidator::new(DIFFICULTY));
        let token = CancellationToken::new();
        token.cancel();
        let err = resolver
            .resolve(&chain_of(1, "me"), &peers(&["hang:1"]), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Cancelled));
    }
}
