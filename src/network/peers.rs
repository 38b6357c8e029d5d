use reqwest::Url;
use std::collections::BTreeSet;

use crate::error::{LedgerError, Result};

/// Known peer locations in `host[:port]` form.
///
/// Kept sorted so consensus visits peers in the same order on every run.
#[derive(Debug, Default, Clone)]
pub struct PeerRegistry {
    peers: BTreeSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the network location of `address`. Returns `false` if it was
    /// already known.
    pub fn register(&mut self, address: &str) -> Result<bool> {
        let location = network_location(address)?;
        let added = self.peers.insert(location.clone());
        if added {
            log::debug!("PEERS - registered {location}");
        }
        Ok(added)
    }

    /// Register every address or none: the batch is parsed before any insert.
    pub fn register_all<I, S>(&mut self, addresses: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = addresses
            .into_iter()
            .map(|a| network_location(a.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let before = self.peers.len();
        self.peers.extend(parsed);
        Ok(self.peers.len() - before)
    }

    pub fn all(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Strip scheme, path, query and credentials, keeping `host[:port]` with
/// the port exactly when one was written, even if it is the scheme default.
/// Bare `host:port` is read as an `http://` address.
pub fn network_location(address: &str) -> Result<String> {
    let trimmed = address.trim();
    let invalid = || LedgerError::InvalidPeerAddress(address.to_string());
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    let url = Url::parse(&with_scheme).map_err(|_| invalid())?;
    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(invalid()),
    };

    let port = if has_explicit_port(&with_scheme) {
        url.port_or_known_default()
    } else {
        None
    };
    Ok(match port {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// `Url` forgets a port equal to the scheme default, so look at the text.
fn has_explicit_port(address: &str) -> bool {
    let rest = address.split_once("://").map_or(address, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let after_host = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port.find(':').map_or("", |i| &host_port[i..]),
    };
    after_host.len() > 1
}

#[cfg(test)]
mod tests {
    use super::{PeerRegistry, network_location};

    #[test]
    fn strips_scheme_and_path() {
        assert_eq!(network_location("http://192.168.0.5:5000").unwrap(), "192.168.0.5:5000");
        assert_eq!(
            network_location("http://node.local:5001/chain?x=1").unwrap(),
            "node.local:5001"
        );
        assert_eq!(network_location("https://peer.example").unwrap(), "peer.example");
        assert_eq!(network_location(" 10.0.0.1:5002 ").unwrap(), "10.0.0.1:5002");
    }

    #[test]
    fn keeps_explicit_default_ports() {
        assert_eq!(network_location("https://peer.example:443").unwrap(), "peer.example:443");
        assert_eq!(network_location("http://peer.example:80/chain").unwrap(), "peer.example:80");
        assert_eq!(network_location("http://user@[::1]:80").unwrap(), "[::1]:80");
        assert_eq!(network_location("http://[::1]").unwrap(), "[::1]");
    }

    #[test]
    fn default_port_does_not_merge_with_bare_host() {
        let mut registry = PeerRegistry::new();
        assert!(registry.register("http://peer.example:80").unwrap());
        assert!(registry.register("peer.example").unwrap());
        assert_eq!(registry.all(), vec!["peer.example", "peer.example:80"]);
    }

    #[test]
    fn rejects_addresses_without_host() {
        assert!(network_location("").is_err());
        assert!(network_location("http://").is_err());
        assert!(network_location("http://:5000").is_err());
    }

    #[test]
    fn duplicates_collapse() {
        let mut registry = PeerRegistry::new();
        assert!(registry.register("http://127.0.0.1:5001").unwrap());
        assert!(!registry.register("127.0.0.1:5001").unwrap());
        assert!(!registry.register("http://127.0.0.1:5001/api/v1/chain/").unwrap());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn iteration_is_sorted() {
        let mut registry = PeerRegistry::new();
        registry
            .register_all(["http://c:1", "http://a:1", "http://b:1"])
            .unwrap();
        assert_eq!(registry.all(), vec!["a:1", "b:1", "c:1"]);
    }

    #[test]
    fn bad_batch_registers_nothing() {
        let mut registry = PeerRegistry::new();
        assert!(registry.register_all(["http://a:1", "http://"]).is_err());
        assert!(registry.is_empty());
    }
}
