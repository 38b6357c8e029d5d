pub mod client;
pub mod consensus;
pub mod peers;

pub use client::HttpChainSource;
pub use consensus::{ChainSnapshot, ChainSource, ConsensusResolver, Resolution};
pub use peers::PeerRegistry;
