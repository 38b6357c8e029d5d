use serde::{Deserialize, Serialize};

use crate::blockchain::Block;
use crate::node::Node;
use crate::transaction::Transaction;

/// Shared application state handed to every handler.
pub type AppState = Node;

/* ---------- Transaction API Models ---------- */

/// Fields are optional so that absent ones can be reported by name.
#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub index: u64,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
}

/* ---------- Node API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct NodesResponse {
    pub message: &'static str,
    pub total_nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub message: &'static str,
    pub replaced: bool,
    pub chain: Vec<Block>,
}
