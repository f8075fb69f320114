use cryptochain::{Block, BlockData, Node, Transaction};
use serde::{Deserialize, Serialize};

/// Shared application state: the node handle.
pub struct AppState {
    pub node: Node,
}

impl AppState {
    pub fn new(node: Node) -> Self {
        Self { node }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Deserialize)]
pub struct MineRequest {
    pub payload: BlockData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceChainRequest {
    pub chain: Vec<Block>,
    #[serde(default)]
    pub validate_transactions: bool,
}

#[derive(Serialize)]
pub struct ReplaceChainResponse {
    pub replaced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub length: usize,
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct TransactRequest {
    pub recipient: String,
    pub amount: u64,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactResponse {
    Success { transaction: Transaction },
    Error { message: String },
}

/* ---------- Balance API Models ---------- */

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: u64,
}
