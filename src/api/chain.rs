use actix_web::{HttpResponse, get, web};

use super::error::ApiError;
use super::models::{AppState, MineResponse, ValidateResponse};

/// Get the full chain and its length. This is also what peers fetch.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.chain())
}

/// Validate this node's own chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = state.chain();
    HttpResponse::Ok().json(ValidateResponse {
        valid: state.is_valid(),
        length: snapshot.length,
    })
}

/// Mine a block from the pending pool, paying the reward to this node.
#[get("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let block = state.mine().await?;
    log::info!(
        "MINER - sealed block #{} (proof={}, txs={})",
        block.index,
        block.proof,
        block.transactions.len()
    );
    Ok(HttpResponse::Ok().json(MineResponse {
        message: "New Block Forged",
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}
