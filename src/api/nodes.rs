use actix_web::{HttpResponse, get, post, web};

use super::error::ApiError;
use super::models::{AppState, NodesResponse, RegisterNodesRequest, ResolveResponse};

#[post("/nodes/register/")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> Result<HttpResponse, ApiError> {
    let nodes = body
        .into_inner()
        .nodes
        .ok_or_else(|| ApiError::InvalidPeers("no \"nodes\" list given".into()))?;

    let total_nodes = state.register_peers(&nodes)?;
    Ok(HttpResponse::Created().json(NodesResponse {
        message: "New nodes have been added",
        total_nodes,
    }))
}

#[get("/nodes/")]
pub async fn list_nodes(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(NodesResponse {
        message: "Known nodes",
        total_nodes: state.peers_list(),
    })
}

/// Replace our chain with the longest valid one among peers, if any.
#[get("/nodes/resolve/")]
pub async fn resolve_conflicts(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let outcome = state.resolve().await?;
    let message = if outcome.replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    Ok(HttpResponse::Ok().json(ResolveResponse {
        message,
        replaced: outcome.replaced,
        chain: outcome.chain,
    }))
}
