use actix_web::{HttpResponse, post, web};

use super::error::ApiError;
use super::models::{AppState, NewTxRequest, NewTxResponse};
use crate::transaction::Transaction;

/// Queue a transaction for the next block. Amounts are not checked.
#[post("/transactions/new/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> Result<HttpResponse, ApiError> {
    let NewTxRequest {
        sender,
        recipient,
        amount,
    } = body.into_inner();

    let (sender, recipient, amount) = match (sender, recipient, amount) {
        (Some(s), Some(r), Some(a)) => (s, r, a),
        (s, r, a) => {
            let missing = [
                ("sender", s.is_none()),
                ("recipient", r.is_none()),
                ("amount", a.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect::<Vec<_>>();
            log::warn!("POST /transactions/new/ - rejected, missing {missing:?}");
            return Err(ApiError::MissingFields(missing));
        }
    };

    let index = state.submit_transaction(Transaction::new(sender, recipient, amount));
    log::debug!("POST /transactions/new/ - queued for block {index}");

    Ok(HttpResponse::Created().json(NewTxResponse {
        message: format!("Transaction will be added to Block {index}"),
        index,
    }))
}
