use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, TransactRequest, TransactResponse};

/// Send from the node wallet. Reuses the wallet's staged transaction when
/// there is one. Runs on the blocking pool since it waits out a mining round.
#[post("/transact")]
pub async fn post_transact(
    state: web::Data<AppState>,
    body: web::Json<TransactRequest>,
) -> impl Responder {
    let TransactRequest { recipient, amount } = body.into_inner();
    let st = state.clone();
    let to = recipient.clone();
    match web::block(move || st.node.transact(&to, amount)).await {
        Ok(Ok(transaction)) => {
            info!(
                "POST /transact - staged {} ({} -> {})",
                transaction.id, amount, recipient
            );
            HttpResponse::Ok().json(TransactResponse::Success { transaction })
        }
        Ok(Err(e)) => {
            warn!("POST /transact - rejected: {e}");
            HttpResponse::BadRequest().json(TransactResponse::Error {
                message: e.to_string(),
            })
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Staged transactions keyed by id.
#[get("/transaction-pool-map")]
pub async fn get_transaction_pool_map(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.node.staged_transactions())
}
