use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, warn};

use super::models::{AppState, MineRequest, ReplaceChainRequest, ReplaceChainResponse};

/// Get the full blockchain.
#[get("/blocks")]
pub async fn get_blocks(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.node.chain())
}

/// Mine a block carrying an arbitrary payload.
/// Proof-of-work runs on the blocking thread pool.
#[post("/mine")]
pub async fn mine(state: web::Data<AppState>, req: web::Json<MineRequest>) -> impl Responder {
    let payload = req.into_inner().payload;
    let st = state.clone();
    match web::block(move || st.node.mine(payload)).await {
        Ok(Ok(block)) => HttpResponse::Ok().json(block),
        Ok(Err(e)) => {
            warn!("POST /mine - {e}");
            HttpResponse::InternalServerError().body(e.to_string())
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Mine the valid staged transactions plus a reward for this node.
#[post("/mine-transactions")]
pub async fn mine_transactions(state: web::Data<AppState>) -> impl Responder {
    let st = state.clone();
    match web::block(move || st.node.mine_transactions()).await {
        Ok(Ok(block)) => HttpResponse::Ok().json(block),
        Ok(Err(e)) => {
            warn!("POST /mine-transactions - {e}");
            HttpResponse::InternalServerError().body(e.to_string())
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Offer a competing chain. Accepted only if longer and valid.
#[post("/replace-chain")]
pub async fn replace_chain(
    state: web::Data<AppState>,
    req: web::Json<ReplaceChainRequest>,
) -> impl Responder {
    let ReplaceChainRequest {
        chain,
        validate_transactions,
    } = req.into_inner();
    debug!(
        "POST /replace-chain - received {} blocks (validate_transactions={})",
        chain.len(),
        validate_transactions
    );

    let st = state.clone();
    let result = web::block(move || st.node.replace_chain(chain, validate_transactions)).await;
    let length = state.node.chain().len();

    match result {
        Ok(Ok(())) => HttpResponse::Ok().json(ReplaceChainResponse {
            replaced: true,
            reason: None,
            length,
        }),
        Ok(Err(e)) => HttpResponse::Conflict().json(ReplaceChainResponse {
            replaced: false,
            reason: Some(e.to_string()),
            length,
        }),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}
