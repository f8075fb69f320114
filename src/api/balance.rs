use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, BalanceResponse};

#[get("/balance/{address}")]
pub async fn get_balance(state: web::Data<AppState>, path: web::Path<(String,)>) -> impl Responder {
    let address = path.into_inner().0;
    let balance = state.node.balance_of(&address);
    HttpResponse::Ok().json(BalanceResponse { address, balance })
}

/// Address and balance of this node's wallet.
#[get("/wallet-info")]
pub async fn get_wallet_info(state: web::Data<AppState>) -> impl Responder {
    let (address, balance) = state.node.wallet_info();
    HttpResponse::Ok().json(BalanceResponse { address, balance })
}
