mod balance;
mod chain;
mod health;
pub mod models;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .service(chain::get_blocks)
            .service(chain::mine)
            .service(chain::mine_transactions)
            .service(chain::replace_chain)
            .service(tx::post_transact)
            .service(tx::get_transaction_pool_map)
            .service(balance::get_wallet_info)
            .service(balance::get_balance),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};
    use cryptochain::{Block, BlockData, Blockchain, Node, Transaction};
    use serde_json::{Value, json};

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(init_routes)).await
        };
    }

    #[actix_web::test]
    async fn health_is_up() {
        let state = web::Data::new(AppState::new(Node::default()));
        let app = app!(state);
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn blocks_start_with_genesis() {
        let state = web::Data::new(AppState::new(Node::default()));
        let app = app!(state);
        let req = test::TestRequest::get().uri("/api/blocks").to_request();
        let chain: Vec<Block> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(chain, vec![Block::genesis()]);
    }

    #[actix_web::test]
    async fn mine_appends_opaque_payload() {
        let state = web::Data::new(AppState::new(Node::default()));
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/api/mine")
            .set_json(json!({ "payload": "hello" }))
            .to_request();
        let block: Block = test::call_and_read_body_json(&app, req).await;
        assert_eq!(block.payload, BlockData::from("hello"));
        assert_eq!(state.node.chain().len(), 2);
    }

    #[actix_web::test]
    async fn transact_then_mine_transactions() {
        let state = web::Data::new(AppState::new(Node::default()));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/transact")
            .set_json(json!({ "recipient": "foo", "amount": 40 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["type"], "success");
        let tx: Transaction =
            serde_json::from_value(body["transaction"].clone()).expect("transaction");
        assert_eq!(tx.output_map["foo"], 40);

        let req = test::TestRequest::get()
            .uri("/api/transaction-pool-map")
            .to_request();
        let pool: Value = test::call_and_read_body_json(&app, req).await;
        assert!(pool.get(&tx.id).is_some());

        let req = test::TestRequest::post()
            .uri("/api/mine-transactions")
            .to_request();
        let block: Block = test::call_and_read_body_json(&app, req).await;
        assert_eq!(block.transactions().len(), 2);

        let req = test::TestRequest::get().uri("/api/balance/foo").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["balance"], 1040);
    }

    #[actix_web::test]
    async fn transact_overspend_is_bad_request() {
        let state = web::Data::new(AppState::new(Node::default()));
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/api/transact")
            .set_json(json!({ "recipient": "foo", "amount": 1_000_000 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["type"], "error");
    }

    #[actix_web::test]
    async fn replace_chain_accepts_longer_and_rejects_shorter() {
        let state = web::Data::new(AppState::new(Node::default()));
        let app = app!(state);

        let mut other = Blockchain::new();
        other.add_block("A".into());
        let req = test::TestRequest::post()
            .uri("/api/replace-chain")
            .set_json(json!({ "chain": other.chain(), "validateTransactions": false }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["replaced"], true);
        assert_eq!(state.node.chain(), other.chain());

        let req = test::TestRequest::post()
            .uri("/api/replace-chain")
            .set_json(json!({ "chain": Blockchain::new().chain() }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn wallet_info_reports_address() {
        let state = web::Data::new(AppState::new(Node::default()));
        let app = app!(state);
        let req = test::TestRequest::get().uri("/api/wallet-info").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["address"], state.node.address());
        assert_eq!(body["balance"], 1000);
    }
}
