mod api;

use actix_web::{App, HttpServer, web};
use cryptochain::{Config, Node, Wallet, node::seed_demo};
use log::{info, warn};

use api::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env();
    env_logger::init();

    let wallet = match config.node_secret_key.as_deref().map(Wallet::from_secret_hex) {
        Some(Ok(wallet)) => wallet,
        Some(Err(e)) => {
            warn!("NODE_SECRET_KEY ignored: {e}");
            Wallet::new()
        }
        None => Wallet::new(),
    };
    info!("node wallet address {}", wallet.public_key());

    let state = web::Data::new(AppState::new(Node::new(wallet)));

    if config.seed_demo {
        let st = state.clone();
        let rounds = config.seed_rounds;
        match web::block(move || seed_demo(&st.node, rounds)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("demo seeding stopped: {e}"),
            Err(e) => warn!("demo seeding failed: {e}"),
        }
    }

    println!(
        "⛓️ Starting cryptochain node at http://{}:{}",
        config.host, config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
