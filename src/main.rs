use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;

use pow_ledger::{Node, NodeConfig, api};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env().map_err(std::io::Error::other)?;
    let (host, port) = (config.host.clone(), config.port);

    log::info!(
        "node {} starting (difficulty={}, peers={})",
        config.node_id,
        config.difficulty,
        config.peers.len()
    );
    println!("⛓️ Starting ledger node at http://{host}:{port}");

    let state = web::Data::new(Node::new(config).map_err(std::io::Error::other)?);
    let shutdown = state.shutdown_token().clone();

    let result = HttpServer::new({
        let state = state.clone();
        move || {
            App::new()
                .app_data(state.clone())
                .configure(api::init_routes)
        }
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    shutdown.cancel();
    result
}
