mod chain;
pub mod error;
mod health;
pub mod models;
mod nodes;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use error::ApiError;
pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(json_config())
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(chain::mine_block)
            .service(tx::post_transaction)
            .service(nodes::register_nodes)
            .service(nodes::list_nodes)
            .service(nodes::resolve_conflicts),
    );
}

/// Route body parse failures through [`ApiError`] like every other rejection.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::InvalidBody(err.to_string()).into())
}
