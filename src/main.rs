use std::sync::Arc;

use askdb::infrastructure::bootstrap::bootstrap;
use askdb::infrastructure::config::ServiceConfig;
use askdb::interfaces::http::start_http_server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let state = match bootstrap(&config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting askdb on {}:{}",
        config.server.host, config.server.port
    );

    start_http_server(state, &config.server.host, config.server.port)?.await
}
