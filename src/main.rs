//! Cloud Status API Binary

use actix_web::{App, HttpServer, web};
use clap::Parser;
use cloud_status_api::{AppState, Config, Refresher, StatusCache, controllers};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::parse();

    initialize_tracing(config.log_json);

    info!("Starting Cloud Status API v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    let cache = Arc::new(StatusCache::new());
    let refresher = match Refresher::from_config(&config, Arc::clone(&cache)) {
        Ok(refresher) => Arc::new(refresher),
        Err(e) => {
            error!("Failed to build provider fetchers: {}", e);
            std::process::exit(1);
        }
    };

    tokio::spawn(Arc::clone(&refresher).run_schedule(config.refresh_interval()));

    let state = web::Data::new(AppState::new(cache, refresher));
    let cors_origin = config.cors_origin.clone();

    info!("Server is live at http://{}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(controllers::cors(cors_origin.as_deref()))
            .configure(controllers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

/// Initialize structured logging
fn initialize_tracing(json: bool) {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .json()
    });
    let plain_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(json_layer)
        .with(plain_layer)
        .init();
}
