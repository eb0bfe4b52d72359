//! # Throttle API Server
//!
//! Actix-web server that puts the load shedder and the per-client rate
//! limiter in front of a trivial handler.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use throttle_infra::{BucketSweeper, OverloadDetector, TokenBucketLimiter};
use tokio_util::sync::CancellationToken;
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::io::Error::other(e)
    })?;

    tracing::info!(
        max_tokens = config.rate_limit.max_tokens(),
        refill_interval_ms = config.rate_limit.refill_interval().as_millis() as u64,
        check_interval_ms = config.load_shed.check_interval().as_millis() as u64,
        overload_factor_ms = config.load_shed.overload_factor().as_millis() as u64,
        "Starting Throttle API Server on {}:{}",
        config.host,
        config.port
    );

    let shutdown = CancellationToken::new();
    let limiter = Arc::new(TokenBucketLimiter::new(config.rate_limit.clone()));
    let sweeper = BucketSweeper::new(limiter.clone()).start(shutdown.clone());

    let rate_limit = config.rate_limit.clone();
    let load_shed = config.load_shed;
    let worker_shutdown = shutdown.clone();

    let result = HttpServer::new(move || {
        // Each worker samples its own runtime, so the detector is starved by
        // exactly the requests it is meant to protect.
        let detector = Arc::new(OverloadDetector::start(load_shed, &worker_shutdown));
        let state = AppState::new(limiter.clone(), detector, rate_limit.clone());

        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| handlers::configure_routes(cfg, &state))
            .default_service(web::to(handlers::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Bucket sweeper ended abnormally");
    }
    tracing::info!("Server stopped");

    result
}
