pub mod handlers;
pub mod types;

use crate::{
    Error, Result,
    config::{Config, ServerConfig},
    relay::Relay,
    upstream::OllamaClient,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue,
        header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE},
    },
    routing::{any, get},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{info, warn};

pub fn router(state: handlers::AppState, config: &ServerConfig) -> Result<Router> {
    let origin = HeaderValue::from_str(&config.allowed_origin).map_err(|e| {
        Error::config(format!(
            "Invalid allowed_origin '{}': {}",
            config.allowed_origin, e
        ))
    })?;

    let app = Router::new()
        .route("/", any(handlers::relay))
        .route("/health", get(handlers::health).options(handlers::preflight))
        .fallback(handlers::fallback)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            origin,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

pub async fn run(config: Config) -> Result<()> {
    let config = Arc::new(config);

    let client = OllamaClient::new(&config.upstream)?;
    info!("Upstream endpoint: {}", client.url());

    let relay = Relay::new(Arc::new(client), &config.upstream);
    let app_state = handlers::AppState {
        relay: Arc::new(relay),
    };

    let app = router(app_state, &config.server)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!(
        "Starting server on {} (allowed origin: {})",
        addr, config.server.allowed_origin
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
