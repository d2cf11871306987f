mod config;
mod docx;
mod errors;
mod extract;
mod fields;
mod oracle;
mod photo;
mod pipeline;
mod routes;
mod state;
mod trial;

#[cfg(test)]
mod test_support;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::AtomicU32;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::oracle::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Resume Standardizer API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize the oracle client
    let oracle = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    info!("Oracle client initialized (model: {})", oracle::MODEL);

    // Output root must exist before the first batch writes into it
    std::fs::create_dir_all(&config.output_root)?;
    if !config.templates_dir.is_dir() {
        // Not fatal: each affected file reports a missing template instead.
        warn!(
            "templates directory {} does not exist",
            config.templates_dir.display()
        );
    }

    // Build app state
    let state = AppState {
        oracle,
        config: config.clone(),
        trial_uses: Arc::new(AtomicU32::new(0)),
        batches: Arc::new(Mutex::new(HashMap::new())),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
