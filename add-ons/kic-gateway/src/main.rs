//! kic-gateway: HTTP action server for the KI-Campus course recommender dialogue.

mod webhook;

use kic_core::{ActionRegistry, KicConfig, RecommenderBackend, RecommenderClient, ResponseTable};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webhook::GatewayState;

type StartupError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[kic-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(target: "kic::gateway", "Startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = KicConfig::load()?;

    let responses = match &config.responses_path {
        Some(path) => ResponseTable::load_from_path(Path::new(path))?,
        None => ResponseTable::bundled()?,
    };

    let backend: Arc<dyn RecommenderBackend> =
        Arc::new(RecommenderClient::new(&config.recommender_api));
    let mut registry = ActionRegistry::new();
    kic_actions::register_actions(
        &mut registry,
        backend,
        &responses,
        config.recommender_api.enrollment_policy,
    )?;

    let app = webhook::router(GatewayState {
        registry: Arc::new(registry),
    });

    let addr = config.gateway.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(target: "kic::gateway", "Action server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!(target: "kic::gateway", "Shutdown requested (Ctrl+C)"),
                Err(e) => {
                    tracing::warn!(target: "kic::gateway", "Ctrl+C handler unavailable: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;
    Ok(())
}
