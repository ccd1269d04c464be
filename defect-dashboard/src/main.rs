//! Defect dashboard server entry point.

use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use defect_dashboard::{create_router, load_dataset, load_model, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    let json = config.log_json;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "defect_dashboard=debug,defect_core=info,tower_http=debug".into()))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Defect dashboard v{} starting ({})...", env!("CARGO_PKG_VERSION"), config.environment);
    tracing::info!("Model card: {}", config.artifacts.model_path.display());

    // Artifacts are loaded exactly once; a failure keeps the server up
    let model = load_model(&config);
    let dataset = load_dataset(&config);

    let host: IpAddr = config.host.parse()
        .with_context(|| format!("invalid HOST '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);

    let app = create_router(AppState::new(model, dataset, config));

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
