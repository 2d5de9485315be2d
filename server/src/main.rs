use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use homeboy_admin_api::{build_router, AppState};
use homeboy_config::load as load_config;
use homeboy_platform::{RestDocumentStore, RestIdentityProvider, RestPushGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("starting Homeboy dashboard backend");

    let config = load_config().context("failed to load configuration")?;

    let store = Arc::new(
        RestDocumentStore::new(&config.platform)
            .context("failed to build document store client")?,
    );
    let identity = Arc::new(
        RestIdentityProvider::new(&config.platform)
            .context("failed to build identity client")?,
    );
    let push = Arc::new(
        RestPushGateway::new(&config.platform).context("failed to build push gateway client")?,
    );

    info!(
        project_id = %config.platform.project_id,
        admin = %config.auth.allowed_admin_email,
        "platform clients ready"
    );

    let state = AppState::new(store, identity, push, &config);
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
