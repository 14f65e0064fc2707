//! AgroCRM server binary.

use tracing::info;
use tracing_subscriber::EnvFilter;

use agrocrm_db::DbManager;
use agrocrm_server::{AppState, ServerConfig, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "agrocrm=info".into()),
        )
        .json()
        .init();

    let config = ServerConfig::from_env();
    if config.auth.secret_key.is_empty() {
        anyhow::bail!("AGROCRM_SECRET_KEY must be set");
    }

    let manager = DbManager::connect(&config.db).await?;
    agrocrm_db::run_migrations(manager.client()).await?;

    let state = AppState::new(manager.client().clone(), config.auth.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!(listen = %config.listen, "AgroCRM server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
