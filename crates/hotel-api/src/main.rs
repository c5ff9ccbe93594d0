//! Hotel API Server
//!
//! REST API server for the hotel reservation backend.

use anyhow::Context;
use hotel_api::{create_router, state::AppState};
use hotel_core::config::AppConfig;
use hotel_core::{MemoryStore, PgStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration; a missing signing secret is fatal
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    init_tracing(&config);

    let state = match config.database.url.clone() {
        Some(url) => {
            let store = PgStore::connect(&url, config.database.pool_size)
                .await
                .context("failed to connect to database")?;
            store
                .ensure_schema()
                .await
                .context("failed to prepare database schema")?;
            tracing::info!(pool_size = config.database.pool_size, "Using PostgreSQL store");
            AppState::new(config, Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            AppState::new(config, Arc::new(MemoryStore::new()))
        }
    };

    if let Some(admin) = state
        .ensure_bootstrap_admin()
        .await
        .context("failed to ensure bootstrap admin")?
    {
        tracing::info!(user_id = %admin.id, email = %admin.email, "Bootstrap admin ready");
    }

    let addr = state.config.bind_address();
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Hotel API Server starting on http://{}", addr);
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "hotel_api={level},hotel_core={level},audit=info,tower_http=debug",
            level = config.logging.level
        )
        .into()
    });

    if config.logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
