//! Product service - REST API over PostgreSQL

use axum_helpers::server::{create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{close, connect_from_config_with_retry, run_migrations};
use migration::Migrator;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment, &config.tracing);

    info!(
        service = %config.app.name,
        version = config.app.version,
        environment = ?config.environment,
        "Starting product service"
    );

    let db = connect_from_config_with_retry(config.database.clone(), None).await?;
    info!("Successfully connected to PostgreSQL");

    if config.run_migrations {
        run_migrations::<Migrator>(&db, &config.app.name).await?;
    }

    let state = AppState { config, db };

    let health = api::health_routes(&state);
    let router = create_router::<openapi::ApiDoc>(api::routes(&state), health)?;

    info!(
        "Starting {} on port {}",
        state.config.app.name, state.config.server.port
    );

    create_production_app(
        router,
        &state.config.server,
        SHUTDOWN_TIMEOUT,
        close(state.db.clone()),
    )
    .await?;

    info!("Product service shutdown complete");
    Ok(())
}
