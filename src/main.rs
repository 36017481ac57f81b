#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vendor_portal::{
    api::{self, AppState},
    auth::AuthKeys,
    config::{self, database},
    core::seed,
    errors::{Error, Result},
};

/// Environment variable holding the bootstrap admin's password
const SEED_ADMIN_PASSWORD_VAR: &str = "SEED_ADMIN_PASSWORD";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;

    // 4. Connect and create the schema
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed configured content
    let admin_password = env::var(SEED_ADMIN_PASSWORD_VAR).ok();
    if admin_password.is_none() && app_config.seed.admin_email.is_some() {
        warn!("{} is not set; the admin account will not be seeded", SEED_ADMIN_PASSWORD_VAR);
    }
    seed::seed_database(&db, &app_config.seed, admin_password)
        .await
        .inspect(|report| info!(?report, "Seeding finished."))
        .inspect_err(|e| error!("Failed to seed database: {}", e))?;

    // 6. Serve the API
    // JWT_SECRET is loaded here, directly before use, not stored in AppConfig
    let auth = AuthKeys::from_env(app_config.auth.token_ttl_hours)
        .inspect_err(|e| error!("JWT_SECRET not usable: {}", e))?;
    let bind_address = app_config.server.bind_address.clone();
    let state = AppState {
        db,
        auth: Arc::new(auth),
        config: Arc::new(app_config),
    };

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind_address, e))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::Io)?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received.");
}
