// Main entry point for the provisioning API server

use std::sync::Arc;

use anyhow::{Context, Result};
use gotrue::{GoTrueOptions, GoTrueService};
use ministry_core::{
    kernel::{GoTrueAdapter, PostgresProfileStore, ServerDeps},
    server::build_app,
    Config,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ministry_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ministry provisioning API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        failure_policy = ?config.failure_policy(),
        admin_bootstrap_enabled = config.admin_bootstrap_enabled,
        "Configuration loaded"
    );

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let gotrue = GoTrueService::new(GoTrueOptions {
        url: config.auth_url.clone(),
        service_role_key: config.auth_service_role_key.clone(),
    });

    let deps = ServerDeps::new(
        Arc::new(GoTrueAdapter::new(Arc::new(gotrue))),
        Arc::new(PostgresProfileStore::new(pool)),
        config.failure_policy(),
        config.admin_bootstrap(),
    );
    let app = build_app(deps);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
