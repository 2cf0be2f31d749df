use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use fixly::{config::Config, state::AppState, store::PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fixly=debug,tower_http=info")),
        )
        .with_max_level(Level::TRACE)
        .init();

    // ─── Config ───────────────────────────────────────────────────────────────
    let config = Config::from_env()?;
    let addr = config.server_addr();

    if config.razorpay.is_none() {
        info!("Razorpay keys not set, gateway payments are disabled");
    }
    if config.smtp.is_none() {
        info!("SMTP not configured, outgoing email is disabled");
    }

    // ─── Database ─────────────────────────────────────────────────────────────
    let db = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Failed to run database migrations")?;

    info!("Database connected and migrations applied ✓");

    // ─── App State ────────────────────────────────────────────────────────────
    let store = PgStore::new(db);
    store.spawn_health_monitor(Duration::from_secs(5));
    let state = AppState::new(Arc::new(store), config);
    let app = fixly::app(state);

    // ─── Start Server ─────────────────────────────────────────────────────────
    info!("🚀 Fixly API listening on http://{}", addr);
    info!("📖 Swagger UI:  http://{}/docs", addr);
    info!("❤️  Health:      http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
