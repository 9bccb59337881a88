use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ledger_rs::{config::Config, db, metrics::Metrics, router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Starting ledger service...");

    let config = Config::from_env()?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        tx_timeout_ms = config.tx_timeout_ms,
        "Configuration loaded"
    );

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("./db/migrations").run(&pool).await?;

    let state = Arc::new(AppState {
        pool,
        tx_timeout: config.tx_timeout(),
        metrics: Metrics::new()?,
    });
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Ledger service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
