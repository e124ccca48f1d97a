use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rx_audit_postgres::repository::db_init::{cleanup_database, init_database};
use rx_audit_postgres::{DatabaseConfig, PostgresRepositories};

/// Applies or tears down the prescription audit schema.
///
/// # Usage
/// `rx-audit-migrate [up|down]`, defaulting to `up`.
///
/// # Environment Variables
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `RX_AUDIT_DB_MAX_CONNECTIONS`: pool size (default: 5)
/// - `RX_AUDIT_DB_ACQUIRE_TIMEOUT_SECS`: connection acquire timeout (default: 30)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("rx_audit=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let direction = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());

    let config = DatabaseConfig::from_env().context("Invalid database configuration")?;
    let repositories = PostgresRepositories::connect(&config)
        .await
        .context("Failed to connect to the database")?;

    let result = match direction.as_str() {
        "up" => init_database(repositories.pool()).await,
        "down" => cleanup_database(repositories.pool()).await,
        other => {
            repositories.close().await;
            bail!("Unknown direction '{other}', expected 'up' or 'down'");
        }
    };
    repositories.close().await;
    result.with_context(|| format!("Schema '{direction}' failed"))?;

    tracing::info!(%direction, "Schema scripts applied");
    Ok(())
}
