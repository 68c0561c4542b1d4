//! Database pool, migrations and the readiness probe query

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Pool tuning derived from [`DatabaseConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl PoolSettings {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        let max_connections = config.max_connections.max(1);
        Self {
            max_connections,
            min_connections: max_connections.min(2),
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// Connect to PostgreSQL
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let settings = PoolSettings::from_config(config);
    let connect_options = PgConnectOptions::from_str(&config.url)
        .context("invalid database url")?
        .application_name("peso");

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .max_lifetime(settings.max_lifetime)
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
        .context("failed to connect to database")?;

    info!(
        max = settings.max_connections,
        min = settings.min_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Apply the schema in `backend/migrations`
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            e.into()
        })
}
