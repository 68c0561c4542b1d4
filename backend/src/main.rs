//! Peso Backend
//!
//! Personal weight and goal tracking.
//!
//! ## Architecture
//!
//! - Routes: thin JSON handlers
//! - Services: WeightTracker, GoalTracker, AuthService
//! - Repositories: PostgreSQL via SQLx behind capability traits

use anyhow::Result;
use peso_backend::{config, db, routes, state::AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = config::AppConfig::load()?;

    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Peso backend"
    );

    if config::AppConfig::is_production() {
        config.validate_for_production()?;
    }

    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    let state = AppState::new(db_pool, config.clone());

    if config.auth.cleanup_sessions_on_startup {
        if let Err(e) = state.auth.cleanup_expired_sessions().await {
            warn!(error = %e, "Failed to clean up expired sessions");
        }
    }

    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over the configured level. JSON output in production or
/// when `logging.json` is set, pretty output otherwise.
fn init_tracing(logging: &config::LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "peso_backend={level},tower_http={level},sqlx=warn",
            level = logging.level
        )
        .into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if logging.json || config::AppConfig::is_production() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
