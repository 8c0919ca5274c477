//! Payroll Tracking API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin payroll-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... API_GROQ_API_KEY=gsk_... cargo run --bin payroll-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DB_MIN_CONNECTIONS` / `API_DB_MAX_CONNECTIONS` - Pool size (default: 2 / 10)
//! * `API_DB_ACQUIRE_TIMEOUT_SECS` - Wait for a free connection (default: 30)
//! * `API_DB_IDLE_TIMEOUT_SECS` - Close idle connections after this many seconds, 0 to disable (default: 600)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_CLAIM_NUMBER_PREFIX` / `API_DISPUTE_NUMBER_PREFIX` - Business number prefixes
//! * `API_STRICT_DECISION_LOG` - Refuse to repair a missing specialist approval (default: false)
//! * `API_GROQ_API_KEY` - Enables the chatbot when set
//! * `API_GROQ_BASE_URL`, `API_GROQ_MODEL`, `API_LLM_TIMEOUT_SECS` - LLM provider settings

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_assistant::{GroqClient, LlmClient};
use infra_db::{create_pool, run_migrations};
use interface_api::{config::ApiConfig, create_router, AppState, Ports};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Payroll Tracking API Server"
    );

    let pool = create_pool(config.database_config())
        .await
        .context("connecting to the database")?;
    run_migrations(&pool).await.context("running database migrations")?;

    let llm = build_llm(&config)?;
    let state = AppState::new(config.clone(), Ports::postgres(pool), llm);
    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration, falling back to defaults when the environment is unusable
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid API_* configuration ({}), using defaults", e);
        ApiConfig::default()
    })
}

/// The chatbot runs without a provider when no key is configured
fn build_llm(config: &ApiConfig) -> anyhow::Result<Option<Arc<dyn LlmClient>>> {
    match config.groq_config() {
        Some(groq) => {
            let client = GroqClient::new(groq).context("building the Groq client")?;
            tracing::info!(model = %client.model(), "Chatbot enabled");
            let client: Arc<dyn LlmClient> = Arc::new(client);
            Ok(Some(client))
        }
        None => {
            tracing::warn!("API_GROQ_API_KEY not set; chatbot disabled");
            Ok(None)
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
