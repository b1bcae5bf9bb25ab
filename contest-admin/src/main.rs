//! contest-admin - bulk CSV ingestion service
//!
//! `serve` runs the HTTP API. `create-session` and `grant-admin` are
//! operator commands against the same database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contest_common::config::{ConfigOverrides, ServiceConfig};
use contest_common::db::init_database;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contest_admin::db::{admins, sessions};
use contest_admin::{build_router, AppState};

/// Command-line arguments for contest-admin
#[derive(Parser, Debug)]
#[command(name = "contest-admin")]
#[command(about = "Bulk CSV ingestion service for contest teams and results")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, env = "CONTEST_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind
    #[arg(long, global = true, env = "CONTEST_BIND_ADDRESS")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true, env = "CONTEST_PORT")]
    port: Option<u16>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, env = "CONTEST_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve,

    /// Create a contest session and print its id
    CreateSession {
        #[arg(long)]
        name: String,
        #[arg(long)]
        year: String,
        /// Mark the session active
        #[arg(long)]
        active: bool,
    },

    /// Register an administrator and print a new bearer token
    GrantAdmin {
        #[arg(long)]
        email: String,
        /// Token lifetime; tokens do not expire when omitted
        #[arg(long)]
        ttl_days: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ServiceConfig::load(ConfigOverrides {
        config_file: args.config,
        database_path: args.database,
        bind_address: args.bind,
        port: args.port,
        log_level: args.log_level,
    })
    .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting contest-admin v{}", env!("CARGO_PKG_VERSION"));
    match &config.config_source {
        Some(path) => info!("Config file: {}", path.display()),
        None => warn!("No config file found, using defaults"),
    }
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database")?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(pool, &config).await,
        Command::CreateSession { name, year, active } => {
            let id = sessions::create_session(&pool, &name, &year, active).await?;
            println!("{}", id);
            Ok(())
        }
        Command::GrantAdmin { email, ttl_days } => {
            admins::grant_admin(&pool, &email).await?;
            let token = admins::issue_token(&pool, &email, ttl_days.map(chrono::Duration::days)).await?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(pool: sqlx::SqlitePool, config: &ServiceConfig) -> Result<()> {
    let state = AppState::new(pool, config.max_upload_bytes);
    let app = build_router(state);

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("contest-admin listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
