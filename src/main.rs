#![forbid(unsafe_code)]

//! `bug-desk`: issue tracker web service binary.
//!
//! Bootstraps configuration, opens the `SQLite` database, seeds sample
//! data into an empty store, and serves the HTTP API and views.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use bug_desk::chat::llm::{LanguageModel, OpenAiClient};
use bug_desk::config::GlobalConfig;
use bug_desk::http::{self, AppState};
use bug_desk::persistence::{db, seed};
use bug_desk::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "bug-desk", about = "Issue tracker with a chat assistant", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the HTTP port from the configuration file.
    #[arg(long)]
    port: Option<u16>,

    /// Skip seeding sample data into an empty database.
    #[arg(long)]
    no_seed: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("bug-desk server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match args.config {
        Some(ref path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    config.apply_env_overrides();
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if args.no_seed {
        config.seed_sample_data = false;
    }
    config.load_credentials().await?;

    let config = Arc::new(config);
    info!("configuration loaded");

    // ── Initialize database ─────────────────────────────
    let db = Arc::new(db::connect(&config.db_path).await?);
    info!(path = %config.db_path.display(), "database connected");

    if config.seed_sample_data && seed::seed_if_empty(Arc::clone(&db)).await {
        info!("sample data seeded into empty database");
    }

    // ── Build shared application state ──────────────────
    let llm: Option<Arc<dyn LanguageModel>> = match OpenAiClient::from_config(&config.llm)? {
        Some(client) => {
            info!(model = %config.llm.model, "language model enabled");
            let client: Arc<dyn LanguageModel> = Arc::new(client);
            Some(client)
        }
        None => None,
    };
    let state = Arc::new(AppState::new(Arc::clone(&config), db, llm)?);

    // ── Start HTTP server ───────────────────────────────
    // Bind here so a taken port fails startup instead of a detached task.
    let listener = http::bind(&config).await?;
    let ct = CancellationToken::new();
    let mut http_handle = tokio::spawn(http::serve_on(listener, state, ct.clone()));

    // ── Wait for shutdown signal or server exit ─────────
    tokio::select! {
        () = shutdown_signal() => {
            info!("shutdown signal received");
            ct.cancel();
        }
        result = &mut http_handle => {
            flatten_join(result)?;
            return Err(AppError::Io("HTTP server stopped unexpectedly".into()));
        }
    }
    flatten_join(http_handle.await)?;

    info!("bug-desk shut down");

    Ok(())
}

fn flatten_join(result: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    match result {
        Ok(served) => {
            if let Err(ref err) = served {
                error!(%err, "http server failed");
            }
            served
        }
        Err(err) => Err(AppError::Io(format!("http server task panicked: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
