//! mgc-api - Music genre classifier HTTP service
//!
//! **Module Identity:**
//! - Name: mgc-api
//! - Default port: 5000
//!
//! Endpoints: `GET /health`, `POST /analyze`, `POST /submit-rating`,
//! `GET /rating-stats`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use mgc_api::analyzer::ProcessAnalyzer;
use mgc_api::config::{ConfigOverrides, ServerConfig};
use mgc_api::store::{InMemoryRatingStore, JsonFileRatingStore, RatingStore};
use mgc_api::AppState;
use mgc_common::logging::{directives_for, init_tracing};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mgc-api", version, about = "Music genre classifier API")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "MGC_API_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "MGC_API_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "MGC_API_HOST")]
    host: Option<String>,

    /// Ratings JSON file
    #[arg(long, env = "MGC_RATINGS_FILE")]
    ratings_file: Option<PathBuf>,

    /// Keep ratings in memory only (nothing written to disk)
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.apply_overrides(ConfigOverrides {
        host: args.host,
        port: args.port,
        ratings_file: args.ratings_file,
    });

    init_tracing(&directives_for(
        &config.logging.level,
        &["mgc_api", "mgc_common", "tower_http"],
    ));

    info!("Starting mgc-api (Music Genre Classifier API)");
    info!(
        "mgc-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let store: Arc<dyn RatingStore> = if args.ephemeral {
        info!("Ratings store: in-memory (ephemeral)");
        Arc::new(InMemoryRatingStore::new())
    } else {
        info!("Ratings store: {}", config.server.ratings_file.display());
        Arc::new(JsonFileRatingStore::new(&config.server.ratings_file))
    };

    info!(
        program = %config.analyzer.program,
        args = ?config.analyzer.args,
        timeout_secs = config.analyzer.timeout_secs,
        max_concurrent = config.analyzer.max_concurrent,
        "Analyzer configured"
    );
    let analyzer = Arc::new(ProcessAnalyzer::new(&config.analyzer));

    let state = AppState::new(analyzer, store).configured(&config);
    let app = mgc_api::build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("mgc-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
