//! HTTP view of the litter log table.
//!
//! Each request runs the full fetch + enrich pipeline and answers once every
//! address has resolved. A disconnecting client drops its handler and with it
//! the in-flight lookups; shutdown cancels whatever is still running.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use clap::Parser;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use litterlog::view::LogTable;
use litterlog::{Cancelled, Config, EnrichedRecord, LitterLogPipeline};

#[derive(Parser, Debug)]
#[command(name = "litterlog-server")]
#[command(about = "Litter log HTTP view")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// TOML config file (otherwise read from the environment)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Application state shared across handlers
struct AppState {
    pipeline: LitterLogPipeline,
    shutdown: CancellationToken,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::from_env().context("Failed to read configuration from environment")?,
    };

    info!("Litterlog server");
    info!("Listing endpoint: {}", config.listing_url());

    let pipeline =
        LitterLogPipeline::from_config(&config).context("Failed to build HTTP clients")?;
    let shutdown = CancellationToken::new();

    let state = Arc::new(AppState {
        pipeline,
        shutdown: shutdown.clone(),
    });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/litter-logs", get(litter_logs_handler))
        .route("/v1/litter-logs/table", get(table_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct LitterLogsResponse {
    count: usize,
    records: Vec<EnrichedRecord>,
}

/// Enriched records, in backend order
async fn litter_logs_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LitterLogsResponse>, StatusCode> {
    let records = load(&state).await?;
    Ok(Json(LitterLogsResponse {
        count: records.len(),
        records,
    }))
}

/// Display rows, the shape the dashboard table renders
async fn table_handler(State(state): State<Arc<AppState>>) -> Result<Json<LogTable>, StatusCode> {
    let records = load(&state).await?;
    Ok(Json(LogTable::ready(&records)))
}

async fn load(state: &AppState) -> Result<Vec<EnrichedRecord>, StatusCode> {
    let cancel = state.shutdown.child_token();
    state.pipeline.load(&cancel).await.map_err(|Cancelled| {
        warn!("Request cancelled by shutdown");
        StatusCode::SERVICE_UNAVAILABLE
    })
}
