mod assessment;
mod config;
mod errors;
mod persistence;
mod routes;
mod sheets;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::bank::QuestionBank;
use crate::config::Config;
use crate::persistence::local::LocalStore;
use crate::persistence::remote::SheetsSink;
use crate::persistence::{RecentSaves, ResultSink, RECENT_SAVES_WINDOW};
use crate::routes::build_router;
use crate::sheets::SheetsClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting assessment API v{}", env!("CARGO_PKG_VERSION"));

    let bank = Arc::new(QuestionBank::builtin());
    info!(
        "Question bank loaded: {} general questions, {} roles, {} catalog courses",
        bank.general.len(),
        bank.roles.len(),
        bank.catalog.len()
    );

    let store = LocalStore::new(&config.results_store_path);
    info!("Local results store at {}", config.results_store_path);

    let sheets = SheetsClient::new(
        config.webapp_url.clone(),
        Duration::from_secs(config.webhook_timeout_secs),
    )?;
    if config.webapp_url.is_none() {
        warn!("WEBAPP_URL is not set; spreadsheet saves will fail and be logged");
    }

    let sinks: Vec<Arc<dyn ResultSink>> = vec![
        Arc::new(store.clone()),
        Arc::new(SheetsSink::new(sheets.clone())),
    ];

    let state = AppState {
        config: config.clone(),
        bank,
        store,
        sheets,
        sinks,
        recent_saves: RecentSaves::new(RECENT_SAVES_WINDOW),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
