use std::sync::Arc;

use crate::assessment::bank::QuestionBank;
use crate::config::Config;
use crate::persistence::local::LocalStore;
use crate::persistence::{RecentSaves, ResultSink};
use crate::sheets::SheetsClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub bank: Arc<QuestionBank>,
    /// Local copy of completed assessments, read back by the results listing.
    pub store: LocalStore,
    pub sheets: SheetsClient,
    /// Sinks run in order after every completed assessment: local, then sheets.
    pub sinks: Vec<Arc<dyn ResultSink>>,
    pub recent_saves: RecentSaves,
}

#[cfg(test)]
pub fn test_state(webapp_url: Option<String>) -> (AppState, tempfile::TempDir) {
    use std::time::Duration;

    use crate::persistence::remote::SheetsSink;

    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        webapp_url: webapp_url.clone(),
        results_store_path: dir.path().join("results.json").display().to_string(),
        webhook_timeout_secs: 5,
        port: 0,
        rust_log: "debug".to_string(),
    };
    let store = LocalStore::new(&config.results_store_path);
    let sheets = SheetsClient::new(webapp_url, Duration::from_secs(5)).unwrap();
    let sinks: Vec<Arc<dyn ResultSink>> = vec![
        Arc::new(store.clone()),
        Arc::new(SheetsSink::new(sheets.clone())),
    ];

    let state = AppState {
        config,
        bank: Arc::new(QuestionBank::builtin()),
        store,
        sheets,
        sinks,
        recent_saves: RecentSaves::new(16),
    };
    (state, dir)
}
