use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Spreadsheet webhook URL. When unset the save-results proxy answers with
    /// a configuration error instead of failing at startup.
    pub webapp_url: Option<String>,
    pub results_store_path: String,
    pub webhook_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            webapp_url: optional_env("WEBAPP_URL"),
            results_store_path: optional_env("RESULTS_STORE_PATH")
                .unwrap_or_else(|| "data/assessment_results.json".to_string()),
            webhook_timeout_secs: std::env::var("WEBHOOK_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("WEBHOOK_TIMEOUT_SECS must be a whole number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Unset and blank values are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
