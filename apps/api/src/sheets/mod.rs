/// Spreadsheet webhook client — the only code that talks to the external sheet.
///
/// The webhook is called with GET `?data=<json>&callback=<name>` and answers in
/// JSONP form: `name({...})`. The JSON is recovered by taking everything
/// between the first `(` and the last `)`.
///
/// No retries: one attempt per call.
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

pub mod handlers;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Server configuration error: WEBAPP_URL not defined")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payload encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Spreadsheet webhook error: {status} {reason}")]
    Upstream { status: u16, reason: String },

    #[error("Could not parse spreadsheet webhook response")]
    UpstreamParse { raw: String },
}

#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    webapp_url: Option<String>,
}

impl SheetsClient {
    pub fn new(webapp_url: Option<String>, timeout: Duration) -> Result<Self, WebhookError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            webapp_url,
        })
    }

    /// Sends `payload` to the webhook and returns the JSON inside its JSONP reply.
    pub async fn forward<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Value, WebhookError> {
        let url = self
            .webapp_url
            .as_deref()
            .ok_or(WebhookError::NotConfigured)?;

        let data = serde_json::to_string(payload)?;
        let callback = callback_name();
        debug!("Calling spreadsheet webhook with callback {callback}");

        let response = self
            .client
            .get(url)
            .query(&[("data", data.as_str()), ("callback", callback.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Spreadsheet webhook returned {status}: {body}");
            return Err(WebhookError::Upstream {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.text().await?;
        debug!("Spreadsheet webhook replied: {body}");
        parse_jsonp(&body)
    }
}

/// Unique-enough JSONP callback name for one request.
fn callback_name() -> String {
    format!("sheetsCallback_{}", Uuid::new_v4().as_u128() % 1_000_000)
}

/// Extracts the JSON between the first `(` and the last `)` of a JSONP body.
///
/// Missing parentheses fall back to the start/end of the text, so a bare JSON
/// body without a wrapper is rejected rather than guessed at.
pub fn parse_jsonp(body: &str) -> Result<Value, WebhookError> {
    let start = body.find('(').map(|i| i + 1).unwrap_or(0);
    let end = body.rfind(')').unwrap_or(0);
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };

    serde_json::from_str(&body[lo..hi]).map_err(|_| WebhookError::UpstreamParse {
        raw: body.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use axum::{extract::Query, http::StatusCode, routing::get, Router};

    /// How the fake webhook answers.
    #[derive(Clone)]
    pub enum FakeReply {
        /// `callback({"success":true,"received":<data>})`
        Echo,
        /// Fixed body with status 200.
        Raw(&'static str),
        /// Empty body with the given status.
        Status(StatusCode),
    }

    /// Starts a local webhook on an ephemeral port and returns its URL.
    pub async fn spawn_webhook(reply: FakeReply) -> String {
        let app = Router::new().route(
            "/exec",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let reply = reply.clone();
                async move {
                    match reply {
                        FakeReply::Echo => {
                            let callback = params.get("callback").cloned().unwrap_or_default();
                            let data = params.get("data").cloned().unwrap_or_default();
                            (
                                StatusCode::OK,
                                format!("{callback}({{\"success\":true,\"received\":{data}}})"),
                            )
                        }
                        FakeReply::Raw(body) => (StatusCode::OK, body.to_string()),
                        FakeReply::Status(status) => (status, String::new()),
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/exec")
    }
}
