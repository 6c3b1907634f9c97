//! `POST /api/save-results` — forwards a flattened result row to the spreadsheet
//! webhook. Every outcome is answered with the `{success, message}` envelope.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::sheets::WebhookError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProxyFailure {
    pub success: bool,
    pub message: String,
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ProxyFailure {
            success: false,
            message: message.into(),
        }),
    )
        .into_response()
}

/// POST /api/save-results
pub async fn handle_save_results(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return failure(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", rejection.body_text()),
            )
        }
    };

    match state.sheets.forward(&payload).await {
        Ok(upstream) => {
            info!("Spreadsheet webhook accepted result row");
            (StatusCode::OK, Json(upstream)).into_response()
        }
        Err(WebhookError::UpstreamParse { raw }) => {
            error!("Error parsing spreadsheet webhook response: {raw}");
            failure(
                StatusCode::OK,
                "Error parsing response from spreadsheet webhook",
            )
        }
        Err(e @ (WebhookError::NotConfigured | WebhookError::Upstream { .. })) => {
            error!("{e}");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            error!("Error in save-results proxy: {e}");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Server error: {e}"),
            )
        }
    }
}

/// Any non-POST method on the proxy path.
pub async fn handle_method_not_allowed() -> Response {
    failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
