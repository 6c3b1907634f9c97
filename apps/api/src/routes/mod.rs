pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers;
use crate::sheets::handlers as sheets_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Question bank
        .route("/api/v1/roles", get(handlers::handle_list_roles))
        .route(
            "/api/v1/questions/general",
            get(handlers::handle_general_questions),
        )
        .route(
            "/api/v1/questions/:role",
            get(handlers::handle_role_questions),
        )
        .route("/api/v1/courses/:course", get(handlers::handle_get_course))
        // Scoring and session flow
        .route("/api/v1/assessment/score", post(handlers::handle_score))
        .route("/api/v1/session", post(handlers::handle_session))
        .route("/api/v1/results", get(handlers::handle_list_results))
        // Spreadsheet proxy
        .route(
            "/api/save-results",
            post(sheets_handlers::handle_save_results)
                .fallback(sheets_handlers::handle_method_not_allowed),
        )
        .with_state(state)
}
