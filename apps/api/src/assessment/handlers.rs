//! Axum route handlers for the assessment API.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assessment::bank::QuestionBank;
use crate::assessment::models::{
    AnswerSet, AssessmentResult, BiodataUpdate, CourseDetails, Question,
};
use crate::assessment::scoring::calculate_results;
use crate::assessment::session::{BatchProgress, Session};
use crate::errors::AppError;
use crate::persistence::{dispatch_save, PersistenceError, SavedAssessment};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub role: Option<String>,
    #[serde(default)]
    pub answers: AnswerSet,
}

/// A user action applied to a session snapshot.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionAction {
    Start,
    Reset,
    UpdateBiodata { biodata: BiodataUpdate },
    SelectRole { role: String },
    SwitchRole { role: String },
    ChangeCategory,
    RecordAnswers { answers: BTreeMap<String, bool> },
    SubmitBatch { answers: BTreeMap<String, bool> },
    Next,
    Back,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    /// Omitted on the first call; a fresh session is used.
    #[serde(default)]
    pub session: Option<Session>,
    pub action: SessionAction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session: Session,
    pub current_batch: Vec<Question>,
    pub progress: BatchProgress,
    pub role_name: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/roles
pub async fn handle_list_roles(State(state): State<AppState>) -> Json<Vec<RoleSummary>> {
    Json(
        state
            .bank
            .roles
            .iter()
            .map(|r| RoleSummary {
                id: r.id.clone(),
                name: r.name.clone(),
                question_count: r.questions.len(),
            })
            .collect(),
    )
}

/// GET /api/v1/questions/general
pub async fn handle_general_questions(State(state): State<AppState>) -> Json<Vec<Question>> {
    Json(state.bank.general.clone())
}

/// GET /api/v1/questions/:role
pub async fn handle_role_questions(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Result<Json<Vec<Question>>, AppError> {
    let track = state
        .bank
        .role(&role)
        .ok_or_else(|| AppError::InvalidRole(format!("Unknown role '{role}'")))?;
    Ok(Json(track.questions.clone()))
}

/// GET /api/v1/courses/:course
pub async fn handle_get_course(
    State(state): State<AppState>,
    Path(course): Path<String>,
) -> Result<Json<CourseDetails>, AppError> {
    state
        .bank
        .course(&course)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Course '{course}' not in catalog")))
}

/// POST /api/v1/assessment/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<AssessmentResult>, AppError> {
    let result = calculate_results(&req.answers, req.role.as_deref(), &state.bank)?;
    Ok(Json(result))
}

/// POST /api/v1/session
///
/// Applies one action to the caller's session snapshot and returns the next
/// snapshot. When the action completes the assessment, the result is handed to
/// the persistence sinks in the background; the response does not wait.
pub async fn handle_session(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let bank = &state.bank;
    let current = req.session.unwrap_or_else(Session::new);
    // Start and reset discard the snapshot, so a stale one must not block them.
    if !matches!(req.action, SessionAction::Start | SessionAction::Reset) {
        current.validate(bank)?;
    }

    let next = match req.action {
        SessionAction::Start => current.start(),
        SessionAction::Reset => current.reset(),
        SessionAction::UpdateBiodata { biodata } => current.update_biodata(biodata),
        SessionAction::SelectRole { role } => current.select_role(&role, bank)?,
        SessionAction::SwitchRole { role } => current.switch_role(&role, bank)?,
        SessionAction::ChangeCategory => current.change_category(),
        SessionAction::RecordAnswers { answers } => current.record_batch(answers)?,
        SessionAction::SubmitBatch { answers } => current.submit_batch(answers, bank)?,
        SessionAction::Next => current.advance(bank)?,
        SessionAction::Back => current.retreat(),
    };

    if !current.is_complete() && next.is_complete() {
        if let Some(result) = &next.results {
            let fingerprint =
                serde_json::to_string(&(&next.biodata, &next.selected_role, &next.answers))
                    .map_err(PersistenceError::from)?;
            if !state.recent_saves.claim(fingerprint).await {
                debug!("Assessment already saved; skipping repeated completion");
                return Ok(Json(respond(next, bank)?));
            }
            let role = next.selected_role.as_deref().and_then(|id| bank.role(id));
            let record = SavedAssessment::new(&next.biodata, role, result);
            info!(
                "Assessment {} completed with success rate {}%",
                record.id, result.success_rate
            );
            dispatch_save(state.sinks.clone(), record);
        }
    }

    Ok(Json(respond(next, bank)?))
}

fn respond(next: Session, bank: &QuestionBank) -> Result<SessionResponse, AppError> {
    Ok(SessionResponse {
        current_batch: next.current_batch(bank)?.to_vec(),
        progress: next.batch_progress(),
        role_name: next.role_name(bank).map(str::to_string),
        session: next,
    })
}

/// GET /api/v1/results
pub async fn handle_list_results(
    State(state): State<AppState>,
) -> Result<Json<Vec<SavedAssessment>>, AppError> {
    Ok(Json(state.store.list().await?))
}
