//! Persistence of completed assessments.
//!
//! Saving is fire-and-forget: `dispatch_save` spawns one background task that
//! runs every sink in order and only logs failures. The returned handle is the
//! completion signal; the navigation path never awaits it.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::models::{AssessmentResult, Biodata, RoleTrack};
use crate::sheets::WebhookError;

pub mod local;
pub mod remote;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Spreadsheet rejected the row: {0}")]
    Rejected(String),
}

/// The result summary kept with a saved assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedResults {
    pub role: Option<String>,
    pub role_name: Option<String>,
    pub success_rate: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// Recommended course names, best first.
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedAssessment {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub biodata: Biodata,
    pub results: SavedResults,
}

impl SavedAssessment {
    pub fn new(biodata: &Biodata, role: Option<&RoleTrack>, result: &AssessmentResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            biodata: biodata.clone(),
            results: SavedResults {
                role: role.map(|r| r.id.clone()),
                role_name: role.map(|r| r.sheet_name.clone()),
                success_rate: result.success_rate,
                strengths: result.strengths.clone(),
                weaknesses: result.weaknesses.clone(),
                recommendations: result
                    .recommendations
                    .iter()
                    .map(|r| r.course_name.clone())
                    .collect(),
            },
        }
    }
}

/// One flattened spreadsheet row, as sent to `/api/save-results`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SheetRow {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub age_group: String,
    pub consultant: String,
    pub role_name: String,
    pub success_rate: u32,
    pub strengths: String,
    pub weaknesses: String,
    pub recommendations: String,
}

impl From<&SavedAssessment> for SheetRow {
    fn from(record: &SavedAssessment) -> Self {
        let or_missing = |v: &str| {
            if v.is_empty() {
                "Not provided".to_string()
            } else {
                v.to_string()
            }
        };
        let b = &record.biodata;
        let r = &record.results;
        Self {
            full_name: or_missing(&b.full_name),
            email: or_missing(&b.email),
            phone: or_missing(&b.phone),
            age_group: or_missing(&b.age_group),
            consultant: or_missing(&b.consultant),
            role_name: r.role_name.clone().unwrap_or_else(|| "N/A".to_string()),
            success_rate: r.success_rate,
            strengths: r.strengths.join(", "),
            weaknesses: r.weaknesses.join(", "),
            recommendations: r.recommendations.join(", "),
        }
    }
}

/// A destination for completed assessments.
///
/// Carried in `AppState` as a list of `Arc<dyn ResultSink>`.
#[async_trait]
pub trait ResultSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn save(&self, record: &SavedAssessment) -> Result<(), PersistenceError>;
}

/// How many completed assessments `RecentSaves` remembers.
pub const RECENT_SAVES_WINDOW: usize = 1024;

/// Fingerprints of recently completed assessments.
///
/// The server keeps no sessions, so a client can replay the same final
/// snapshot. A completion whose fingerprint is still in the window is not
/// saved again. Oldest entries fall out once `capacity` is reached.
#[derive(Clone)]
pub struct RecentSaves {
    seen: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl RecentSaves {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Returns true the first time `fingerprint` is seen inside the window.
    pub async fn claim(&self, fingerprint: String) -> bool {
        let mut seen = self.seen.lock().await;
        if seen.contains(&fingerprint) {
            return false;
        }
        if seen.len() >= self.capacity {
            seen.pop_front();
        }
        seen.push_back(fingerprint);
        true
    }
}

/// Saves `record` to every sink on a detached task. One attempt per sink.
pub fn dispatch_save(sinks: Vec<Arc<dyn ResultSink>>, record: SavedAssessment) -> JoinHandle<()> {
    tokio::spawn(async move {
        for sink in &sinks {
            match sink.save(&record).await {
                Ok(()) => info!("Saved assessment {} to {}", record.id, sink.name()),
                Err(e) => warn!(
                    "Failed to save assessment {} to {}: {e}",
                    record.id,
                    sink.name()
                ),
            }
        }
    })
}
