use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single yes/no skill question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    pub category: String,
    pub course_recommendation: String,
}

impl Question {
    pub fn new(id: &str, text: &str, category: &str, course_recommendation: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            category: category.to_string(),
            course_recommendation: course_recommendation.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseDetails {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub difficulty: String,
    pub topics: Vec<String>,
}

/// A career track with its own question list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleTrack {
    pub id: String,
    /// Display name shown on the results page.
    pub name: String,
    /// Label written to the spreadsheet row.
    pub sheet_name: String,
    /// Lowercase substring that marks a question id as belonging to this role.
    pub id_marker: String,
    pub questions: Vec<Question>,
}

/// Which answer map a question batch writes into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum QuestionSet {
    General,
    RoleSpecific,
}

/// Answers recorded so far, keyed by question id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSet {
    #[serde(default)]
    pub general: BTreeMap<String, bool>,
    #[serde(default)]
    pub role_specific: BTreeMap<String, bool>,
}

impl AnswerSet {
    pub fn set(&self, set: QuestionSet) -> &BTreeMap<String, bool> {
        match set {
            QuestionSet::General => &self.general,
            QuestionSet::RoleSpecific => &self.role_specific,
        }
    }

    /// Merges a batch into the given map. Later answers overwrite earlier ones.
    pub fn record(&mut self, set: QuestionSet, batch: BTreeMap<String, bool>) {
        let target = match set {
            QuestionSet::General => &mut self.general,
            QuestionSet::RoleSpecific => &mut self.role_specific,
        };
        target.extend(batch);
    }
}

/// Per-category tally used for strength/weakness classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryStat {
    pub total: u32,
    pub correct: u32,
}

/// A course suggested for a question the user answered "no" to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub question_id: String,
    pub question_text: String,
    pub course_name: String,
    pub category: String,
    pub course_details: Option<CourseDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub success_rate: u32, // 55 – 100
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

/// Biographical data collected before the questions start.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Biodata {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub age_group: String,
    #[serde(default)]
    pub consultant: String,
}

/// Partial biodata; only the fields present overwrite the current values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiodataUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age_group: Option<String>,
    pub consultant: Option<String>,
}

impl Biodata {
    pub fn merge(&mut self, update: BiodataUpdate) {
        let BiodataUpdate {
            full_name,
            email,
            phone,
            age_group,
            consultant,
        } = update;
        if let Some(v) = full_name {
            self.full_name = v;
        }
        if let Some(v) = email {
            self.email = v;
        }
        if let Some(v) = phone {
            self.phone = v;
        }
        if let Some(v) = age_group {
            self.age_group = v;
        }
        if let Some(v) = consultant {
            self.consultant = v;
        }
    }
}
