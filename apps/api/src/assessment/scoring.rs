//! Assessment scoring: turns recorded yes/no answers into a curved success rate,
//! per-category strengths and weaknesses, and a short list of course recommendations.
//!
//! Pure over its inputs. Same answers, role and bank always give the same result.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::assessment::bank::QuestionBank;
use crate::assessment::models::{
    AnswerSet, AssessmentResult, CategoryStat, Question, Recommendation,
};

const GENERAL_WEIGHT: f64 = 0.4;
const ROLE_WEIGHT: f64 = 0.6;
/// Floor applied to the final percentage.
const MIN_SUCCESS_RATE: u32 = 55;
const STRENGTH_THRESHOLD: f64 = 0.8;
const WEAKNESS_THRESHOLD: f64 = 0.4;
const MAX_RECOMMENDATIONS: usize = 5;

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("No role-specific questions for role '{}'", .0.as_deref().unwrap_or("<unset>"))]
    InvalidRole(Option<String>),

    #[error("Question data integrity violated: {0}")]
    DataIntegrity(String),
}

/// Scores a completed assessment.
///
/// Algorithm:
/// 1. raw score per set = true answers / questions in the set
/// 2. curve each raw score (see [`curve`])
/// 3. weighted = 0.4 × general + 0.6 × role, floored at 55%
/// 4. tally every question by category; explicit "no" answers become recommendations
/// 5. classify: strength (≥ 0.8), weakness (≤ 0.4), otherwise neither
/// 6. role-specific recommendations first, top 5
pub fn calculate_results(
    answers: &AnswerSet,
    selected_role: Option<&str>,
    bank: &QuestionBank,
) -> Result<AssessmentResult, ScoringError> {
    let role = selected_role
        .and_then(|id| bank.role(id))
        .ok_or_else(|| ScoringError::InvalidRole(selected_role.map(str::to_string)))?;

    let general_score = raw_score(&bank.general, &answers.general, "general")?;
    let role_score = raw_score(&role.questions, &answers.role_specific, &role.id)?;

    let weighted = curve(general_score) * GENERAL_WEIGHT + curve(role_score) * ROLE_WEIGHT;
    let success_rate = ((weighted * 100.0).round() as u32).clamp(MIN_SUCCESS_RATE, 100);

    let mut stats: Vec<(String, CategoryStat)> = Vec::new();
    let mut recommendations = Vec::new();

    let sets = [
        (&bank.general, &answers.general),
        (&role.questions, &answers.role_specific),
    ];
    for (questions, recorded) in sets {
        for question in questions {
            let stat = category_entry(&mut stats, &question.category);
            stat.total += 1;

            match recorded.get(&question.id) {
                Some(true) => stat.correct += 1,
                Some(false) => recommendations.push(recommend(question, bank)),
                None => {}
            }
        }
    }

    for (category, stat) in &stats {
        debug!(
            "Category {category}: {}/{} correct",
            stat.correct, stat.total
        );
    }

    let (strengths, weaknesses) = classify_categories(&stats)?;
    let recommendations = prioritize_recommendations(recommendations, &role.id_marker);

    debug!(
        "Scored role {}: success_rate={success_rate}, strengths={}, weaknesses={}, recommendations={}",
        role.id,
        strengths.len(),
        weaknesses.len(),
        recommendations.len()
    );

    Ok(AssessmentResult {
        success_rate,
        strengths,
        weaknesses,
        recommendations,
    })
}

/// Maps a raw score in [0, 1] onto [0.55, 1.0].
///
/// The lower half rises steeply from 0.55 to 0.75; the upper half climbs more
/// slowly from 0.75.
pub fn curve(score: f64) -> f64 {
    if score <= 0.5 {
        0.55 + score * 0.4
    } else {
        0.75 + (score - 0.5) * (0.15 / 0.3)
    }
}

fn raw_score(
    questions: &[Question],
    recorded: &BTreeMap<String, bool>,
    set_name: &str,
) -> Result<f64, ScoringError> {
    if questions.is_empty() {
        return Err(ScoringError::DataIntegrity(format!(
            "question set '{set_name}' is empty"
        )));
    }
    // Only answers to questions in this set count; stray keys are ignored.
    let yes = questions
        .iter()
        .filter(|q| recorded.get(&q.id) == Some(&true))
        .count();
    Ok(yes as f64 / questions.len() as f64)
}

fn category_entry<'a>(
    stats: &'a mut Vec<(String, CategoryStat)>,
    category: &str,
) -> &'a mut CategoryStat {
    let idx = match stats.iter().position(|(name, _)| name == category) {
        Some(idx) => idx,
        None => {
            stats.push((category.to_string(), CategoryStat::default()));
            stats.len() - 1
        }
    };
    &mut stats[idx].1
}

fn recommend(question: &Question, bank: &QuestionBank) -> Recommendation {
    Recommendation {
        question_id: question.id.clone(),
        question_text: question.text.clone(),
        course_name: question.course_recommendation.clone(),
        category: question.category.clone(),
        course_details: bank.course(&question.course_recommendation).cloned(),
    }
}

/// Splits categories into (strengths, weaknesses), in first-seen order.
fn classify_categories(
    stats: &[(String, CategoryStat)],
) -> Result<(Vec<String>, Vec<String>), ScoringError> {
    let mut strengths: Vec<String> = Vec::new();
    let mut weaknesses: Vec<String> = Vec::new();

    for (category, stat) in stats {
        if stat.total == 0 {
            return Err(ScoringError::DataIntegrity(format!(
                "category '{category}' has no questions"
            )));
        }
        let ratio = stat.correct as f64 / stat.total as f64;

        let bucket = if ratio >= STRENGTH_THRESHOLD {
            &mut strengths
        } else if ratio <= WEAKNESS_THRESHOLD {
            &mut weaknesses
        } else {
            continue;
        };
        if !bucket.contains(category) {
            bucket.push(category.clone());
        }
    }

    Ok((strengths, weaknesses))
}

/// Stable partition: ids containing the role marker first, then the rest, capped.
fn prioritize_recommendations(
    recommendations: Vec<Recommendation>,
    role_marker: &str,
) -> Vec<Recommendation> {
    let marker = role_marker.to_lowercase();
    let (role_specific, general): (Vec<_>, Vec<_>) = recommendations
        .into_iter()
        .partition(|r| r.question_id.to_lowercase().contains(&marker));

    role_specific
        .into_iter()
        .chain(general)
        .take(MAX_RECOMMENDATIONS)
        .collect()
}
