//! Assessment session state machine.
//!
//! A `Session` is a plain value owned by the caller. Every operation takes the
//! current snapshot and returns the next one; nothing is mutated in place and
//! there is no process-wide session state.
//!
//! Flow: welcome → biodata → roleSelection → generalQuestions(0, 1)
//! → roleQuestions(0, 1) → results. Scoring runs on the last forward step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assessment::bank::{batch_slice, QuestionBank, BATCHES_PER_SET};
use crate::assessment::models::{
    AnswerSet, AssessmentResult, Biodata, BiodataUpdate, Question, QuestionSet, RoleTrack,
};
use crate::assessment::scoring::{calculate_results, ScoringError};

const TOTAL_BATCHES: u32 = 2 * BATCHES_PER_SET as u32;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum Stage {
    #[default]
    Welcome,
    Biodata,
    RoleSelection,
    GeneralQuestions { batch: u8 },
    RoleQuestions { batch: u8 },
    Results,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Welcome => "welcome",
            Stage::Biodata => "biodata",
            Stage::RoleSelection => "roleSelection",
            Stage::GeneralQuestions { .. } => "generalQuestions",
            Stage::RoleQuestions { .. } => "roleQuestions",
            Stage::Results => "results",
        }
    }

    /// Question stages only hold batch indices below `BATCHES_PER_SET`.
    pub fn check(&self) -> Result<(), SessionError> {
        match *self {
            Stage::GeneralQuestions { batch } | Stage::RoleQuestions { batch }
                if batch >= BATCHES_PER_SET =>
            {
                Err(SessionError::BatchOutOfRange(batch, self.name()))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error("Stage '{0}' does not accept answers")]
    NotAnswering(&'static str),

    #[error("Unanswered questions in current batch: {}", .0.join(", "))]
    IncompleteBatch(Vec<String>),

    #[error("Batch {0} is out of range for stage '{1}'")]
    BatchOutOfRange(u8, &'static str),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchProgress {
    pub current: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub biodata: Biodata,
    #[serde(default)]
    pub selected_role: Option<String>,
    #[serde(default)]
    pub stage: Stage,
    #[serde(default)]
    pub answers: AnswerSet,
    #[serde(default)]
    pub results: Option<AssessmentResult>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything and opens the biodata form.
    pub fn start(&self) -> Session {
        Session {
            stage: Stage::Biodata,
            ..Session::default()
        }
    }

    pub fn reset(&self) -> Session {
        Session::default()
    }

    pub fn update_biodata(&self, update: BiodataUpdate) -> Session {
        let mut next = self.clone();
        next.biodata.merge(update);
        next
    }

    /// Checks a snapshot handed in from outside: the stage must be in range
    /// and a selected role must exist in the bank.
    pub fn validate(&self, bank: &QuestionBank) -> Result<(), SessionError> {
        self.stage.check()?;
        match self.selected_role.as_deref() {
            Some(id) if bank.role(id).is_none() => {
                Err(ScoringError::InvalidRole(Some(id.to_string())).into())
            }
            _ => Ok(()),
        }
    }

    /// Records the chosen role. Answers and stage are left as they are.
    pub fn select_role(&self, role: &str, bank: &QuestionBank) -> Result<Session, SessionError> {
        let track = known_role(role, bank)?;
        Ok(Session {
            selected_role: Some(track.id.clone()),
            ..self.clone()
        })
    }

    /// Changes role mid-assessment: keeps biodata, restarts the questions.
    pub fn switch_role(&self, role: &str, bank: &QuestionBank) -> Result<Session, SessionError> {
        let track = known_role(role, bank)?;
        Ok(Session {
            selected_role: Some(track.id.clone()),
            stage: Stage::GeneralQuestions { batch: 0 },
            answers: AnswerSet::default(),
            ..self.clone()
        })
    }

    /// Drops all answers and returns to role selection. Biodata survives.
    pub fn change_category(&self) -> Session {
        Session {
            stage: Stage::RoleSelection,
            answers: AnswerSet::default(),
            ..self.clone()
        }
    }

    pub fn current_question_set(&self) -> Option<QuestionSet> {
        match self.stage {
            Stage::GeneralQuestions { .. } => Some(QuestionSet::General),
            Stage::RoleQuestions { .. } => Some(QuestionSet::RoleSpecific),
            _ => None,
        }
    }

    /// The questions on screen for the current stage; empty outside question stages.
    pub fn current_batch<'b>(&self, bank: &'b QuestionBank) -> Result<&'b [Question], SessionError> {
        self.stage.check()?;
        match self.stage {
            Stage::GeneralQuestions { batch } => Ok(batch_slice(&bank.general, batch)),
            Stage::RoleQuestions { batch } => {
                let role = self
                    .selected_role
                    .as_deref()
                    .and_then(|id| bank.role(id))
                    .ok_or_else(|| ScoringError::InvalidRole(self.selected_role.clone()))?;
                Ok(batch_slice(&role.questions, batch))
            }
            _ => Ok(&[]),
        }
    }

    /// Merges answers into the map of the current question set.
    pub fn record_batch(&self, batch: BTreeMap<String, bool>) -> Result<Session, SessionError> {
        let set = self
            .current_question_set()
            .ok_or(SessionError::NotAnswering(self.stage.name()))?;
        let mut next = self.clone();
        next.answers.record(set, batch);
        Ok(next)
    }

    /// Ids of questions in the current batch that have no recorded answer.
    pub fn unanswered_in_batch(&self, bank: &QuestionBank) -> Result<Vec<String>, SessionError> {
        let Some(set) = self.current_question_set() else {
            return Ok(Vec::new());
        };
        let recorded = self.answers.set(set);
        Ok(self
            .current_batch(bank)?
            .iter()
            .filter(|q| !recorded.contains_key(&q.id))
            .map(|q| q.id.clone())
            .collect())
    }

    /// Records a batch and moves forward, unless the batch still has gaps.
    pub fn submit_batch(
        &self,
        batch: BTreeMap<String, bool>,
        bank: &QuestionBank,
    ) -> Result<Session, SessionError> {
        let recorded = self.record_batch(batch)?;
        let missing = recorded.unanswered_in_batch(bank)?;
        if !missing.is_empty() {
            return Err(SessionError::IncompleteBatch(missing));
        }
        recorded.advance(bank)
    }

    /// Moves one step forward. Leaving the last role batch scores the answers.
    pub fn advance(&self, bank: &QuestionBank) -> Result<Session, SessionError> {
        self.stage.check()?;
        let mut next = self.clone();
        next.stage = match self.stage {
            Stage::Welcome => Stage::Biodata,
            Stage::Biodata => Stage::RoleSelection,
            Stage::RoleSelection => Stage::GeneralQuestions { batch: 0 },
            Stage::GeneralQuestions { batch } if batch < BATCHES_PER_SET - 1 => {
                Stage::GeneralQuestions { batch: batch + 1 }
            }
            Stage::GeneralQuestions { .. } => Stage::RoleQuestions { batch: 0 },
            Stage::RoleQuestions { batch } if batch < BATCHES_PER_SET - 1 => {
                Stage::RoleQuestions { batch: batch + 1 }
            }
            Stage::RoleQuestions { .. } => {
                let results =
                    calculate_results(&self.answers, self.selected_role.as_deref(), bank)?;
                next.results = Some(results);
                Stage::Results
            }
            Stage::Results => Stage::Results,
        };
        Ok(next)
    }

    /// Moves one step back. The first role batch returns to the last general batch.
    pub fn retreat(&self) -> Session {
        let stage = match self.stage {
            Stage::Welcome => Stage::Welcome,
            Stage::Biodata => Stage::Welcome,
            Stage::RoleSelection => Stage::Biodata,
            Stage::GeneralQuestions { batch: 0 } => Stage::RoleSelection,
            Stage::GeneralQuestions { batch } => Stage::GeneralQuestions { batch: batch - 1 },
            Stage::RoleQuestions { batch: 0 } => Stage::GeneralQuestions {
                batch: BATCHES_PER_SET - 1,
            },
            Stage::RoleQuestions { batch } => Stage::RoleQuestions { batch: batch - 1 },
            Stage::Results => Stage::Results,
        };
        Session {
            stage,
            ..self.clone()
        }
    }

    /// Position across all four question batches. Outside question stages the
    /// count reads as the first batch; on results it reads as the last.
    pub fn batch_progress(&self) -> BatchProgress {
        let completed = match self.stage {
            Stage::GeneralQuestions { batch } => batch as u32,
            Stage::RoleQuestions { batch } => BATCHES_PER_SET as u32 + batch as u32,
            Stage::Results => TOTAL_BATCHES - 1,
            _ => 0,
        };
        let current = completed + 1;
        BatchProgress {
            current,
            total: TOTAL_BATCHES,
            percentage: ((current as f64 / TOTAL_BATCHES as f64) * 100.0).round() as u32,
        }
    }

    pub fn role_name<'b>(&self, bank: &'b QuestionBank) -> Option<&'b str> {
        self.selected_role
            .as_deref()
            .and_then(|id| bank.role(id))
            .map(|r| r.name.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Results
    }
}

fn known_role<'b>(role: &str, bank: &'b QuestionBank) -> Result<&'b RoleTrack, SessionError> {
    bank.role(role)
        .ok_or_else(|| ScoringError::InvalidRole(Some(role.to_string())).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer_batch(questions: &[Question], value: bool) -> BTreeMap<String, bool> {
        questions.iter().map(|q| (q.id.clone(), value)).collect()
    }

    /// Walks a fresh session up to the first general batch with `role` selected.
    fn at_questions(bank: &QuestionBank, role: &str) -> Session {
        let s = Session::new().start();
        let s = s.advance(bank).unwrap();
        s.select_role(role, bank).unwrap().advance(bank).unwrap()
    }

    fn answer_everything(bank: &QuestionBank, role: &str, value: bool) -> Session {
        let mut s = at_questions(bank, role);
        while !s.is_complete() {
            let batch = answer_batch(s.current_batch(bank).unwrap(), value);
            s = s.submit_batch(batch, bank).unwrap();
        }
        s
    }

    #[test]
    fn test_forward_path() {
        let bank = QuestionBank::builtin();
        let mut s = Session::new();
        let mut names = vec![s.stage.name()];
        s = s.advance(&bank).unwrap();
        names.push(s.stage.name());
        s = s.advance(&bank).unwrap().select_role("networkAdmin", &bank).unwrap();
        names.push(s.stage.name());
        for _ in 0..4 {
            s = s.advance(&bank).unwrap();
            names.push(s.stage.name());
        }
        assert_eq!(
            names,
            vec![
                "welcome",
                "biodata",
                "roleSelection",
                "generalQuestions",
                "generalQuestions",
                "roleQuestions",
                "roleQuestions",
            ]
        );
        assert_eq!(s.stage, Stage::RoleQuestions { batch: 1 });
    }

    #[test]
    fn test_final_advance_scores() {
        let bank = QuestionBank::builtin();
        let s = answer_everything(&bank, "networkAdmin", true);
        assert_eq!(s.stage, Stage::Results);
        assert_eq!(s.results.as_ref().unwrap().success_rate, 100);
    }

    #[test]
    fn test_results_advance_is_idempotent() {
        let bank = QuestionBank::builtin();
        let s = answer_everything(&bank, "cybersecurity", false);
        let again = s.advance(&bank).unwrap();
        assert_eq!(again, s);
        assert_eq!(again.results.unwrap().success_rate, 55);
    }

    #[test]
    fn test_retreat_crosses_question_sets() {
        let s = Session {
            stage: Stage::RoleQuestions { batch: 0 },
            ..Session::default()
        };
        assert_eq!(s.retreat().stage, Stage::GeneralQuestions { batch: 1 });
        assert_eq!(s.retreat().retreat().stage, Stage::GeneralQuestions { batch: 0 });
        assert_eq!(s.retreat().retreat().retreat().stage, Stage::RoleSelection);
    }

    #[test]
    fn test_retreat_from_second_role_batch() {
        let s = Session {
            stage: Stage::RoleQuestions { batch: 1 },
            ..Session::default()
        };
        assert_eq!(s.retreat().stage, Stage::RoleQuestions { batch: 0 });
    }

    #[test]
    fn test_select_role_keeps_answers() {
        let bank = QuestionBank::builtin();
        let s = at_questions(&bank, "networkAdmin");
        let s = s
            .record_batch(BTreeMap::from([("generalQ1".to_string(), true)]))
            .unwrap();
        let s = s.select_role("cybersecurity", &bank).unwrap();
        assert_eq!(s.answers.general.len(), 1);
        assert_eq!(s.stage, Stage::GeneralQuestions { batch: 0 });
    }

    #[test]
    fn test_unknown_role_rejected_at_selection() {
        let bank = QuestionBank::builtin();
        let s = Session::new().start().advance(&bank).unwrap();
        let expected = SessionError::Scoring(ScoringError::InvalidRole(Some("bogus".to_string())));
        assert_eq!(s.select_role("bogus", &bank).unwrap_err(), expected);

        let s = answer_everything(&bank, "cybersecurity", true);
        assert_eq!(s.switch_role("bogus", &bank).unwrap_err(), expected);
    }

    #[test]
    fn test_validate_snapshot() {
        let bank = QuestionBank::builtin();
        assert!(at_questions(&bank, "networkAdmin").validate(&bank).is_ok());

        let unknown = Session {
            selected_role: Some("dataScience".to_string()),
            ..Session::default()
        };
        assert_eq!(
            unknown.validate(&bank).unwrap_err(),
            SessionError::Scoring(ScoringError::InvalidRole(Some("dataScience".to_string())))
        );

        let stray = Session {
            stage: Stage::RoleQuestions { batch: 2 },
            ..Session::default()
        };
        assert_eq!(
            stray.validate(&bank).unwrap_err(),
            SessionError::BatchOutOfRange(2, "roleQuestions")
        );
    }

    #[test]
    fn test_out_of_range_batch_does_not_advance() {
        let bank = QuestionBank::builtin();
        let stage: Stage =
            serde_json::from_value(serde_json::json!({"name": "generalQuestions", "batch": 255}))
                .unwrap();
        let s = Session {
            selected_role: Some("networkAdmin".to_string()),
            stage,
            ..Session::default()
        };
        assert_eq!(
            s.advance(&bank).unwrap_err(),
            SessionError::BatchOutOfRange(255, "generalQuestions")
        );
        assert_eq!(s.retreat().stage, Stage::GeneralQuestions { batch: 254 });
    }

    #[test]
    fn test_out_of_range_batch_cannot_skip_to_results() {
        let bank = QuestionBank::builtin();
        let s = Session {
            selected_role: Some("cybersecurity".to_string()),
            stage: Stage::RoleQuestions { batch: 7 },
            ..Session::default()
        };
        let err = s.submit_batch(BTreeMap::new(), &bank).unwrap_err();
        assert_eq!(err, SessionError::BatchOutOfRange(7, "roleQuestions"));
    }

    #[test]
    fn test_change_category_clears_answers() {
        let bank = QuestionBank::builtin();
        let s = at_questions(&bank, "networkAdmin")
            .update_biodata(BiodataUpdate {
                full_name: Some("Grace Hopper".to_string()),
                ..Default::default()
            })
            .record_batch(BTreeMap::from([("generalQ1".to_string(), true)]))
            .unwrap();

        let s = s.change_category();
        assert_eq!(s.stage, Stage::RoleSelection);
        assert!(s.answers.general.is_empty());
        assert!(s.answers.role_specific.is_empty());
        assert_eq!(s.biodata.full_name, "Grace Hopper");
    }

    #[test]
    fn test_switch_role_restarts_questions() {
        let bank = QuestionBank::builtin();
        let s = answer_everything(&bank, "networkAdmin", true)
            .switch_role("cybersecurity", &bank)
            .unwrap();
        assert_eq!(s.stage, Stage::GeneralQuestions { batch: 0 });
        assert_eq!(s.selected_role.as_deref(), Some("cybersecurity"));
        assert_eq!(s.answers, AnswerSet::default());
    }

    #[test]
    fn test_record_batch_routes_by_stage() {
        let bank = QuestionBank::builtin();
        let s = at_questions(&bank, "networkAdmin");
        let general = answer_batch(s.current_batch(&bank).unwrap(), true);
        let s = s.submit_batch(general, &bank).unwrap();
        let general = answer_batch(s.current_batch(&bank).unwrap(), true);
        let s = s.submit_batch(general, &bank).unwrap();

        assert_eq!(s.current_question_set(), Some(QuestionSet::RoleSpecific));
        let role = answer_batch(s.current_batch(&bank).unwrap(), false);
        let s = s.record_batch(role).unwrap();
        assert_eq!(s.answers.general.len(), 10);
        assert_eq!(s.answers.role_specific.len(), 5);
        assert!(s.answers.role_specific.keys().all(|k| k.starts_with("networkQ")));
    }

    #[test]
    fn test_record_outside_questions_rejected() {
        let err = Session::new()
            .record_batch(BTreeMap::from([("generalQ1".to_string(), true)]))
            .unwrap_err();
        assert_eq!(err, SessionError::NotAnswering("welcome"));
    }

    #[test]
    fn test_incomplete_batch_blocks_submit() {
        let bank = QuestionBank::builtin();
        let s = at_questions(&bank, "cybersecurity");
        let err = s
            .submit_batch(BTreeMap::from([("generalQ1".to_string(), true)]), &bank)
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::IncompleteBatch(vec![
                "generalQ2".to_string(),
                "generalQ3".to_string(),
                "generalQ4".to_string(),
                "generalQ5".to_string(),
            ])
        );
    }

    #[test]
    fn test_scoring_without_role_fails() {
        let bank = QuestionBank::builtin();
        let s = Session {
            stage: Stage::RoleQuestions { batch: 1 },
            ..Session::default()
        };
        let err = s.advance(&bank).unwrap_err();
        assert_eq!(err, SessionError::Scoring(ScoringError::InvalidRole(None)));
    }

    #[test]
    fn test_batch_progress() {
        let at = |stage| Session {
            stage,
            ..Session::default()
        };
        assert_eq!(
            at(Stage::GeneralQuestions { batch: 0 }).batch_progress(),
            BatchProgress {
                current: 1,
                total: 4,
                percentage: 25
            }
        );
        assert_eq!(at(Stage::RoleQuestions { batch: 0 }).batch_progress().percentage, 75);
        assert_eq!(at(Stage::Results).batch_progress().percentage, 100);
    }

    #[test]
    fn test_role_name() {
        let bank = QuestionBank::builtin();
        let s = Session::new().select_role("networkAdmin", &bank).unwrap();
        assert_eq!(s.role_name(&bank), Some("Network Administration"));
        assert_eq!(Session::new().role_name(&bank), None);
    }

    #[test]
    fn test_stage_wire_format() {
        let json = serde_json::to_value(Stage::RoleQuestions { batch: 1 }).unwrap();
        assert_eq!(json, serde_json::json!({"name": "roleQuestions", "batch": 1}));
        let stage: Stage = serde_json::from_value(serde_json::json!({"name": "results"})).unwrap();
        assert_eq!(stage, Stage::Results);
    }
}
