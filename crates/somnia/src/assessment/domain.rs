use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Identifier wrapper for catalog questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

/// Identifier wrapper for catalog answers. Opaque token; treated as globally
/// unique across questions (see DESIGN.md for the collision assumption).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerId(pub String);

/// Identifier wrapper for persisted assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Identifier wrapper for authenticated users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// One selectable answer with its canonicalized score contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub label: String,
    pub weight: u32,
}

/// One catalog question with its ordered answer list. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub answers: Vec<Answer>,
}

/// Sentinel results-view identifier used while no persisted record exists.
pub const GUEST_RESULTS_KEY: &str = "guest";

/// Address of a results view: the guest sentinel or a persisted record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsKey {
    Guest,
    Assessment(AssessmentId),
}

impl ResultsKey {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == GUEST_RESULTS_KEY {
            Self::Guest
        } else {
            Self::Assessment(AssessmentId(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResultsKey::Guest => GUEST_RESULTS_KEY,
            ResultsKey::Assessment(id) => &id.0,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, ResultsKey::Guest)
    }
}

impl std::fmt::Display for ResultsKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ephemeral per-session selection state: one chosen answer per step,
/// overwritten on re-selection. Never persisted directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizSelection {
    chosen: BTreeMap<usize, AnswerId>,
}

impl QuizSelection {
    pub fn record(&mut self, step: usize, answer: AnswerId) {
        self.chosen.insert(step, answer);
    }

    pub fn answer_for(&self, step: usize) -> Option<&AnswerId> {
        self.chosen.get(&step)
    }

    pub fn answered(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// Projects the selection into the ordered answer-id list submitted to
    /// the assessment service, by increasing step index.
    pub fn project(&self) -> Vec<AnswerId> {
        self.chosen.values().cloned().collect()
    }
}

/// Payload for a create call against the assessment service. Records are
/// never created anonymously, so the owning user is required here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentDraft {
    pub user_id: UserId,
    pub answers: Vec<AnswerId>,
    pub score: u32,
    pub symptoms: String,
}

/// A persisted assessment as this core understands it after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub user_id: Option<UserId>,
    pub answers: Vec<AnswerId>,
    /// May be absent or stale on records fetched back from the service.
    pub score: Option<u32>,
    pub symptoms: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Results hand-off carried across a navigation to the results view. The
/// wire casing mirrors the navigation channel contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsHandoff {
    #[serde(default)]
    pub answers: Vec<AnswerId>,
    pub total_score: u32,
    #[serde(default)]
    pub symptoms: Option<String>,
}

impl ResultsHandoff {
    pub fn to_value(&self) -> Value {
        json!({
            "answers": self.answers,
            "totalScore": self.total_score,
            "symptoms": self.symptoms,
        })
    }

    /// Validates an opaque channel payload. `None` when no numeric score is
    /// present, which is the entry condition for every consumer of this
    /// payload.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Continuation payload attached to the login redirect when a guest finishes
/// the quiz. The only channel across the redirect; there is no server-side
/// session for anonymous users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeHandoff {
    pub resumed_assessment: bool,
    #[serde(default)]
    pub assessment_answers: Vec<AnswerId>,
}

impl ResumeHandoff {
    pub fn new(assessment_answers: Vec<AnswerId>) -> Self {
        Self {
            resumed_assessment: true,
            assessment_answers,
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "resumedAssessment": self.resumed_assessment,
            "assessmentAnswers": self.assessment_answers,
        })
    }

    /// Validates an opaque channel payload; the resumed-assessment flag must
    /// be set for the payload to count.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value::<Self>(value.clone())
            .ok()
            .filter(|payload| payload.resumed_assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_key_parses_guest_and_ids() {
        assert!(ResultsKey::parse("guest").is_guest());
        assert!(ResultsKey::parse("  ").is_guest());
        assert_eq!(
            ResultsKey::parse("asmt-000042"),
            ResultsKey::Assessment(AssessmentId("asmt-000042".to_string()))
        );
    }

    #[test]
    fn selection_projects_in_step_order() {
        let mut selection = QuizSelection::default();
        selection.record(2, AnswerId("c".to_string()));
        selection.record(0, AnswerId("a".to_string()));
        selection.record(1, AnswerId("b".to_string()));
        selection.record(0, AnswerId("a2".to_string()));

        assert_eq!(selection.answered(), 3);
        let projected: Vec<String> = selection.project().into_iter().map(|id| id.0).collect();
        assert_eq!(projected, vec!["a2", "b", "c"]);
    }

    #[test]
    fn results_handoff_requires_numeric_score() {
        let valid = serde_json::json!({ "answers": ["a"], "totalScore": 42, "symptoms": "apnea" });
        let payload = ResultsHandoff::from_value(&valid).expect("valid payload");
        assert_eq!(payload.total_score, 42);

        let missing_score = serde_json::json!({ "answers": ["a"] });
        assert!(ResultsHandoff::from_value(&missing_score).is_none());

        let non_numeric = serde_json::json!({ "totalScore": "high" });
        assert!(ResultsHandoff::from_value(&non_numeric).is_none());
    }

    #[test]
    fn resume_handoff_requires_flag() {
        let flagged = serde_json::json!({ "resumedAssessment": true, "assessmentAnswers": ["a"] });
        assert!(ResumeHandoff::from_value(&flagged).is_some());

        let unflagged = serde_json::json!({ "resumedAssessment": false, "assessmentAnswers": ["a"] });
        assert!(ResumeHandoff::from_value(&unflagged).is_none());

        assert!(ResumeHandoff::from_value(&serde_json::json!("junk")).is_none());
    }
}
