//! Wire representation of the question catalog and its canonicalization.
//!
//! The content service publishes answer weights under a handful of aliased
//! field names that accumulated across backend revisions. The aliases are
//! resolved once here, in a fixed priority order, so the rest of the engine
//! only ever sees [`Question`] and [`Answer`] with a canonical weight.

use serde::Deserialize;
use serde_json::Value;

use super::domain::{Answer, AnswerId, Question, QuestionId};
use super::normalize::coerce_u32;

/// Weight aliases in canonicalization priority order.
const WEIGHT_ALIASES: [&str; 5] = [
    "percentage",
    "answer_percentage",
    "points",
    "score",
    "value",
];

/// One answer as published by the content service.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAnswer {
    pub id: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, Value>,
}

impl RawAnswer {
    /// Resolves the aliased weight fields. The first alias holding a usable
    /// non-negative number wins; with none present the weight is zero.
    pub fn canonical_weight(&self) -> u32 {
        WEIGHT_ALIASES
            .iter()
            .filter_map(|alias| self.rest.get(*alias))
            .find_map(coerce_u32)
            .unwrap_or(0)
    }
}

/// One question as published by the content service.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub id: String,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answers: Vec<RawAnswer>,
}

impl From<RawAnswer> for Answer {
    fn from(raw: RawAnswer) -> Self {
        let weight = raw.canonical_weight();
        Answer {
            id: AnswerId(raw.id),
            label: raw.answer.unwrap_or_default(),
            weight,
        }
    }
}

impl From<RawQuestion> for Question {
    fn from(raw: RawQuestion) -> Self {
        Question {
            id: QuestionId(raw.id),
            prompt: raw.question.unwrap_or_default(),
            answers: raw.answers.into_iter().map(Answer::from).collect(),
        }
    }
}

/// Converts a fetched catalog page into domain questions, preserving order.
pub fn canonicalize_catalog(raw: Vec<RawQuestion>) -> Vec<Question> {
    raw.into_iter().map(Question::from).collect()
}
