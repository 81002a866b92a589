//! Resolution of the data behind a results view.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::domain::{AnswerId, ResultsHandoff, ResultsKey};
use super::normalize::normalize_record;
use super::repository::{AssessmentStore, QuestionSource};
use super::risk::{classify, RiskProfile};
use super::scoring::score_answers;

/// Where the displayed numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultsSource {
    /// Transient hand-off payload, the instant after completion.
    Handoff,
    /// Persisted record with its stored score.
    Stored,
    /// Persisted record whose score was recomputed against the live catalog.
    Recomputed,
}

/// Display data for a resolved result.
#[derive(Debug, Serialize)]
pub struct ResultsView {
    pub score: u32,
    pub symptoms: Option<String>,
    pub answers: Vec<AnswerId>,
    pub source: ResultsSource,
    pub risk: RiskProfile,
}

/// Terminal outcome of a resolution. Every path terminates; a results view
/// is never left waiting.
#[derive(Debug)]
pub enum ResolvedResults {
    Ready(ResultsView),
    /// Guest sentinel with no payload, or record gone: a valid state inviting
    /// the user to take the assessment, not an error.
    NothingToShow,
    /// Collaborator failure, degraded with a plain-language path forward.
    Unavailable { message: &'static str },
}

const UNAVAILABLE_MESSAGE: &str =
    "We couldn't load this assessment right now. Head back home or retake the assessment.";

/// Resolves what a results view should display.
pub struct ResultsResolver<Q, S> {
    questions: Arc<Q>,
    store: Arc<S>,
}

impl<Q, S> ResultsResolver<Q, S>
where
    Q: QuestionSource,
    S: AssessmentStore,
{
    pub fn new(questions: Arc<Q>, store: Arc<S>) -> Self {
        Self { questions, store }
    }

    /// Resolution priority: a hand-off payload carrying a numeric score wins
    /// outright and no fetch is attempted; a bare guest sentinel is the
    /// terminal empty state; anything else fetches the record and the live
    /// catalog in parallel, recomputing the score from raw answer ids when
    /// the stored one is absent.
    pub async fn resolve(&self, key: &ResultsKey, handoff: Option<&Value>) -> ResolvedResults {
        if let Some(payload) = handoff.and_then(ResultsHandoff::from_value) {
            return ResolvedResults::Ready(view_from_handoff(payload));
        }

        let ResultsKey::Assessment(id) = key else {
            return ResolvedResults::NothingToShow;
        };

        let (record, catalog) = tokio::join!(self.store.fetch(id), self.questions.load_questions());

        let raw = match record {
            Ok(Some(raw)) => raw,
            Ok(None) => return ResolvedResults::NothingToShow,
            Err(error) => {
                warn!(%error, assessment = %id.0, "assessment fetch failed");
                return ResolvedResults::Unavailable {
                    message: UNAVAILABLE_MESSAGE,
                };
            }
        };

        let normalized = match normalize_record(&raw) {
            Ok(normalized) => normalized,
            Err(error) => {
                warn!(%error, assessment = %id.0, "assessment record failed normalization");
                return ResolvedResults::Unavailable {
                    message: UNAVAILABLE_MESSAGE,
                };
            }
        };

        let (score, source) = match normalized.score {
            Some(score) => (score, ResultsSource::Stored),
            None if !normalized.answers.is_empty() => match catalog {
                Ok(questions) => (
                    score_answers(&normalized.answers, &questions),
                    ResultsSource::Recomputed,
                ),
                Err(error) => {
                    warn!(%error, "catalog fetch failed while recomputing a stored result");
                    return ResolvedResults::Unavailable {
                        message: UNAVAILABLE_MESSAGE,
                    };
                }
            },
            None => (0, ResultsSource::Stored),
        };

        let risk = classify(score, normalized.symptoms.as_deref());
        ResolvedResults::Ready(ResultsView {
            score,
            symptoms: normalized.symptoms,
            answers: normalized.answers,
            source,
            risk,
        })
    }
}

fn view_from_handoff(payload: ResultsHandoff) -> ResultsView {
    let risk = classify(payload.total_score, payload.symptoms.as_deref());
    ResultsView {
        score: payload.total_score,
        symptoms: payload.symptoms,
        answers: payload.answers,
        source: ResultsSource::Handoff,
        risk,
    }
}

impl ResolvedResults {
    /// Convenience for callers and tests that only care about a displayable
    /// score.
    pub fn score(&self) -> Option<u32> {
        match self {
            ResolvedResults::Ready(view) => Some(view.score),
            _ => None,
        }
    }
}
