//! Assessment scoring and results resolution engine.
//!
//! Everything here sits behind the collaborator traits in [`repository`]:
//! the quiz state machine, scoring, risk classification, submission
//! coordination across the login redirect, the idempotent deferred save, and
//! results resolution.

pub mod catalog;
pub mod domain;
pub mod guard;
pub mod navigator;
pub(crate) mod normalize;
pub mod remote;
pub mod repository;
pub mod results;
pub mod risk;
pub mod router;
pub mod scoring;
pub mod submission;

#[cfg(test)]
mod tests;

pub use domain::{
    Answer, AnswerId, AssessmentDraft, AssessmentId, AssessmentRecord, Question, QuestionId,
    QuizSelection, ResultsHandoff, ResultsKey, ResumeHandoff, UserId, GUEST_RESULTS_KEY,
};
pub use guard::{DeferredSaver, SaveGuard, SaveOutcome};
pub use navigator::{AdvanceOutcome, NavigatorPhase, Progress, StepNavigator, SubmissionInput};
pub use repository::{
    AssessmentStore, FetchError, IdentityProvider, ProgressMarker, QuestionSource,
};
pub use results::{ResolvedResults, ResultsResolver, ResultsSource, ResultsView};
pub use risk::{classify, derive_symptom_label, ActionPlan, RiskCategory, RiskProfile};
pub use router::{assessment_router, AssessmentState};
pub use scoring::{score_answers, score_raw, ValidationError};
pub use submission::{
    CompletionRoute, SubmissionConfig, SubmissionCoordinator, SubmissionPhase, CELEBRATION_DELAY,
};
