//! Submission coordination at quiz completion.
//!
//! The coordinator decides, once the navigator yields a completed answer
//! set, whether to persist immediately (a user is present) or to defer the
//! save through the login redirect (guest), carrying the answers across the
//! redirect as an opaque continuation payload.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use super::domain::{
    AnswerId, AssessmentDraft, Question, ResultsHandoff, ResultsKey, ResumeHandoff, UserId,
};
use super::navigator::SubmissionInput;
use super::repository::{AssessmentStore, IdentityProvider, ProgressMarker};
use super::risk::derive_symptom_label;
use super::scoring::score_answers;

/// Fixed duration of the celebratory terminal animation shown after a
/// successful completion. A UX contract, not a network wait.
pub const CELEBRATION_DELAY: Duration = Duration::from_secs(3);

/// Coordinator tunables; tests run with a zero celebration delay.
#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    pub celebration_delay: Duration,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            celebration_delay: CELEBRATION_DELAY,
        }
    }
}

impl SubmissionConfig {
    pub fn immediate() -> Self {
        Self {
            celebration_delay: Duration::ZERO,
        }
    }
}

/// Coordinator state machine. The guest path detours through
/// `AwaitingAuth`/`Resumed` around the login redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Submitting,
    AwaitingAuth,
    Resumed,
    Completed,
}

/// Where the flow goes next, with the opaque payload for the navigation
/// channel.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionRoute {
    /// Navigate to the results view addressed by `key`.
    Results { key: ResultsKey, handoff: Value },
    /// Navigate to the login view, carrying the resume payload.
    Login { handoff: Value },
}

/// Drives one quiz attempt from completed answers to a routed results view.
/// Constructed per attempt; the phase is not reusable across attempts.
pub struct SubmissionCoordinator<S, I, P> {
    store: Arc<S>,
    identity: Arc<I>,
    progress: Arc<P>,
    config: SubmissionConfig,
    phase: SubmissionPhase,
}

impl<S, I, P> SubmissionCoordinator<S, I, P>
where
    S: AssessmentStore,
    I: IdentityProvider,
    P: ProgressMarker,
{
    pub fn new(store: Arc<S>, identity: Arc<I>, progress: Arc<P>, config: SubmissionConfig) -> Self {
        Self {
            store,
            identity,
            progress,
            config,
            phase: SubmissionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Handles completion of the final quiz step.
    ///
    /// With a user present the assessment is created and the flow routes to
    /// its results view; without one the flow routes to login with the
    /// answers attached, and nothing is persisted.
    pub async fn complete(
        &mut self,
        input: SubmissionInput,
        questions: &[Question],
    ) -> CompletionRoute {
        let answers = input.answers;

        let Some(user) = self.identity.current_user().await else {
            self.phase = SubmissionPhase::AwaitingAuth;
            return CompletionRoute::Login {
                handoff: ResumeHandoff::new(answers).to_value(),
            };
        };

        self.phase = SubmissionPhase::Submitting;
        self.submit(user, answers, questions).await
    }

    /// Handles the return from the login redirect.
    ///
    /// The payload is untyped channel data and is validated here; `None`
    /// means it was not a resume payload and the caller should fall back to
    /// a fresh quiz. With a user now present this proceeds exactly like an
    /// authenticated completion. If login did not produce a user, the
    /// result is still shown from a guest-addressed results view.
    pub async fn resume(
        &mut self,
        handoff: &Value,
        questions: &[Question],
    ) -> Option<CompletionRoute> {
        let payload = ResumeHandoff::from_value(handoff)?;
        self.phase = SubmissionPhase::Resumed;
        let answers = payload.assessment_answers;

        let Some(user) = self.identity.current_user().await else {
            let score = score_answers(&answers, questions);
            let symptoms = derive_symptom_label(score).label().to_string();
            self.settle().await;
            return Some(CompletionRoute::Results {
                key: ResultsKey::Guest,
                handoff: ResultsHandoff {
                    answers,
                    total_score: score,
                    symptoms: Some(symptoms),
                }
                .to_value(),
            });
        };

        self.phase = SubmissionPhase::Submitting;
        Some(self.submit(user, answers, questions).await)
    }

    async fn submit(
        &mut self,
        user: UserId,
        answers: Vec<AnswerId>,
        questions: &[Question],
    ) -> CompletionRoute {
        let score = score_answers(&answers, questions);
        let symptoms = derive_symptom_label(score).label().to_string();

        let draft = AssessmentDraft {
            user_id: user,
            answers: answers.clone(),
            score,
            symptoms: symptoms.clone(),
        };

        // A failed save is logged and swallowed; the user still sees their
        // result behind the guest sentinel.
        let key = match self.store.create(draft).await {
            Ok(record) => ResultsKey::Assessment(record.id),
            Err(error) => {
                warn!(%error, "assessment save failed, continuing with guest results");
                ResultsKey::Guest
            }
        };

        self.settle().await;
        CompletionRoute::Results {
            key,
            handoff: ResultsHandoff {
                answers,
                total_score: score,
                symptoms: Some(symptoms),
            }
            .to_value(),
        }
    }

    async fn settle(&mut self) {
        self.progress.clear();
        if !self.config.celebration_delay.is_zero() {
            tokio::time::sleep(self.config.celebration_delay).await;
        }
        self.phase = SubmissionPhase::Completed;
    }
}
