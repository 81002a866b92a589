//! Idempotent persistence of a guest-completed assessment after login.
//!
//! The auto-save path runs inside reactive recomputation that can fire
//! several times for one logical login event. The guard keeps the create
//! call to at most one per (guest result, newly authenticated identity)
//! pair: the lock and the last-processed marker are both set before the
//! asynchronous create is awaited, which closes the window where a second
//! recomputation could slip in while the first call is in flight.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::domain::{AssessmentDraft, AssessmentId, ResultsHandoff, UserId};
use super::repository::AssessmentStore;
use super::risk::derive_symptom_label;

/// Re-entrancy guard for the deferred save. Exactly two fields and two
/// operations; constructed once per results-view lifetime, never shared
/// globally.
#[derive(Debug, Default)]
pub struct SaveGuard {
    in_flight: bool,
    last_identity: Option<UserId>,
}

impl SaveGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts entry for an identity. Refuses while a save is in flight or
    /// when this identity was already processed. On success the lock is
    /// held and the identity marked, both before any await point.
    pub fn try_acquire(&mut self, identity: &UserId) -> bool {
        if self.in_flight || self.last_identity.as_ref() == Some(identity) {
            return false;
        }
        self.in_flight = true;
        self.last_identity = Some(identity.clone());
        true
    }

    /// Rolls the guard back after a failed save so a later recomputation
    /// (e.g. a user refresh) can retry.
    pub fn release(&mut self) {
        self.in_flight = false;
        self.last_identity = None;
    }

    /// Drops the lock once the create resolved successfully. The marker
    /// stays: the at-most-once contract is per (result, identity) pair, so
    /// the same identity remains blocked while a different one may save.
    pub(crate) fn finish(&mut self) {
        self.in_flight = false;
    }
}

/// Outcome of a successful deferred save: the caller silently replaces the
/// guest sentinel in the addressed results view with the new identifier and
/// shows the notice once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: AssessmentId,
    pub notice: &'static str,
}

/// Runs the deferred save for a guest-origin result once an identity
/// appears.
pub struct DeferredSaver<S> {
    guard: SaveGuard,
    store: Arc<S>,
}

impl<S> DeferredSaver<S>
where
    S: AssessmentStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            guard: SaveGuard::new(),
            store,
        }
    }

    /// Attempts the save. `None` means nothing happened: the payload had no
    /// guest-origin numeric score, the guard refused entry, or the create
    /// failed (logged, guard rolled back for retry).
    pub async fn auto_save(&mut self, identity: &UserId, handoff: &Value) -> Option<SaveOutcome> {
        let payload = ResultsHandoff::from_value(handoff)?;
        if !self.guard.try_acquire(identity) {
            return None;
        }

        let score = payload.total_score;
        let symptoms = payload
            .symptoms
            .unwrap_or_else(|| derive_symptom_label(score).label().to_string());

        let draft = AssessmentDraft {
            user_id: identity.clone(),
            answers: payload.answers,
            score,
            symptoms,
        };

        match self.store.create(draft).await {
            Ok(record) => {
                self.guard.finish();
                Some(SaveOutcome {
                    id: record.id,
                    notice: "Your assessment has been saved to your profile",
                })
            }
            Err(error) => {
                warn!(%error, "deferred assessment save failed, will retry on next recomputation");
                self.guard.release();
                None
            }
        }
    }
}
