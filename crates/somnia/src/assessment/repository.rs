use async_trait::async_trait;
use serde_json::Value;

use super::domain::{AssessmentDraft, AssessmentId, AssessmentRecord, Question, UserId};

/// Failure on any remote collaborator call. Logged and degraded, never
/// surfaced raw to a user-facing path. Persistence conflicts are not
/// distinguished from transport failures, matching the upstream service.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("collaborator request failed: {0}")]
    Transport(String),
    #[error("collaborator returned a malformed payload: {0}")]
    Payload(String),
}

/// Content collaborator publishing the ordered question catalog.
///
/// An empty catalog is a valid "no assessment available" terminal state for
/// callers, not an error.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn load_questions(&self) -> Result<Vec<Question>, FetchError>;
}

/// Assessment service owning persisted records once created. This core never
/// edits or deletes a record.
///
/// Fetch results are returned as raw JSON because the record shape varies by
/// backend revision; callers normalize through
/// [`super::normalize::normalize_record`].
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn create(&self, draft: AssessmentDraft) -> Result<AssessmentRecord, FetchError>;
    async fn fetch(&self, id: &AssessmentId) -> Result<Option<Value>, FetchError>;
    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Value>, FetchError>;
}

/// Identity collaborator. The login redirect itself lives outside this core;
/// all the engine needs is whether a user is currently present.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Option<UserId>;
}

/// Durable "assessment in progress" marker read by the profile dashboard to
/// recommend resuming. This core sets it on the first recorded answer and
/// clears it when a submission completes; the dashboard owns the rest of its
/// lifecycle.
pub trait ProgressMarker: Send + Sync {
    fn set(&self);
    fn clear(&self);
    fn is_set(&self) -> bool;
}
