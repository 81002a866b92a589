use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Value};

use crate::assessment::domain::{
    Answer, AnswerId, AssessmentDraft, AssessmentId, AssessmentRecord, Question, QuestionId, UserId,
};
use crate::assessment::repository::{
    AssessmentStore, FetchError, IdentityProvider, ProgressMarker, QuestionSource,
};
use crate::assessment::router::AssessmentState;
use crate::assessment::submission::SubmissionConfig;

pub(super) fn answer(id: &str, weight: u32) -> Answer {
    Answer {
        id: AnswerId(id.to_string()),
        label: format!("answer {id}"),
        weight,
    }
}

pub(super) fn question(id: &str, prompt: &str, answers: Vec<Answer>) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        prompt: prompt.to_string(),
        answers,
    }
}

/// Two questions with answer weights {30, 70} and {20, 80}.
pub(super) fn fixture_catalog() -> Vec<Question> {
    vec![
        question(
            "q1",
            "How long does it usually take you to fall asleep?",
            vec![answer("q1-a", 30), answer("q1-b", 70)],
        ),
        question(
            "q2",
            "How often do you wake during the night?",
            vec![answer("q2-a", 20), answer("q2-b", 80)],
        ),
    ]
}

pub(super) fn ids(raw: &[&str]) -> Vec<AnswerId> {
    raw.iter().map(|id| AnswerId(id.to_string())).collect()
}

pub(super) fn user(id: &str) -> UserId {
    UserId(id.to_string())
}

/// In-memory assessment service double with call counters and a failure
/// switch.
#[derive(Default)]
pub(super) struct MemoryStore {
    records: Mutex<Vec<AssessmentRecord>>,
    sequence: AtomicU64,
    create_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub(super) fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub(super) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub(super) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(super) fn records(&self) -> Vec<AssessmentRecord> {
        self.records.lock().expect("store mutex poisoned").clone()
    }

    pub(super) fn seed(&self, record: AssessmentRecord) {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(record);
    }
}

pub(super) fn record_value(record: &AssessmentRecord) -> Value {
    json!({
        "id": record.id,
        "userId": record.user_id,
        "answers": record.answers,
        "score": record.score,
        "symptoms": record.symptoms,
        "createdAt": record.created_at.to_rfc3339(),
    })
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn create(&self, draft: AssessmentDraft) -> Result<AssessmentRecord, FetchError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Transport("assessment service offline".to_string()));
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let record = AssessmentRecord {
            id: AssessmentId(format!("asmt-{sequence:06}")),
            user_id: Some(draft.user_id),
            answers: draft.answers,
            score: Some(draft.score),
            symptoms: Some(draft.symptoms),
            created_at: Utc::now(),
        };
        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &AssessmentId) -> Result<Option<Value>, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Transport("assessment service offline".to_string()));
        }
        let records = self.records.lock().expect("store mutex poisoned");
        Ok(records
            .iter()
            .find(|record| record.id == *id)
            .map(record_value))
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Value>, FetchError> {
        let records = self.records.lock().expect("store mutex poisoned");
        Ok(records
            .iter()
            .filter(|record| record.user_id.as_ref() == Some(user))
            .map(record_value)
            .collect())
    }
}

/// Fixed question catalog double.
pub(super) struct StaticQuestions {
    catalog: Vec<Question>,
    load_calls: AtomicUsize,
    failing: AtomicBool,
}

impl StaticQuestions {
    pub(super) fn new(catalog: Vec<Question>) -> Self {
        Self {
            catalog,
            load_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub(super) fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub(super) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl QuestionSource for StaticQuestions {
    async fn load_questions(&self) -> Result<Vec<Question>, FetchError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Transport("content service offline".to_string()));
        }
        Ok(self.catalog.clone())
    }
}

/// Identity double whose session can be flipped mid-test, standing in for
/// the login redirect.
#[derive(Default)]
pub(super) struct SwitchIdentity {
    current: Mutex<Option<UserId>>,
}

impl SwitchIdentity {
    pub(super) fn guest() -> Self {
        Self::default()
    }

    pub(super) fn signed_in(user: UserId) -> Self {
        Self {
            current: Mutex::new(Some(user)),
        }
    }

    pub(super) fn sign_in(&self, user: UserId) {
        *self.current.lock().expect("identity mutex poisoned") = Some(user);
    }
}

#[async_trait]
impl IdentityProvider for SwitchIdentity {
    async fn current_user(&self) -> Option<UserId> {
        self.current.lock().expect("identity mutex poisoned").clone()
    }
}

/// Progress marker double backed by one flag.
#[derive(Default)]
pub(super) struct FlagMarker {
    set: AtomicBool,
}

impl ProgressMarker for FlagMarker {
    fn set(&self) {
        self.set.store(true, Ordering::SeqCst);
    }

    fn clear(&self) {
        self.set.store(false, Ordering::SeqCst);
    }

    fn is_set(&self) -> bool {
        self.set.load(Ordering::SeqCst)
    }
}

pub(super) fn test_state(
    catalog: Vec<Question>,
    identity: SwitchIdentity,
) -> (
    Arc<AssessmentState<StaticQuestions, MemoryStore, SwitchIdentity, FlagMarker>>,
    Arc<MemoryStore>,
) {
    let store = Arc::new(MemoryStore::default());
    let state = Arc::new(AssessmentState::new(
        Arc::new(StaticQuestions::new(catalog)),
        store.clone(),
        Arc::new(identity),
        Arc::new(FlagMarker::default()),
        SubmissionConfig::immediate(),
    ));
    (state, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
