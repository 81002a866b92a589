use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use somnia::assessment::{
    Answer, AnswerId, AssessmentDraft, AssessmentId, AssessmentRecord, AssessmentStore,
    FetchError, IdentityProvider, ProgressMarker, Question, QuestionId, QuestionSource, UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory assessment service used by the CLI demo and the route tests.
#[derive(Default)]
pub(crate) struct InMemoryAssessmentStore {
    records: Mutex<HashMap<AssessmentId, AssessmentRecord>>,
    sequence: AtomicU64,
    create_calls: AtomicU64,
}

impl InMemoryAssessmentStore {
    pub(crate) fn create_calls(&self) -> u64 {
        self.create_calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl AssessmentStore for InMemoryAssessmentStore {
    async fn create(&self, draft: AssessmentDraft) -> Result<AssessmentRecord, FetchError> {
        self.create_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let sequence = self
            .sequence
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            + 1;
        let record = AssessmentRecord {
            id: AssessmentId(format!("asmt-{sequence:06}")),
            user_id: Some(draft.user_id),
            answers: draft.answers,
            score: Some(draft.score),
            symptoms: Some(draft.symptoms),
            created_at: chrono::Utc::now(),
        };
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &AssessmentId) -> Result<Option<Value>, FetchError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).map(|record| {
            json!({
                "id": record.id,
                "userId": record.user_id,
                "answers": record.answers,
                "score": record.score,
                "symptoms": record.symptoms,
                "createdAt": record.created_at.to_rfc3339(),
            })
        }))
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Value>, FetchError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.user_id.as_ref() == Some(user))
            .map(|record| json!({ "id": record.id, "score": record.score }))
            .collect())
    }
}

/// Fixed catalog standing in for the content service during demos and tests.
pub(crate) struct StaticQuestionSource {
    catalog: Vec<Question>,
}

impl StaticQuestionSource {
    pub(crate) fn new(catalog: Vec<Question>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    async fn load_questions(&self) -> Result<Vec<Question>, FetchError> {
        Ok(self.catalog.clone())
    }
}

/// Process-level session whose user can be flipped, standing in for the
/// redirect-based identity collaborator.
#[derive(Default)]
pub(crate) struct SessionIdentity {
    current: Mutex<Option<UserId>>,
}

impl SessionIdentity {
    /// Reads an out-of-band session from `SOMNIA_USER_ID`; absent means the
    /// process serves guest flows.
    pub(crate) fn from_env() -> Self {
        let current = std::env::var("SOMNIA_USER_ID")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(UserId);
        Self {
            current: Mutex::new(current),
        }
    }

    pub(crate) fn sign_in(&self, user: UserId) {
        *self.current.lock().expect("session mutex poisoned") = Some(user);
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    async fn current_user(&self) -> Option<UserId> {
        self.current.lock().expect("session mutex poisoned").clone()
    }
}

/// Durable "assessment in progress" flag, process-local here; the product
/// shell persists the same convention in client storage.
#[derive(Default)]
pub(crate) struct ProgressFlag {
    set: AtomicBool,
}

impl ProgressMarker for ProgressFlag {
    fn set(&self) {
        self.set.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    fn clear(&self) {
        self.set.store(false, std::sync::atomic::Ordering::SeqCst);
    }

    fn is_set(&self) -> bool {
        self.set.load(std::sync::atomic::Ordering::SeqCst)
    }
}

fn answer(id: &str, label: &str, weight: u32) -> Answer {
    Answer {
        id: AnswerId(id.to_string()),
        label: label.to_string(),
        weight,
    }
}

/// Demo catalog mirroring the shape the content service publishes.
pub(crate) fn demo_catalog() -> Vec<Question> {
    vec![
        Question {
            id: QuestionId("sleep-latency".to_string()),
            prompt: "How long does it usually take you to fall asleep?".to_string(),
            answers: vec![
                answer("latency-short", "Under 15 minutes", 0),
                answer("latency-medium", "15 to 45 minutes", 15),
                answer("latency-long", "Over 45 minutes", 30),
            ],
        },
        Question {
            id: QuestionId("night-waking".to_string()),
            prompt: "How often do you wake up during the night?".to_string(),
            answers: vec![
                answer("waking-rare", "Rarely or never", 0),
                answer("waking-sometimes", "One or two times", 20),
                answer("waking-often", "Three times or more", 35),
            ],
        },
        Question {
            id: QuestionId("daytime-energy".to_string()),
            prompt: "How tired do you feel during the day?".to_string(),
            answers: vec![
                answer("energy-fine", "Mostly alert", 0),
                answer("energy-low", "Tired after lunch", 10),
                answer("energy-drained", "Exhausted most days", 25),
            ],
        },
        Question {
            id: QuestionId("snoring".to_string()),
            prompt: "Has anyone noticed you snoring or gasping at night?".to_string(),
            answers: vec![
                answer("snoring-no", "No", 0),
                answer("snoring-sometimes", "Occasionally", 5),
                answer("snoring-loud", "Loudly, most nights", 20),
            ],
        },
    ]
}
