//! REST+JSON adapters for the remote collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::config::CollaboratorConfig;

use super::catalog::{canonicalize_catalog, RawQuestion};
use super::domain::{AssessmentDraft, AssessmentId, AssessmentRecord, Question, UserId};
use super::repository::{AssessmentStore, FetchError, QuestionSource};

/// Content service adapter for the question catalog.
#[derive(Debug, Clone)]
pub struct RestQuestionSource {
    client: reqwest::Client,
    base_url: String,
}

impl RestQuestionSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &CollaboratorConfig) -> Self {
        Self::new(reqwest::Client::new(), config.content_base_url.clone())
    }
}

#[async_trait]
impl QuestionSource for RestQuestionSource {
    async fn load_questions(&self) -> Result<Vec<Question>, FetchError> {
        let url = format!("{}/questions", self.base_url);
        let body = get_json(&self.client, &url).await?;
        let raw: Vec<RawQuestion> = serde_json::from_value(unwrap_list(body))
            .map_err(|err| FetchError::Payload(err.to_string()))?;
        Ok(canonicalize_catalog(raw))
    }
}

/// Assessment service adapter.
#[derive(Debug, Clone)]
pub struct RestAssessmentStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestAssessmentStore {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &CollaboratorConfig) -> Self {
        Self::new(reqwest::Client::new(), config.assessment_base_url.clone())
    }
}

#[async_trait]
impl AssessmentStore for RestAssessmentStore {
    async fn create(&self, draft: AssessmentDraft) -> Result<AssessmentRecord, FetchError> {
        let url = format!("{}/assessments", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "userId": &draft.user_id,
                "answers": &draft.answers,
                "score": draft.score,
                "symptoms": &draft.symptoms,
            }))
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let body = decode_success(response).await?;
        let id = created_id(&body)
            .ok_or_else(|| FetchError::Payload("created record carries no id".to_string()))?;

        Ok(AssessmentRecord {
            id,
            user_id: Some(draft.user_id),
            answers: draft.answers,
            score: Some(draft.score),
            symptoms: Some(draft.symptoms),
            created_at: created_timestamp(&body).unwrap_or_else(Utc::now),
        })
    }

    async fn fetch(&self, id: &AssessmentId) -> Result<Option<Value>, FetchError> {
        let url = format!("{}/assessments/{}", self.base_url, id.0);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        decode_success(response).await.map(Some)
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Value>, FetchError> {
        let url = format!("{}/assessments?user={}", self.base_url, user.0);
        let body = get_json(&self.client, &url).await?;
        match unwrap_list(body) {
            Value::Array(items) => Ok(items),
            other => Err(FetchError::Payload(format!(
                "expected a record list, got {other}"
            ))),
        }
    }
}

async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| FetchError::Transport(err.to_string()))?;
    decode_success(response).await
}

async fn decode_success(response: reqwest::Response) -> Result<Value, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Transport(format!(
            "collaborator responded with {status}"
        )));
    }
    response
        .json::<Value>()
        .await
        .map_err(|err| FetchError::Payload(err.to_string()))
}

/// Some backend revisions wrap list responses in a `data` envelope.
fn unwrap_list(body: Value) -> Value {
    match body {
        Value::Object(mut object) => match object.remove("data") {
            Some(inner @ Value::Array(_)) => inner,
            Some(other) => other,
            None => Value::Object(object),
        },
        other => other,
    }
}

fn created_id(body: &Value) -> Option<AssessmentId> {
    ["id", "_id"]
        .iter()
        .find_map(|key| body.get(*key))
        .and_then(Value::as_str)
        .map(|id| AssessmentId(id.to_string()))
}

fn created_timestamp(body: &Value) -> Option<DateTime<Utc>> {
    ["createdAt", "created_at"]
        .iter()
        .find_map(|key| body.get(*key))
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
