use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::error::AppError;

use super::domain::{Question, ResultsHandoff, ResultsKey};
use super::guard::DeferredSaver;
use super::navigator::SubmissionInput;
use super::normalize::parse_answer_ids;
use super::repository::{AssessmentStore, IdentityProvider, ProgressMarker, QuestionSource};
use super::results::{ResolvedResults, ResultsResolver};
use super::risk::classify;
use super::submission::{CompletionRoute, SubmissionConfig, SubmissionCoordinator};

/// Shared collaborators behind the HTTP surface. The deferred saver is held
/// for the state's lifetime so repeated resume calls from the same client
/// hit one guard, mirroring a results view that re-renders.
pub struct AssessmentState<Q, S, I, P> {
    pub questions: Arc<Q>,
    pub store: Arc<S>,
    pub identity: Arc<I>,
    pub progress: Arc<P>,
    pub config: SubmissionConfig,
    pub saver: Mutex<DeferredSaver<S>>,
}

impl<Q, S, I, P> AssessmentState<Q, S, I, P>
where
    S: AssessmentStore,
{
    pub fn new(
        questions: Arc<Q>,
        store: Arc<S>,
        identity: Arc<I>,
        progress: Arc<P>,
        config: SubmissionConfig,
    ) -> Self {
        let saver = Mutex::new(DeferredSaver::new(store.clone()));
        Self {
            questions,
            store,
            identity,
            progress,
            config,
            saver,
        }
    }
}

/// Router builder exposing the assessment engine over HTTP.
pub fn assessment_router<Q, S, I, P>(state: Arc<AssessmentState<Q, S, I, P>>) -> Router
where
    Q: QuestionSource + 'static,
    S: AssessmentStore + 'static,
    I: IdentityProvider + 'static,
    P: ProgressMarker + 'static,
{
    Router::new()
        .route(
            "/api/v1/assessment/questions",
            get(questions_handler::<Q, S, I, P>),
        )
        .route(
            "/api/v1/assessment/submissions",
            post(submit_handler::<Q, S, I, P>),
        )
        .route(
            "/api/v1/assessment/results",
            post(results_handler::<Q, S, I, P>),
        )
        .route(
            "/api/v1/assessment/resume",
            post(resume_handler::<Q, S, I, P>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    /// Untyped on purpose: validated through the scoring boundary.
    pub(crate) answers: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsRequest {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) handoff: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResumeRequest {
    pub(crate) handoff: Value,
}

pub(crate) async fn questions_handler<Q, S, I, P>(
    State(state): State<Arc<AssessmentState<Q, S, I, P>>>,
) -> Result<axum::Json<Vec<Question>>, AppError>
where
    Q: QuestionSource + 'static,
    S: AssessmentStore + 'static,
    I: IdentityProvider + 'static,
    P: ProgressMarker + 'static,
{
    let questions = state.questions.load_questions().await?;
    Ok(axum::Json(questions))
}

pub(crate) async fn submit_handler<Q, S, I, P>(
    State(state): State<Arc<AssessmentState<Q, S, I, P>>>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Result<Response, AppError>
where
    Q: QuestionSource + 'static,
    S: AssessmentStore + 'static,
    I: IdentityProvider + 'static,
    P: ProgressMarker + 'static,
{
    let answers = parse_answer_ids(&request.answers)?;
    let questions = state.questions.load_questions().await?;

    let mut coordinator = SubmissionCoordinator::new(
        state.store.clone(),
        state.identity.clone(),
        state.progress.clone(),
        state.config.clone(),
    );

    let route = coordinator
        .complete(SubmissionInput { answers }, &questions)
        .await;
    Ok(route_response(route))
}

pub(crate) async fn results_handler<Q, S, I, P>(
    State(state): State<Arc<AssessmentState<Q, S, I, P>>>,
    axum::Json(request): axum::Json<ResultsRequest>,
) -> Response
where
    Q: QuestionSource + 'static,
    S: AssessmentStore + 'static,
    I: IdentityProvider + 'static,
    P: ProgressMarker + 'static,
{
    let key = ResultsKey::parse(&request.id);
    let resolver = ResultsResolver::new(state.questions.clone(), state.store.clone());
    let resolved = resolver.resolve(&key, request.handoff.as_ref()).await;

    let payload = match resolved {
        ResolvedResults::Ready(view) => json!({ "status": "ready", "result": view }),
        ResolvedResults::NothingToShow => json!({
            "status": "nothing_to_show",
            "message": "No assessment to display yet. Take the assessment to see your results.",
        }),
        ResolvedResults::Unavailable { message } => json!({
            "status": "unavailable",
            "message": message,
        }),
    };

    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn resume_handler<Q, S, I, P>(
    State(state): State<Arc<AssessmentState<Q, S, I, P>>>,
    axum::Json(request): axum::Json<ResumeRequest>,
) -> Result<Response, AppError>
where
    Q: QuestionSource + 'static,
    S: AssessmentStore + 'static,
    I: IdentityProvider + 'static,
    P: ProgressMarker + 'static,
{
    // Redirect-resume payloads re-run the authenticated submission branch.
    let mut coordinator = SubmissionCoordinator::new(
        state.store.clone(),
        state.identity.clone(),
        state.progress.clone(),
        state.config.clone(),
    );
    let questions = state.questions.load_questions().await?;
    if let Some(route) = coordinator.resume(&request.handoff, &questions).await {
        return Ok(route_response(route));
    }

    // Otherwise this is a guest-origin result awaiting its deferred save.
    if ResultsHandoff::from_value(&request.handoff).is_none() {
        let payload = json!({
            "status": "nothing_to_save",
            "message": "The carried-over assessment state was empty or malformed.",
        });
        return Ok((StatusCode::OK, axum::Json(payload)).into_response());
    }

    let Some(user) = state.identity.current_user().await else {
        let payload = json!({ "status": "awaiting_auth" });
        return Ok((StatusCode::OK, axum::Json(payload)).into_response());
    };

    let outcome = state
        .saver
        .lock()
        .await
        .auto_save(&user, &request.handoff)
        .await;

    let payload = match outcome {
        Some(saved) => json!({
            "status": "saved",
            "id": saved.id,
            "notice": saved.notice,
        }),
        None => json!({ "status": "already_saved" }),
    };
    Ok((StatusCode::OK, axum::Json(payload)).into_response())
}

fn route_response(route: CompletionRoute) -> Response {
    match route {
        CompletionRoute::Results { key, handoff } => {
            let risk = ResultsHandoff::from_value(&handoff)
                .map(|payload| classify(payload.total_score, payload.symptoms.as_deref()));
            let payload = json!({
                "id": key.as_str(),
                "handoff": handoff,
                "risk": risk,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        CompletionRoute::Login { handoff } => {
            let payload = json!({
                "action": "login",
                "handoff": handoff,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
    }
}
