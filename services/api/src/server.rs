use crate::cli::ServeArgs;
use crate::infra::{AppState, ProgressFlag, SessionIdentity};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use somnia::assessment::remote::{RestAssessmentStore, RestQuestionSource};
use somnia::assessment::{AssessmentState, SubmissionConfig};
use somnia::config::AppConfig;
use somnia::error::AppError;
use somnia::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let questions = Arc::new(RestQuestionSource::from_config(&config.collaborators));
    let store = Arc::new(RestAssessmentStore::from_config(&config.collaborators));
    let identity = Arc::new(SessionIdentity::from_env());
    let progress = Arc::new(ProgressFlag::default());

    let assessment_state = Arc::new(AssessmentState::new(
        questions,
        store,
        identity,
        progress,
        SubmissionConfig::default(),
    ));

    let app = with_assessment_routes(assessment_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "sleep assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
