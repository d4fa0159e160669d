use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::config::CurationConfig;
use super::domain::EngagementMetrics;
use super::formatting::DeliveryChannel;
use super::pipeline::CurationPipeline;
use super::report::BatchReport;
use crate::experiments::{ExperimentError, ExperimentLedger, ExperimentTracker};
use crate::storage::RecordStore;

/// Body accepted by the decisions endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub tools: Vec<Value>,
    #[serde(default)]
    pub experiment: Option<String>,
}

/// Links a formatted decision to the experiment assignment awaiting its results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRef {
    pub position: usize,
    pub label: String,
    pub variant: String,
    pub assignment_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResponse {
    #[serde(flatten)]
    pub report: BatchReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment: Option<String>,
    #[serde(default)]
    pub assignments: Vec<AssignmentRef>,
}

/// Pipeline plus the experiment tracker that feeds it variant selectors.
pub struct CurationService<E> {
    pipeline: CurationPipeline,
    experiments: ExperimentTracker<E>,
}

impl<E> CurationService<E>
where
    E: RecordStore<ExperimentLedger>,
{
    pub fn new(pipeline: CurationPipeline, experiments: ExperimentTracker<E>) -> Self {
        Self {
            pipeline,
            experiments,
        }
    }

    pub fn from_config(config: CurationConfig, store: Arc<E>) -> Self {
        let experiments = ExperimentTracker::from_config(store, &config);
        Self::new(CurationPipeline::new(config), experiments)
    }

    pub fn pipeline(&self) -> &CurationPipeline {
        &self.pipeline
    }

    pub fn experiments(&self) -> &ExperimentTracker<E> {
        &self.experiments
    }

    /// Runs a raw batch. On the social channel every formatted decision is
    /// registered as an assignment of the requested (or default) experiment.
    pub fn curate<R: Rng + ?Sized>(
        &self,
        request: DecisionRequest,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<DecisionResponse, ExperimentError> {
        if self.pipeline.config().promotion().channel != DeliveryChannel::Social {
            let report = self
                .pipeline
                .process_raw(request.tools, &self.pipeline.selector(), rng);
            return Ok(DecisionResponse {
                report,
                experiment: None,
                assignments: Vec::new(),
            });
        }

        let name = request
            .experiment
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.experiments.default_experiment().to_string());
        let selector = self.experiments.selector(&name, now)?;
        let report = self.pipeline.process_raw(request.tools, &selector, rng);

        let mut assignments = Vec::new();
        for record in report.publishable() {
            let Some(variant) = record.variant.as_deref() else {
                continue;
            };
            let assignment_id = self.experiments.assign(&name, &record.label, variant, now)?;
            assignments.push(AssignmentRef {
                position: record.position,
                label: record.label.clone(),
                variant: variant.to_string(),
                assignment_id,
            });
        }
        debug!(
            experiment = %name,
            records = report.records.len(),
            assignments = assignments.len(),
            "batch curated"
        );

        Ok(DecisionResponse {
            report,
            experiment: Some(name),
            assignments,
        })
    }
}

/// Router builder exposing decision, program, and experiment endpoints.
pub fn curation_router<E>(service: Arc<CurationService<E>>) -> Router
where
    E: RecordStore<ExperimentLedger> + 'static,
{
    Router::new()
        .route("/api/v1/curation/decisions", post(decisions_handler::<E>))
        .route("/api/v1/curation/programs", get(programs_handler::<E>))
        .route("/api/v1/experiments/:name", get(experiment_handler::<E>))
        .route(
            "/api/v1/experiments/assignments/:assignment_id/results",
            post(result_handler::<E>),
        )
        .with_state(service)
}

/// Runs ledger work off the async runtime, since stores may touch the filesystem.
async fn run_blocking<E, T, F>(service: Arc<CurationService<E>>, work: F) -> Response
where
    E: RecordStore<ExperimentLedger> + 'static,
    T: Serialize + Send + 'static,
    F: FnOnce(&CurationService<E>) -> Result<T, ExperimentError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || work(&service)).await {
        Ok(Ok(body)) => (StatusCode::OK, axum::Json(body)).into_response(),
        Ok(Err(error)) => experiment_error_response(error),
        Err(error) => {
            let payload = json!({
                "error": format!("curation task failed: {error}"),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn decisions_handler<E>(
    State(service): State<Arc<CurationService<E>>>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    E: RecordStore<ExperimentLedger> + 'static,
{
    run_blocking(service, move |service| {
        let mut rng = ChaCha8Rng::from_entropy();
        service.curate(request, &mut rng, Utc::now())
    })
    .await
}

pub(crate) async fn programs_handler<E>(
    State(service): State<Arc<CurationService<E>>>,
) -> Response
where
    E: RecordStore<ExperimentLedger> + 'static,
{
    let programs = service.pipeline().config().programs();
    (StatusCode::OK, axum::Json(programs)).into_response()
}

pub(crate) async fn experiment_handler<E>(
    State(service): State<Arc<CurationService<E>>>,
    Path(name): Path<String>,
) -> Response
where
    E: RecordStore<ExperimentLedger> + 'static,
{
    run_blocking(service, move |service| service.experiments().status(&name)).await
}

pub(crate) async fn result_handler<E>(
    State(service): State<Arc<CurationService<E>>>,
    Path(assignment_id): Path<String>,
    axum::Json(metrics): axum::Json<EngagementMetrics>,
) -> Response
where
    E: RecordStore<ExperimentLedger> + 'static,
{
    run_blocking(service, move |service| {
        service
            .experiments()
            .record_result(&assignment_id, metrics, Utc::now())
    })
    .await
}

fn experiment_error_response(error: ExperimentError) -> Response {
    let status = match &error {
        ExperimentError::UnknownExperiment(_) | ExperimentError::UnknownAssignment(_) => {
            StatusCode::NOT_FOUND
        }
        ExperimentError::UnknownVariant { .. } => StatusCode::BAD_REQUEST,
        ExperimentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
