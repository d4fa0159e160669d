use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tool_curator::curation::{curation_router, CurationService};
use tool_curator::experiments::ExperimentLedger;
use tool_curator::storage::RecordStore;

pub(crate) fn with_curation_routes<E>(service: Arc<CurationService<E>>) -> axum::Router
where
    E: RecordStore<ExperimentLedger> + 'static,
{
    curation_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tool_curator::curation::{CurationConfig, CurationSettings};
    use tool_curator::storage::MemoryStore;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let config = CurationConfig::try_from(CurationSettings::default()).expect("valid defaults");
        let store = Arc::new(MemoryStore::<ExperimentLedger>::default());
        let service = Arc::new(CurationService::from_config(config, store));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_curation_routes(service).layer(Extension(state))
    }

    async fn status_of(router: axum::Router, uri: &str) -> StatusCode {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        router.oneshot(request).await.expect("response").status()
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        assert_eq!(status_of(app(false), "/ready").await, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(app(true), "/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn health_and_curation_routes_are_mounted() {
        assert_eq!(status_of(app(true), "/health").await, StatusCode::OK);
        assert_eq!(status_of(app(true), "/api/v1/curation/programs").await, StatusCode::OK);
        assert_eq!(
            status_of(app(true), "/api/v1/experiments/missing").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn metrics_are_served_as_prometheus_text() {
        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .expect("request");
        let response = app(true).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).expect("content type"),
            "text/plain; version=0.0.4"
        );
    }
}
