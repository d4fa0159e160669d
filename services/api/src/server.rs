use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_curation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tool_curator::config::AppConfig;
use tool_curator::curation::CurationService;
use tool_curator::error::AppError;
use tool_curator::experiments::ExperimentLedger;
use tool_curator::storage::JsonFileStore;
use tool_curator::telemetry::{self, LogSink};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, LogSink::Stdout)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let curation = config.curation.load()?;
    let ledger = Arc::new(JsonFileStore::<ExperimentLedger>::new(
        config.curation.ledger_path("experiments"),
    ));
    let curation_service = Arc::new(CurationService::from_config(curation, ledger));

    let app = with_curation_routes(curation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tool curator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
