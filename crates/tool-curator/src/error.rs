use crate::analytics::AnalyticsError;
use crate::config::ConfigError;
use crate::discovery::ImportError;
use crate::experiments::ExperimentError;
use crate::publishing::{CatalogError, PublishError};
use crate::storage::StoreError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Import(ImportError),
    Store(StoreError),
    Experiment(ExperimentError),
    Analytics(AnalyticsError),
    Catalog(CatalogError),
    Publish(PublishError),
    Output(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Store(err) => write!(f, "storage error: {}", err),
            AppError::Experiment(err) => write!(f, "experiment error: {}", err),
            AppError::Analytics(err) => write!(f, "analytics error: {}", err),
            AppError::Catalog(err) => write!(f, "catalog error: {}", err),
            AppError::Publish(err) => write!(f, "publishing error: {}", err),
            AppError::Output(err) => write!(f, "output error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Experiment(err) => Some(err),
            AppError::Analytics(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Publish(err) => Some(err),
            AppError::Output(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Import(_)
            | AppError::Experiment(ExperimentError::UnknownVariant { .. })
            | AppError::Analytics(AnalyticsError::InvalidAmount(_)) => StatusCode::BAD_REQUEST,
            AppError::Experiment(
                ExperimentError::UnknownExperiment(_) | ExperimentError::UnknownAssignment(_),
            )
            | AppError::Analytics(AnalyticsError::UnknownPost(_)) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Store(_)
            | AppError::Experiment(ExperimentError::Store(_))
            | AppError::Analytics(AnalyticsError::Store(_))
            | AppError::Catalog(_)
            | AppError::Publish(_)
            | AppError::Output(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ExperimentError> for AppError {
    fn from(value: ExperimentError) -> Self {
        Self::Experiment(value)
    }
}

impl From<AnalyticsError> for AppError {
    fn from(value: AnalyticsError) -> Self {
        Self::Analytics(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<PublishError> for AppError {
    fn from(value: PublishError) -> Self {
        Self::Publish(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}
