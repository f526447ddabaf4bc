use crate::atlas::{NavigationError, QueryError, UnknownLevel};
use crate::config::ConfigError;
use crate::sources::SourceError;
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
    Level(UnknownLevel),
    Navigation(NavigationError),
    Source(SourceError),
    Query(QueryError),
    Csv(csv::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Level(err) => write!(f, "invalid request: {}", err),
            AppError::Navigation(err) => write!(f, "navigation error: {}", err),
            AppError::Source(err) => write!(f, "data source error: {}", err),
            AppError::Query(err) => write!(f, "query error: {}", err),
            AppError::Csv(err) => write!(f, "export error: {}", err),
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
            AppError::Level(err) => Some(err),
            AppError::Navigation(err) => Some(err),
            AppError::Source(err) => Some(err),
            AppError::Query(err) => Some(err),
            AppError::Csv(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Level(_)
            | AppError::Navigation(_)
            | AppError::Source(SourceError::IncompleteScope(_))
            | AppError::Query(QueryError::Source(SourceError::IncompleteScope(_))) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Query(QueryError::Stale { .. }) => StatusCode::CONFLICT,
            AppError::Source(_) | AppError::Query(QueryError::Source(_)) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
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

impl From<UnknownLevel> for AppError {
    fn from(value: UnknownLevel) -> Self {
        Self::Level(value)
    }
}

impl From<NavigationError> for AppError {
    fn from(value: NavigationError) -> Self {
        Self::Navigation(value)
    }
}

impl From<SourceError> for AppError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<QueryError> for AppError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}
