//! Application error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Application-wide error type (startup, configuration, storage plumbing)
#[derive(Error, Debug)]
pub enum AppError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure reported by a backing store adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Errors surfaced by a single price query.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("cluster {cluster} unavailable")]
    ClusterUnavailable { cluster: String },

    #[error("{message}")]
    Engine { message: String },

    #[error("failed to serialize query result: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("query timed out after {} ms", .after.as_millis())]
    Timeout { after: Duration },
}

impl ExecutionError {
    pub fn unavailable(cluster: impl Into<String>) -> Self {
        Self::ClusterUnavailable {
            cluster: cluster.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::ClusterUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Engine { .. } | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<StoreError> for ExecutionError {
    fn from(err: StoreError) -> Self {
        Self::Engine {
            message: err.to_string(),
        }
    }
}

/// Serializable error response for API clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&ExecutionError> for ErrorResponse {
    fn from(err: &ExecutionError) -> Self {
        let code = match err {
            ExecutionError::ClusterUnavailable { .. } => "CLUSTER_UNAVAILABLE",
            ExecutionError::Engine { .. } => "ENGINE_ERROR",
            ExecutionError::Serialization(_) => "SERIALIZATION_ERROR",
            ExecutionError::Timeout { .. } => "TIMEOUT",
        };

        ErrorResponse {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ExecutionError {
    fn into_response(self) -> Response {
        let status = self.status();
        let ErrorResponse { code, message } = ErrorResponse::from(&self);
        let body = json!({ "error": message, "code": code });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ExecutionError::unavailable("0").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ExecutionError::Engine { message: "boom".into() }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ExecutionError::Timeout { after: Duration::from_secs(1) }.status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_unavailable_message() {
        let err = ExecutionError::unavailable("7");
        assert_eq!(err.to_string(), "cluster 7 unavailable");

        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, "CLUSTER_UNAVAILABLE");
        assert_eq!(response.message, "cluster 7 unavailable");
    }

    #[test]
    fn test_store_error_becomes_engine_error() {
        let err: ExecutionError = StoreError::Rejected("bad plan".into()).into();
        match err {
            ExecutionError::Engine { message } => assert_eq!(message, "bad plan"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
