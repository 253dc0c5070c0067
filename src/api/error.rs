use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;
use tracing::{error, warn};

use crate::api::validation::ErrorResponse;
use crate::db::StoreError;

/// Service-level errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input violated a field or cross-field constraint
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Job with id {0} not found")]
    JobNotFound(i32),

    #[error("Worker with id {0} not found")]
    WorkerNotFound(i32),

    /// The store failed; details are logged, never returned
    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::JobMissing(id) => ServiceError::JobNotFound(id),
            StoreError::WorkerMissing(id) => ServiceError::WorkerNotFound(id),
            other => ServiceError::Storage(other),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::JobNotFound(_) | ServiceError::WorkerNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ServiceError::Storage(e) => {
                error!("Storage error: {}", e);
                ErrorResponse {
                    error: "Failed to process request".to_string(),
                    fields: serde_json::json!({"message": "Database error occurred"}),
                }
            }
            ServiceError::Validation(msg) => {
                warn!("Validation error: {}", msg);
                ErrorResponse {
                    error: "Validation failed".to_string(),
                    fields: serde_json::json!({"message": msg}),
                }
            }
            ServiceError::JobNotFound(_) | ServiceError::WorkerNotFound(_) => {
                warn!("{}", self);
                ErrorResponse {
                    error: "Not found".to_string(),
                    fields: serde_json::json!({"message": self.to_string()}),
                }
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
