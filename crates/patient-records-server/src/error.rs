//! API errors mapped to HTTP responses.
//!
//! Every error response has the body `{"detail": "<message>"}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use patient_records_core::ServiceError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("{0}")]
    Internal(String),

    /// Request rejected by an extractor, which picked the status.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },
}

impl ApiError {
    pub fn internal() -> Self {
        Self::Internal("Internal Server Error".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected { status, .. } => *status,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Conflict(msg) => ApiError::BadRequest(msg),
            ServiceError::InvalidArgument(msg) => ApiError::BadRequest(msg),
            ServiceError::Validation(e) => ApiError::UnprocessableEntity(e.to_string()),
            ServiceError::Storage(e) => {
                error!(error = %e, "storage failure");
                ApiError::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

/// Missing or malformed query parameters are a validation failure, like a
/// body that does not match its schema.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::UnprocessableEntity(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        if status.is_client_error() {
            warn!(status = status.as_u16(), %detail, "request rejected");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patient_records_core::{StoreError, ValidationError};

    #[test]
    fn test_service_error_status_mapping() {
        let cases = [
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (
                ServiceError::Validation(ValidationError::AgeOutOfRange(0)),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::Storage(StoreError::LockPoisoned("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_storage_detail_is_generic() {
        let err = ApiError::from(ServiceError::Storage(StoreError::Corrupt {
            id: "P001".into(),
            reason: "secret path".into(),
        }));
        assert_eq!(err.to_string(), "Internal Server Error");
    }
}
