//! API error type and its HTTP mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use carchain_chain::LedgerError;
use carchain_consensus::{PowError, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("mining aborted: {0}")]
    MiningAborted(PowError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// A request missing required fields or carrying the wrong shape.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::Malformed(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(ValidationError::OwnershipMismatch { .. }) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MiningAborted(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(e) => Self::Validation(e),
            LedgerError::Pow(e @ (PowError::Cancelled { .. } | PowError::DeadlineExceeded { .. })) => {
                Self::MiningAborted(e)
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::malformed(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::malformed("Missing fields: vin"), StatusCode::BAD_REQUEST),
            (
                ValidationError::DuplicateRegistration { vin: "V".into() }.into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ValidationError::UnknownVin { vin: "V".into() }.into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ValidationError::MileageRegression {
                    last: 2.0,
                    attempted: 1.0,
                }
                .into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ValidationError::OwnershipMismatch {
                    expected: None,
                    got: "X".into(),
                }
                .into(),
                StatusCode::FORBIDDEN,
            ),
            (
                LedgerError::Pow(PowError::DeadlineExceeded { attempts: 9 }).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (LedgerError::EmptyChain.into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn test_validation_message_is_transparent() {
        let err: ApiError = ValidationError::UnknownVin { vin: "V1".into() }.into();
        assert_eq!(err.to_string(), "VIN V1 not registered");
    }
}
