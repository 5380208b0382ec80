//! API error types and responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tallarin_license::LicenseError;
use tallarin_revocation::RevocationError;
use thiserror::Error;
use tracing::error;

/// Errors returned by API handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request was missing data or carried invalid values.
    #[error("{0}")]
    BadRequest(String),

    /// The server failed to complete a valid request.
    #[error("{0}")]
    Internal(String),
}

/// Body of every error response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(msg) => {
                error!(error = %msg, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<LicenseError> for ApiError {
    fn from(err: LicenseError) -> Self {
        match err {
            LicenseError::MissingField(_) | LicenseError::InvalidField { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<RevocationError> for ApiError {
    fn from(err: RevocationError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<tallarin_types::Error> for ApiError {
    fn from(err: tallarin_types::Error) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
