use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::error::LedgerError;

/// Every rejected request is answered with this shape:
/// `{"error": {"kind": "...", "message": "..."}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing values: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Please supply a valid list of nodes: {0}")]
    InvalidPeers(String),
    #[error("Operation cancelled, node is shutting down")]
    Cancelled,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingFields(_) => "missing_fields",
            ApiError::InvalidBody(_) => "invalid_body",
            ApiError::InvalidPeers(_) => "invalid_peers",
            ApiError::Cancelled => "cancelled",
            ApiError::Internal(_) => "internal",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    kind: &'a str,
    message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_) | ApiError::InvalidBody(_) | ApiError::InvalidPeers(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                message: self.to_string(),
            },
        })
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Cancelled => ApiError::Cancelled,
            LedgerError::InvalidPeerAddress(_) => ApiError::InvalidPeers(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
