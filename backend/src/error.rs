//! HTTP facing error type.
//!
//! Workflow errors (`IngestError`, `DeleteError`, `StoreError`) are converted
//! here into a status code and a plain text message the frontend shows as a
//! toast.

use crate::ingest::{DeleteError, IngestError};
use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::csv::CsvFormatError;
use common::gate::GateError;
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// A store or storage call failed.
    #[error("{0}")]
    Upstream(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(format!("Error: {}", self))
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        error!("Store call failed: {}", e);
        ApiError::Upstream(e.to_string())
    }
}

impl From<CsvFormatError> for ApiError {
    fn from(e: CsvFormatError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<GateError> for ApiError {
    fn from(e: GateError) -> Self {
        match e {
            GateError::UploadInFlight => ApiError::Conflict(e.to_string()),
            _ => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<actix_multipart::MultipartError> for ApiError {
    fn from(e: actix_multipart::MultipartError) -> Self {
        ApiError::BadRequest(format!("Invalid upload: {}", e))
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::NotAuthenticated => ApiError::Unauthorized(e.to_string()),
            IngestError::InvalidInput(_) | IngestError::NumericAnomalies(_) => {
                ApiError::BadRequest(e.to_string())
            }
            IngestError::Gate(gate) => gate.into(),
            IngestError::Step { .. } => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<DeleteError> for ApiError {
    fn from(e: DeleteError) -> Self {
        match e {
            DeleteError::NotFound(_) => ApiError::NotFound(e.to_string()),
            DeleteError::Lookup(_) | DeleteError::ChildRows(_) | DeleteError::ParentRow(_) => {
                ApiError::Upstream(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_errors_map_to_client_errors() {
        let in_flight: ApiError = GateError::UploadInFlight.into();
        assert_eq!(in_flight.status_code(), StatusCode::CONFLICT);

        let unverified: ApiError = GateError::NotVerified.into();
        assert_eq!(unverified.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_headers_are_a_bad_request() {
        let err: ApiError = CsvFormatError::MissingHeaders(vec!["Exam ID".to_string()]).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("Exam ID"));
    }
}
