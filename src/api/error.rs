//! Error responses of the dashboard endpoints.
//!
//! Every error is returned as
//! ```json
//! {
//!   "error": {
//!     "message": "Area 'Atlantide' not found",
//!     "type": "invalid_request_error",
//!     "code": "unknown_area"
//!   }
//! }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown to users when something unexpected happens.
pub const GENERIC_ERROR_MESSAGE: &str =
    "Si è verificato un errore inatteso. Prova a ricaricare la pagina.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Area '{0}' not found")]
    UnknownArea(String),

    #[error("Invalid moving average window '{value}': expected an integer between {min} and {max}")]
    InvalidWindow { value: String, min: usize, max: usize },

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Envelope of an error response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    pub code: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnknownArea(_)
            | ApiError::InvalidWindow { .. }
            | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::UnknownArea(_) => "unknown_area",
            ApiError::InvalidWindow { .. } => "invalid_window",
            ApiError::InvalidQuery(_) => "invalid_query",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// Response body; internal details are logged, never returned.
    pub fn body(&self) -> ApiErrorResponse {
        let (message, r#type) = match self {
            ApiError::Internal(_) => (GENERIC_ERROR_MESSAGE.to_string(), "server_error"),
            other => (other.to_string(), "invalid_request_error"),
        };
        ApiErrorResponse {
            error: ApiErrorBody {
                message,
                r#type: r#type.to_string(),
                code: self.code().to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Unexpected error");
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_area_body() {
        let err = ApiError::UnknownArea("Atlantide".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(json["error"]["message"], "Area 'Atlantide' not found");
        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["code"], "unknown_area");
    }

    #[test]
    fn test_invalid_window_message() {
        let err = ApiError::InvalidWindow {
            value: "31".to_string(),
            min: 1,
            max: 30,
        };
        assert!(err.to_string().contains("between 1 and 30"));
        assert_eq!(err.body().error.code, "invalid_window");
    }

    #[test]
    fn test_internal_error_hides_details() {
        let err = ApiError::Internal("template missing".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.body();
        assert_eq!(body.error.message, GENERIC_ERROR_MESSAGE);
        assert_eq!(body.error.r#type, "server_error");
    }
}
