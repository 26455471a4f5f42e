use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::GatewayError;
use crate::pdf::ConversionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// The caller's request is malformed or incomplete.
    #[error("{0}")]
    Validation(String),

    /// Upload went over the configured body limit.
    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    /// Conversion or model failure. The caller can tell neither apart nor fix them.
    #[error("Error analyzing resume: {0}")]
    Processing(String),
}

impl From<ConversionError> for AppError {
    fn from(e: ConversionError) -> Self {
        AppError::Processing(format!("Error processing PDF: {e}"))
    }
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        AppError::Processing(format!("Error generating AI response: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(msg) => {
                tracing::warn!("Rejected request: {msg}");
                StatusCode::BAD_REQUEST
            }
            AppError::PayloadTooLarge { limit } => {
                tracing::warn!("Rejected upload over {limit} bytes");
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::Processing(msg) => {
                tracing::error!("Processing error: {msg}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_passed_through() {
        let e = AppError::Validation("Both job description and resume are required".into());
        assert_eq!(e.to_string(), "Both job description and resume are required");
        assert_eq!(e.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_conversion_error_is_wrapped() {
        let e = AppError::from(ConversionError::Empty);
        assert_eq!(
            e.to_string(),
            "Error analyzing resume: Error processing PDF: No file uploaded"
        );
        assert_eq!(e.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_gateway_error_is_wrapped() {
        let e = AppError::from(GatewayError::EmptyContent);
        assert!(e
            .to_string()
            .starts_with("Error analyzing resume: Error generating AI response:"));
    }

    #[test]
    fn test_payload_too_large() {
        let e = AppError::PayloadTooLarge { limit: 1024 };
        assert_eq!(e.to_string(), "Upload exceeds the 1024 byte limit");
        assert_eq!(e.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
