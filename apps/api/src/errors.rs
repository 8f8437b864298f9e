use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::error::{AnalysisError, Stage};
use crate::llm_client::GatewayError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Status, code and client-facing message for a pipeline failure.
fn analysis_response(err: &AnalysisError) -> (StatusCode, &'static str, String) {
    match err {
        AnalysisError::EmptyDocument => {
            (StatusCode::BAD_REQUEST, "EMPTY_DOCUMENT", err.to_string())
        }
        AnalysisError::UnsupportedDocument(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_DOCUMENT",
            err.to_string(),
        ),
        AnalysisError::Extraction(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "EXTRACTION_ERROR",
            err.to_string(),
        ),
        AnalysisError::Gateway(GatewayError::QuotaExhausted(_)) => {
            tracing::warn!("Model quota exhausted: {err}");
            (
                StatusCode::TOO_MANY_REQUESTS,
                "GATEWAY_QUOTA_EXHAUSTED",
                "The AI model quota is exhausted. Please try again later.".to_string(),
            )
        }
        AnalysisError::Gateway(e) => {
            tracing::error!("Model gateway error: {e}");
            (
                StatusCode::BAD_GATEWAY,
                "GATEWAY_ERROR",
                "The AI model could not complete the analysis".to_string(),
            )
        }
        AnalysisError::ResponseFormat { reason, .. } => {
            tracing::error!("Unusable model response: {reason}");
            (
                StatusCode::BAD_GATEWAY,
                "RESPONSE_FORMAT_ERROR",
                "The AI model returned an analysis that could not be read".to_string(),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut stage: Option<Stage> = None;
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::Analysis(e) => {
                stage = Some(e.stage());
                analysis_response(e)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(stage) = stage {
            error["stage"] = json!(stage.as_str());
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
