//! Error types for the pdfdesk API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdfdesk_core::PipelineError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ApiError::Pipeline(e) => match e {
                PipelineError::Validation(_)
                | PipelineError::Transform(_)
                | PipelineError::UnreadableInput { .. } => {
                    (StatusCode::BAD_REQUEST, e.to_string(), None)
                }
                PipelineError::Encode(_) | PipelineError::Storage(_) => {
                    tracing::error!("pipeline failure: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to process PDF".to_string(),
                        Some(e.to_string()),
                    )
                }
            },
            ApiError::Internal(e) => {
                tracing::error!("internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({ "error": error });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}
