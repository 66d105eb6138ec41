//! HTTP response types and error mapping

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::errors::AppError;
use crate::proxy::RenderedDocument;

/// JSON envelope used for health and error bodies
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// HTTP status for an application error
pub fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Source(_) | AppError::ResolutionFailure { .. } => StatusCode::BAD_GATEWAY,
        AppError::StreamUnavailable { .. } | AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Configuration { .. } | AppError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let message = match &self {
            AppError::Source(_) | AppError::ResolutionFailure { .. } => {
                warn!(error = %self, "Upstream request failed");
                "Upstream service unavailable".to_string()
            }
            AppError::StreamUnavailable { route } => format!("No stream available for {route}"),
            AppError::NotFound { resource, id } => format!("{resource} '{id}' not found"),
            AppError::Configuration { .. } | AppError::Internal { .. } => {
                error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

impl IntoResponse for RenderedDocument {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}
