//! RPC error types and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use idv_notify::NotifyError;
use idv_verification::{VerificationError, WebhookError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Missing headers")]
    MissingHeaders,

    #[error("Invalid action")]
    InvalidAction,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing required fields")]
    MissingFields,

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Webhook(#[from] WebhookError),

    #[error("{0} not configured")]
    Configuration(String),

    #[error("{0}")]
    Upstream(String),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingHeaders | Self::InvalidAction | Self::InvalidBody(_) | Self::MissingFields => {
                StatusCode::BAD_REQUEST
            }
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Webhook(WebhookError::Signature | WebhookError::Replay) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Webhook(WebhookError::Configuration(_))
            | Self::Configuration(_)
            | Self::Upstream(_)
            | Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VerificationError> for RpcError {
    fn from(e: VerificationError) -> Self {
        match e {
            VerificationError::Configuration(what) => RpcError::Configuration(what),
            VerificationError::MissingFields => RpcError::MissingFields,
            other => RpcError::Upstream(other.to_string()),
        }
    }
}

impl From<NotifyError> for RpcError {
    fn from(e: NotifyError) -> Self {
        match e {
            NotifyError::MissingFields => RpcError::MissingFields,
            NotifyError::Configuration(what) => RpcError::Configuration(what),
            other => RpcError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status() {
        assert_eq!(RpcError::MissingHeaders.status(), StatusCode::BAD_REQUEST);
        assert_eq!(RpcError::InvalidAction.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RpcError::Webhook(WebhookError::Signature).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RpcError::Webhook(WebhookError::Replay).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RpcError::Webhook(WebhookError::Configuration("didit".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RpcError::from(VerificationError::Configuration("Didit API key".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RpcError::from(NotifyError::MissingFields).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
