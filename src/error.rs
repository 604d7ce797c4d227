use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, ApiError>;

/// Terminal failures of the webhook pipeline.
///
/// Every variant maps to exactly one status code and one plain-text body,
/// which is the contract the payment provider's retry logic depends on.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Missing signature header")]
    MissingSignature,

    #[error("Signature does not match request body")]
    InvalidSignature,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("Webhook payload has no meta.event_name")]
    MissingEventName,

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Failed to read request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    /// Get status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingSignature | ApiError::InvalidSignature => StatusCode::UNAUTHORIZED,
            ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidJson(_) | ApiError::MissingEventName | ApiError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Body sent back to the caller. Internal detail never leaks here.
    pub fn response_body(&self) -> &'static str {
        match self {
            ApiError::MethodNotAllowed(_) => "Method not allowed",
            ApiError::MissingSignature => "Missing signature",
            ApiError::InvalidSignature => "Invalid signature",
            ApiError::Configuration(_) => "Server configuration error",
            ApiError::InvalidJson(_) => "Invalid JSON",
            ApiError::MissingEventName => "Missing event name",
            ApiError::PayloadTooLarge(_) => "Payload too large",
            ApiError::InvalidBody(_) => "Invalid request body",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::MethodNotAllowed(_) => "method_not_allowed",
            ApiError::MissingSignature | ApiError::InvalidSignature => "unauthenticated",
            ApiError::Configuration(_) => "configuration_error",
            ApiError::InvalidJson(_) | ApiError::MissingEventName | ApiError::InvalidBody(_) => {
                "bad_request"
            }
            ApiError::PayloadTooLarge(_) => "payload_too_large",
        }
    }

    /// Log error with appropriate level
    fn log_error(&self) {
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    error_type = self.error_type(),
                    error = %self,
                    "Webhook rejected with server error"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    error_type = self.error_type(),
                    error = %self,
                    "Webhook rejected with client error"
                );
            }
            _ => {}
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_error();

        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.response_body(),
        )
            .into_response()
    }
}
