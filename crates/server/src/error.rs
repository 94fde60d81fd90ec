use std::error::Error as _;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mmrag::{ErrorKind, PipelineError, ProviderError, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Document {0} not found")]
    DocumentNotFound(i64),

    #[error("Not found")]
    NotFound,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Failure class of the wrapped library error, if there is one.
    fn kind(&self) -> Option<ErrorKind> {
        match self {
            ServerError::Pipeline(err) => Some(err.kind()),
            ServerError::Provider(err) => Some(err.into()),
            ServerError::Store(err) => Some(err.into()),
            _ => None,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        if let Some(kind) = self.kind() {
            return match kind {
                ErrorKind::EmptyInput | ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorKind::Configuration | ErrorKind::Upstream => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            };
        }
        match self {
            ServerError::BadRequest(_) | ServerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::DocumentNotFound(_) | ServerError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        if let Some(kind) = self.kind() {
            return match kind {
                ErrorKind::EmptyInput => "EMPTY_INPUT",
                ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
                ErrorKind::Configuration => "CONFIG_ERROR",
                ErrorKind::Upstream => "UPSTREAM_ERROR",
                ErrorKind::Timeout => "TIMEOUT",
            };
        }
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ServerError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ServerError::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            ServerError::NotFound => "NOT_FOUND",
            ServerError::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Message sent to the client. Server-side failures get a fixed text so
    /// model-server bodies and driver errors stay in the logs.
    pub fn public_message(&self) -> String {
        let status = self.status_code();
        if !status.is_server_error() {
            return self.to_string();
        }
        match status {
            StatusCode::GATEWAY_TIMEOUT => "The request did not complete in time".to_string(),
            _ => match self.error_code() {
                "UPSTREAM_ERROR" => "An upstream service failed while processing the request",
                "CONFIG_ERROR" => "The server is not configured correctly",
                _ => "An internal error occurred",
            }
            .to_string(),
        }
    }

    /// Messages of the wrapped errors, outermost first. Each wrapper's own
    /// message omits its source, so no text repeats.
    fn cause_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut cause = self.source();
        while let Some(err) = cause {
            chain.push(err.to_string());
            cause = err.source();
        }
        if chain.is_empty() {
            chain.push(self.to_string());
        }
        chain
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.public_message();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                code = error_code,
                causes = ?self.cause_chain(),
                "request failed"
            );
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(rejection.body_text())
        } else {
            ServerError::BadRequest(rejection.body_text())
        }
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the API error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);

/// `Path` extractor whose rejections use the API error body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct ApiPath<T>(pub T);
