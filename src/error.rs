use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// An authentication error (bad credentials, rejected login).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Request carries no valid session.
    #[error("Unauthorized")]
    Unauthorized,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A multipart error.
    #[error("Multipart error: {0}")]
    Multipart(String),

    /// The upstream API answered with a non-success status. The status and
    /// payload are relayed to the caller untouched.
    #[error("Upstream returned {status}")]
    Upstream {
        status: StatusCode,
        payload: Option<sonic_rs::Value>,
    },

    /// The upstream API answered 2xx but the payload did not match the
    /// schema this service depends on.
    #[error("Upstream contract violation: {0}")]
    UpstreamContract(String),

    /// The upstream API could not be reached at all.
    #[error("Upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Authentication(ref msg) => {
                tracing::warn!("Authentication failed: {}", msg);
                (StatusCode::UNAUTHORIZED, error_body(msg))
            }

            AppError::Unauthorized => {
                tracing::warn!("Rejected request without valid session");
                (StatusCode::UNAUTHORIZED, error_body("Unauthorized"))
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, error_body(msg))
            }

            AppError::Multipart(ref msg) => {
                tracing::error!("Multipart error: {}", msg);
                (StatusCode::BAD_REQUEST, error_body(msg))
            }

            AppError::Upstream { status, ref payload } => {
                tracing::warn!("Upstream answered {}", status);
                let body = payload
                    .as_ref()
                    .and_then(|v| sonic_rs::to_string(v).ok())
                    .unwrap_or_else(|| error_body("Upstream request failed"));
                (status, body)
            }

            AppError::UpstreamContract(ref msg) => {
                tracing::error!("Upstream contract violation: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    error_body("Unexpected response from upstream service"),
                )
            }

            AppError::Transport(ref e) => {
                tracing::error!("Upstream unreachable: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("Failed to reach upstream service"),
                )
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("Internal server error"),
                )
            }
        };

        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

fn error_body(message: &str) -> String {
    sonic_rs::to_string(&sonic_rs::json!({ "error": message }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string())
}
