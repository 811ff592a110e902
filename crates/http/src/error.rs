//! HTTP error types and implementations
//!
//! These cover transport-level failures only. Permission outcomes, including
//! 404 and 409, travel in the [`grants_core::Response`] envelope instead.

#[cfg(feature = "server")]
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP-specific errors
#[derive(Error, Debug)]
pub enum HttpError {
    /// Missing, malformed or expired credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Valid credentials without the required scope
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(feature = "server")]
impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            HttpError::AuthorizationFailed(_) => StatusCode::FORBIDDEN,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(feature = "server")]
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let error_type = match &self {
            HttpError::AuthenticationFailed(_) => "authentication_failed",
            HttpError::AuthorizationFailed(_) => "authorization_failed",
            HttpError::BadRequest(_) => "bad_request",
            HttpError::InternalServerError(_) => "internal_server_error",
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

#[cfg(feature = "server")]
impl From<axum::extract::rejection::JsonRejection> for HttpError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        HttpError::BadRequest(rejection.body_text())
    }
}

#[cfg(feature = "server")]
impl From<axum::extract::rejection::QueryRejection> for HttpError {
    fn from(rejection: axum::extract::rejection::QueryRejection) -> Self {
        HttpError::BadRequest(rejection.body_text())
    }
}

/// Result type alias using HttpError
pub type Result<T> = std::result::Result<T, HttpError>;
