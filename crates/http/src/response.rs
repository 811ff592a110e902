//! Delivery of permission envelopes over HTTP

use axum::{
    Json,
    response::{IntoResponse, Response as AxumResponse},
};
use grants_core::Response;
use serde::Serialize;

/// Wraps a [`Response`] so that the HTTP status mirrors the envelope's code
#[derive(Debug)]
pub struct ApiResponse<T>(pub Response<T>);

impl<T> From<Response<T>> for ApiResponse<T> {
    fn from(response: Response<T>) -> Self {
        Self(response)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> AxumResponse {
        let status = self.0.status();
        (status, Json(self.0)).into_response()
    }
}
