//! Request extractors that reject with [`HttpError`]
//!
//! Axum's stock `Json` and `Query` reject with plain text; these wrappers keep
//! malformed input on the JSON `{error, message}` body.

use crate::error::HttpError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(HttpError))]
pub struct JsonBody<T>(pub T);

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(HttpError))]
pub struct QueryParams<T>(pub T);
