//! Correlation ID middleware for request tracing
//!
//! Every request runs inside an `http_request` span tagged with a correlation
//! id taken from `x-correlation-id` or freshly generated. The id is echoed on
//! the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use grants_core::tracing::CorrelationId;
use tracing::Instrument;

/// Header name for the correlation ID
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Extract or generate correlation ID from request headers
pub fn extract_correlation_id(headers: &HeaderMap) -> CorrelationId {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(CorrelationId::from_header_value)
        .unwrap_or_default()
}

/// Middleware to handle correlation IDs
pub async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = extract_correlation_id(request.headers());

    // Available to handlers and inner middleware
    request.extensions_mut().insert(correlation_id.clone());

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %correlation_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;

    if let Ok(header_value) = HeaderValue::from_str(correlation_id.as_str()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(CORRELATION_ID_HEADER), header_value);
    }

    response
}

/// Extension trait for extracting correlation ID from request
pub trait CorrelationIdExt {
    /// Get the correlation ID from request extensions
    fn correlation_id(&self) -> Option<&CorrelationId>;
}

impl CorrelationIdExt for Request {
    fn correlation_id(&self) -> Option<&CorrelationId> {
        self.extensions().get::<CorrelationId>()
    }
}
