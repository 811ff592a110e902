//! Correlation ID for request tracing
//!
//! A correlation id follows one request through every log line it produces.
//! Callers may supply their own through a header; otherwise a random one is
//! generated.

use std::fmt;

/// Longest caller-supplied id accepted verbatim
pub const MAX_CORRELATION_ID_LEN: usize = 128;

/// A correlation ID for request tracing
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Create a new random correlation ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Accept a caller-supplied id if it is usable, or generate a fresh one
    ///
    /// Usable ids are non-empty, at most [`MAX_CORRELATION_ID_LEN`] bytes and
    /// made of visible ASCII characters only.
    pub fn from_header_value(value: &str) -> Self {
        let value = value.trim();
        let usable = !value.is_empty()
            && value.len() <= MAX_CORRELATION_ID_LEN
            && value.bytes().all(|b| b.is_ascii_graphic());

        if usable {
            Self(value.to_string())
        } else {
            Self::new()
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
