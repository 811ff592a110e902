//! Middleware components for HTTP request processing

pub mod auth;
pub mod correlation;

pub use auth::{
    AuthProvider, AuthenticatedUser, JwtAuthProvider, READ_SCOPE, WRITE_SCOPE, auth_middleware,
};
pub use correlation::{
    CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_middleware, extract_correlation_id,
};
