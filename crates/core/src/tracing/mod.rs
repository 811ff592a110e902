//! Shared tracing functionality for the grants service
//!
//! Correlation ids are always available; subscriber setup lives behind the
//! `tracing-init` feature so library users can bring their own.

pub mod correlation;

#[cfg(feature = "tracing-init")]
pub mod config;
#[cfg(feature = "tracing-init")]
pub mod init;

// Re-export commonly used types
pub use correlation::CorrelationId;
