//! Grants HTTP module providing the permission API and the user directory client
//!
//! The server side exposes [`grants_core::PermissionService`] over an axum
//! router with OpenAPI documentation, JWT bearer auth and correlation ids.
//! The client side talks to the external user directory.

#[macro_use]
extern crate tracing;

pub mod error;

#[cfg(feature = "server")]
pub mod extract;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod response;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod state;

#[cfg(feature = "client")]
pub mod client;

pub use error::{HttpError, Result};

#[cfg(feature = "server")]
pub use response::ApiResponse;
#[cfg(feature = "server")]
pub use routes::build_router;
#[cfg(feature = "server")]
pub use state::AppState;

#[cfg(feature = "client")]
pub use client::HttpUserDirectory;

// Re-export commonly used types
#[cfg(feature = "server")]
pub use axum::{Json, response as axum_response};
#[cfg(feature = "server")]
pub use utoipa::OpenApi;
