//! Grants daemon: configuration and server assembly for the snippet
//! permission service

pub mod config;
pub mod error;
pub mod server;

pub use crate::config::Settings;
pub use error::{DaemonError, Result};
pub use server::ServerBuilder;
