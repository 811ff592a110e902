//! Test doubles and reusable suites for permission components

pub mod directory;
pub mod memory;
pub mod store;
