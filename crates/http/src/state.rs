//! Application state management

use crate::middleware::{AuthProvider, JwtAuthProvider};
use crate::services::JwtService;
use grants_core::PermissionService;
use std::sync::Arc;

/// Shared application state
///
/// Cloned into every handler and middleware; all members are cheap handles.
#[derive(Clone)]
pub struct AppState {
    /// Permission rules over the configured store and user directory
    pub service: PermissionService,
    /// Authenticates callers of the protected routes
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    /// Create state authenticating callers with bearer JWTs
    pub fn new(service: PermissionService, jwt_service: Arc<JwtService>) -> Self {
        Self::with_auth_provider(service, Arc::new(JwtAuthProvider::new(jwt_service)))
    }

    pub fn with_auth_provider(service: PermissionService, auth: Arc<dyn AuthProvider>) -> Self {
        Self { service, auth }
    }
}
