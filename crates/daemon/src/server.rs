//! Server setup and configuration module

use crate::config::Settings;
use crate::{DaemonError, Result};
use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use grants_core::{PermissionService, PermissionStore, UserDirectory};
use grants_http::{
    AppState, HttpUserDirectory,
    middleware::correlation::CORRELATION_ID_HEADER,
    services::{JwtConfig, JwtService},
};
use grants_sqlx::{PostgresStore, SqliteStore};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Server configuration builder
pub struct ServerBuilder {
    settings: Settings,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Open the permission store named by `database.url`
    pub async fn build_store(&self) -> Result<Arc<dyn PermissionStore>> {
        let url = self.settings.database.url.as_str();
        let max_connections = self.settings.database.max_connections;

        if url.starts_with("sqlite:") {
            info!("Using SQLite permission store");
            Ok(Arc::new(SqliteStore::new(url, max_connections).await?))
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            info!("Using PostgreSQL permission store");
            Ok(Arc::new(PostgresStore::new(url, max_connections).await?))
        } else {
            Err(DaemonError::ConfigString(format!(
                "Unsupported database url: {url}"
            )))
        }
    }

    /// Build the user directory client
    pub fn build_directory(&self) -> Result<Arc<dyn UserDirectory>> {
        let config = &self.settings.directory;
        let mut builder = HttpUserDirectory::builder()
            .base_url(&config.base_url)
            .timeout(Duration::from_secs(config.timeout_seconds));
        if let Some(token) = &config.token {
            builder = builder.token(token);
        }
        Ok(Arc::new(builder.build()?))
    }

    /// Build the JWT service
    ///
    /// With `auth.rsa_public_key` set, tokens are verified against the issuer
    /// key and the shared secret becomes optional.
    pub fn build_jwt_service(&self) -> Result<Arc<JwtService>> {
        let auth = &self.settings.auth;
        let secret = auth
            .secret
            .clone()
            .or_else(|| std::env::var("JWT_SECRET").ok())
            .filter(|secret| !secret.is_empty());

        let secret = match (secret, &auth.rsa_public_key) {
            (Some(secret), _) => secret,
            (None, Some(_)) => String::new(),
            (None, None) => {
                return Err(DaemonError::ConfigString(
                    "auth.secret (or JWT_SECRET) or auth.rsa_public_key must be set".to_string(),
                ));
            }
        };

        let service = JwtService::new(JwtConfig::new(
            secret,
            auth.issuer.clone(),
            auth.audience.clone(),
        ));
        let service = match &auth.rsa_public_key {
            Some(pem) => {
                info!("Validating RS256 tokens with the configured issuer key");
                service
                    .with_rsa_public_key(pem)
                    .map_err(|e| DaemonError::ConfigString(e.to_string()))?
            }
            None => service,
        };
        Ok(Arc::new(service))
    }

    /// Wire store, directory and authentication into the shared state
    pub async fn build_app_state(&self) -> Result<AppState> {
        let jwt_service = self.build_jwt_service()?;
        let store = self.build_store().await?;
        let directory = self.build_directory()?;
        Ok(AppState::new(
            PermissionService::new(store, directory),
            jwt_service,
        ))
    }

    /// Build the complete router with CORS and request tracing
    pub fn build_axum_router(&self, state: AppState) -> Router {
        grants_http::build_router(state)
            .layer(self.cors_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Build state and router in one step
    pub async fn build(&self) -> Result<Router> {
        let state = self.build_app_state().await?;
        Ok(self.build_axum_router(state))
    }

    fn cors_layer(&self) -> CorsLayer {
        let correlation_header = HeaderName::from_static(CORRELATION_ID_HEADER);
        let layer = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                correlation_header.clone(),
            ])
            .expose_headers([correlation_header]);

        let origins = &self.settings.server.cors_origins;
        if origins.is_empty() {
            return layer.allow_origin(Any);
        }

        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Serve the router on `listener` until `shutdown` resolves
pub async fn serve<F>(router: Router, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Grants server listening on {}", addr);
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "sqlite::memory:".to_string();
        settings.auth.secret = Some("test-secret".to_string());
        settings
    }

    #[test]
    fn test_jwt_service_uses_configured_issuer() {
        let builder = ServerBuilder::new(settings());
        let jwt = builder.build_jwt_service().unwrap();
        let token = jwt.generate_token("user-1", &["read:snippets"]).unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.iss, "grants");
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn test_invalid_issuer_key_is_a_config_error() {
        let mut settings = settings();
        settings.auth.rsa_public_key = Some("not a pem".to_string());
        let result = ServerBuilder::new(settings).build_jwt_service();
        assert!(matches!(result, Err(DaemonError::ConfigString(ref msg)) if msg.contains("RSA")));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_rejected() {
        let mut settings = settings();
        settings.database.url = "mysql://localhost/grants".to_string();
        let result = ServerBuilder::new(settings).build_store().await;
        assert!(matches!(result, Err(DaemonError::ConfigString(_))));
    }

    #[tokio::test]
    async fn test_builds_sqlite_state() {
        let builder = ServerBuilder::new(settings());
        let state = builder.build_app_state().await.unwrap();
        let access = state.service.has_access("snippet", "user").await;
        assert!(
            matches!(access, grants_core::Response::Failure(ref e) if e.is_not_found()),
            "Fresh store holds no grants"
        );
    }
}
