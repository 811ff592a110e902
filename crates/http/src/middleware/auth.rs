use crate::error::HttpError;
use crate::services::JwtService;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{Method, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Scope needed for read-only snippet routes
pub const READ_SCOPE: &str = "read:snippets";
/// Scope needed for routes that change grants
pub const WRITE_SCOPE: &str = "write:snippets";

/// Caller identity established by [`auth_middleware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Token subject, used as the acting user id
    pub id: String,
    pub scopes: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| HttpError::AuthenticationFailed("User not authenticated".to_string()))
    }
}

/// Trait for authentication providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticate a request and return identity if successful
    async fn authenticate(&self, parts: &Parts) -> Result<AuthenticatedUser, HttpError>;

    /// Check if authentication should be skipped for a given path
    fn should_skip_auth(&self, path: &str) -> bool {
        path == "/ping" || path == "/health" || path.starts_with("/v3/api-docs")
    }
}

/// Bearer JWT authentication
pub struct JwtAuthProvider {
    jwt_service: Arc<JwtService>,
}

impl JwtAuthProvider {
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self { jwt_service }
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn authenticate(&self, parts: &Parts) -> Result<AuthenticatedUser, HttpError> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                HttpError::AuthenticationFailed("Missing authorization header".to_string())
            })?;

        let token = self.jwt_service.extract_bearer_token(auth_header)?;
        let claims = self.jwt_service.validate_token(token)?;

        Ok(AuthenticatedUser {
            scopes: claims.scopes(),
            id: claims.sub,
        })
    }
}

/// Scope a request needs, decided by its method
pub fn required_scope(method: &Method) -> &'static str {
    if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
        READ_SCOPE
    } else {
        WRITE_SCOPE
    }
}

/// Middleware function for authentication and scope checks
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let auth = app_state.auth.clone();

    if auth.should_skip_auth(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();

    let user = auth.authenticate(&parts).await.inspect_err(|e| {
        debug!("Rejected request: {}", e);
    })?;

    let scope = required_scope(&parts.method);
    if !user.has_scope(scope) {
        warn!(user_id = %user.id, scope, "Missing required scope");
        return Err(HttpError::AuthorizationFailed(format!(
            "Missing required scope {scope}"
        )));
    }

    parts.extensions.insert(user);
    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::JwtConfig;
    use axum::http::Request as HttpRequest;

    fn provider() -> (JwtAuthProvider, Arc<JwtService>) {
        let jwt = Arc::new(JwtService::new(JwtConfig::new(
            "secret".to_string(),
            "issuer".to_string(),
            None,
        )));
        (JwtAuthProvider::new(jwt.clone()), jwt)
    }

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/snippets");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_authenticate_reads_subject_and_scopes() {
        let (provider, jwt) = provider();
        let token = jwt.generate_token("user-7", &[READ_SCOPE]).unwrap();

        let user = provider
            .authenticate(&parts_with_header(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(user.id, "user-7");
        assert!(user.has_scope(READ_SCOPE));
        assert!(!user.has_scope(WRITE_SCOPE));
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header() {
        let (provider, _) = provider();

        assert!(matches!(
            provider.authenticate(&parts_with_header(None)).await,
            Err(HttpError::AuthenticationFailed(_))
        ));
        assert!(matches!(
            provider
                .authenticate(&parts_with_header(Some("Bearer not-a-jwt")))
                .await,
            Err(HttpError::AuthenticationFailed(_))
        ));
    }

    #[test]
    fn test_required_scope_by_method() {
        assert_eq!(required_scope(&Method::GET), READ_SCOPE);
        assert_eq!(required_scope(&Method::POST), WRITE_SCOPE);
        assert_eq!(required_scope(&Method::DELETE), WRITE_SCOPE);
    }

    #[test]
    fn test_public_paths() {
        let (provider, _) = provider();
        assert!(provider.should_skip_auth("/ping"));
        assert!(provider.should_skip_auth("/health"));
        assert!(provider.should_skip_auth("/v3/api-docs"));
        assert!(!provider.should_skip_auth("/snippets"));
    }
}
