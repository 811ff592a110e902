//! JWT service for bearer token validation

use crate::error::HttpError;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Token audience, which issuers send either as one string or as a list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Space-separated OAuth scopes
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scope: String,
    /// Permission list some issuers send instead of, or next to, `scope`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Every scope granted by the token, from both `scope` and `permissions`
    pub fn scopes(&self) -> Vec<String> {
        let mut scopes: Vec<String> = self.scope.split_whitespace().map(str::to_string).collect();
        for permission in &self.permissions {
            if !scopes.contains(permission) {
                scopes.push(permission.clone());
            }
        }
        scopes
    }
}

/// JWT service configuration
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Expected token issuer
    pub issuer: String,
    /// Expected audience; unchecked when absent
    pub audience: Option<String>,
    /// Lifetime of tokens issued by [`JwtService::generate_token`]
    pub expiration: Duration,
}

impl JwtConfig {
    pub fn new(secret: String, issuer: String, audience: Option<String>) -> Self {
        Self {
            secret,
            issuer,
            audience,
            expiration: Duration::hours(1),
        }
    }

    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }
}

/// JWT service for token operations
///
/// Validates HS256 tokens against the shared secret unless an issuer RSA
/// public key is installed, in which case only RS256 tokens are accepted.
pub struct JwtService {
    config: Arc<JwtConfig>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config: Arc::new(config),
            encoding_key,
            decoding_key,
            algorithm: Algorithm::HS256,
        }
    }

    /// Validate RS256 tokens signed by the issuer's key instead of the secret
    pub fn with_rsa_public_key(mut self, pem: &str) -> Result<Self, HttpError> {
        self.decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            HttpError::InternalServerError(format!("Invalid RSA public key: {e}"))
        })?;
        self.algorithm = Algorithm::RS256;
        Ok(self)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Issue a token for a user with the given scopes
    ///
    /// The service only consumes tokens in production; this is used for local
    /// development and tests. Tokens are always HS256 with the shared secret.
    pub fn generate_token(&self, user_id: &str, scopes: &[&str]) -> Result<String, HttpError> {
        let now = Utc::now();
        let expiration = now + self.config.expiration;

        let claims = Claims {
            sub: user_id.to_string(),
            scope: scopes.join(" "),
            permissions: Vec::new(),
            aud: self.config.audience.clone().map(Audience::One),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| HttpError::InternalServerError(format!("Failed to generate token: {e}")))
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, HttpError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(std::slice::from_ref(&self.config.issuer));
        match &self.config.audience {
            Some(audience) => validation.set_audience(std::slice::from_ref(audience)),
            None => validation.validate_aud = false,
        }

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    HttpError::AuthenticationFailed("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    HttpError::AuthenticationFailed("Invalid token".to_string())
                }
                _ => HttpError::AuthenticationFailed(format!("Token validation failed: {e}")),
            })
    }

    /// Extract token from Authorization header
    pub fn extract_bearer_token<'a>(&self, auth_header: &'a str) -> Result<&'a str, HttpError> {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            Ok(token)
        } else {
            Err(HttpError::AuthenticationFailed(
                "Invalid authorization header format".to_string(),
            ))
        }
    }
}
