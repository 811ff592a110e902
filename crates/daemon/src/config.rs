//! Configuration management for the grants daemon
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML or
//! YAML file, then `GRANTS_`-prefixed environment variables using `__` between
//! sections (`GRANTS_SERVER__PORT=9000`).

use crate::{DaemonError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "GRANTS";

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub directory: DirectoryConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; any origin when empty
    pub cors_origins: Vec<String>,
}

/// Permission store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlite:` or `postgres:` URL; the scheme picks the store
    pub url: String,
    pub max_connections: u32,
}

/// Bearer token validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 shared secret; falls back to the `JWT_SECRET` environment variable
    pub secret: Option<String>,
    /// PEM public key of the issuer; when set only RS256 tokens are accepted
    pub rsa_public_key: Option<String>,
    pub issuer: String,
    pub audience: Option<String>,
}

/// External user directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub base_url: String,
    /// Bearer token sent to the directory
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: vec![],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://grants.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            rsa_public_key: None,
            issuer: "grants".to_string(),
            audience: None,
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            token: None,
            timeout_seconds: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "grants=info,tower_http=info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value cannot be parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_environment(path, environment())
    }

    /// Load configuration from file, with environment overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Load configuration with defaults and environment variables
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    fn load_with_environment(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        let url = self.database.url.as_str();
        if !(url.starts_with("sqlite:") || url.starts_with("postgres:") || url.starts_with("postgresql:"))
        {
            return Err(DaemonError::ConfigString(format!(
                "database.url must start with sqlite: or postgres:, got {url}"
            )));
        }
        if self.database.max_connections == 0 {
            return Err(DaemonError::ConfigString(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.directory.base_url.trim().is_empty() {
            return Err(DaemonError::ConfigString(
                "directory.base_url is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env_from(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_with_environment(None, env_from(&[])).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.database.url, "sqlite://grants.db");
        assert_eq!(settings.directory.timeout_seconds, 10);
        assert!(settings.auth.secret.is_none());
        assert!(!settings.logging.json);
    }

    #[test]
    fn test_file_with_partial_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[database]
url = "postgres://localhost/grants"

[auth]
secret = "file-secret"
audience = "grants-api"
"#
        )
        .unwrap();

        let settings = Settings::load_with_environment(Some(file.path()), env_from(&[])).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.database.url, "postgres://localhost/grants");
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.auth.secret.as_deref(), Some("file-secret"));
        assert_eq!(settings.auth.audience.as_deref(), Some("grants-api"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "server:\n  port: 9000\nlogging:\n  level: debug").unwrap();

        let env = env_from(&[
            ("GRANTS_SERVER__PORT", "9100"),
            ("GRANTS_SERVER__CORS_ORIGINS", "http://a.example,http://b.example"),
            ("GRANTS_LOGGING__JSON", "true"),
            ("GRANTS_DIRECTORY__TOKEN", "abc"),
        ]);
        let settings = Settings::load_with_environment(Some(file.path()), env).unwrap();

        assert_eq!(settings.server.port, 9100);
        assert_eq!(
            settings.server.cors_origins,
            vec!["http://a.example", "http://b.example"]
        );
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.logging.json);
        assert_eq!(settings.directory.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_unknown_database_scheme_is_rejected() {
        let env = env_from(&[("GRANTS_DATABASE__URL", "mysql://localhost/grants")]);
        let result = Settings::load_with_environment(None, env);
        assert!(matches!(result, Err(DaemonError::ConfigString(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Settings::load_from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(DaemonError::Config(_))));
    }
}
