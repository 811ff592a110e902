//! User directory client
//!
//! [`HttpUserDirectory`] resolves users through the external user service:
//! `GET {base_url}/users` for the full list and `GET {base_url}/users/{id}`
//! for a single user.

pub mod error;

use async_trait::async_trait;
use error::ClientError;
use grants_core::{DirectoryUser, UserDirectory};
use reqwest::{Client, ClientBuilder, header};
use std::time::Duration;

/// User directory reached over HTTP
#[derive(Clone)]
pub struct HttpUserDirectory {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpUserDirectory {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> HttpUserDirectoryBuilder {
        HttpUserDirectoryBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a request builder with authentication
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        request
    }

    /// Execute a request and handle common errors
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    /// Fetch a single user by id
    pub async fn get_user(&self, user_id: &str) -> Result<DirectoryUser, ClientError> {
        let request = self.request(reqwest::Method::GET, &format!("/users/{user_id}"));
        self.execute(request).await
    }

    /// Fetch every user; `None` when the directory answers `null`
    pub async fn list_users(&self) -> Result<Option<Vec<DirectoryUser>>, ClientError> {
        let request = self.request(reqwest::Method::GET, "/users");
        self.execute(request).await
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    #[tracing::instrument(name = "directory.username_for", skip(self))]
    async fn username_for(&self, user_id: &str) -> grants_core::Result<String> {
        match self.get_user(user_id).await {
            Ok(user) => Ok(user.username),
            Err(ClientError::NotFound(_)) => {
                Err(grants_core::Error::UserNotFound(user_id.to_string()))
            }
            Err(e) => {
                warn!("User directory lookup failed: {}", e);
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(name = "directory.all_users", skip(self))]
    async fn all_users(&self) -> grants_core::Result<Option<Vec<DirectoryUser>>> {
        let users = self.list_users().await.inspect_err(|e| {
            warn!("User directory listing failed: {}", e);
        })?;
        debug!(count = users.as_ref().map(Vec::len), "Fetched directory users");
        Ok(users)
    }
}

/// Builder for HttpUserDirectory
#[derive(Default)]
pub struct HttpUserDirectoryBuilder {
    base_url: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpUserDirectoryBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the bearer token sent with every request
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<HttpUserDirectory, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| concat!("grants/", env!("CARGO_PKG_VERSION")).to_string()),
        );

        let client = client_builder.build()?;

        Ok(HttpUserDirectory {
            client,
            base_url,
            token: self.token,
        })
    }
}
