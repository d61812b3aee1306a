//! Reddit OAuth2 session (script-app password grant)

use komori_domain::{FeedError, ReplyError};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;

pub const AUTH_BASE_URL: &str = "https://www.reddit.com";
pub const API_BASE_URL: &str = "https://oauth.reddit.com";

/// Tokens are refreshed this long before Reddit says they expire
const EXPIRY_MARGIN: time::Duration = time::Duration::seconds(60);

/// Script-app credentials for the bot account
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: SecretString,
    pub client_secret: SecretString,
    pub username: String,
    pub password: SecretString,
    pub user_agent: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
}

impl From<SessionError> for FeedError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Auth(msg) => FeedError::Auth(msg),
            SessionError::Network(msg) => FeedError::Network(msg),
        }
    }
}

impl From<SessionError> for ReplyError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Auth(msg) => ReplyError::Auth(msg),
            SessionError::Network(msg) => ReplyError::Network(msg),
        }
    }
}

struct AccessToken {
    value: SecretString,
    expires_at: OffsetDateTime,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
}

/// Authenticated HTTP session shared by the feed and reply adapters
pub struct RedditSession {
    client: Client,
    credentials: RedditCredentials,
    auth_base: String,
    api_base: String,
    token: Mutex<Option<AccessToken>>,
}

impl RedditSession {
    pub fn new(credentials: RedditCredentials) -> Result<Self, SessionError> {
        Self::with_base_urls(
            credentials,
            AUTH_BASE_URL.to_string(),
            API_BASE_URL.to_string(),
        )
    }

    pub fn with_base_urls(
        credentials: RedditCredentials,
        auth_base: String,
        api_base: String,
    ) -> Result<Self, SessionError> {
        let client = Client::builder()
            .user_agent(&credentials.user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SessionError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            auth_base,
            api_base,
            token: Mutex::new(None),
        })
    }

    /// Obtain a token now so bad credentials fail before the run starts
    pub async fn authenticate(&self) -> Result<(), SessionError> {
        self.bearer().await.map(|_| ())
    }

    /// Current bearer token, refreshed when close to expiry
    async fn bearer(&self) -> Result<SecretString, SessionError> {
        let mut guard = self.token.lock().await;

        if let Some(token) = guard.as_ref() {
            if OffsetDateTime::now_utc() + EXPIRY_MARGIN < token.expires_at {
                return Ok(SecretString::new(token.value.expose_secret().into()));
            }
        }

        let fresh = self.request_token().await?;
        let value = SecretString::new(fresh.value.expose_secret().into());
        *guard = Some(fresh);

        Ok(value)
    }

    async fn request_token(&self) -> Result<AccessToken, SessionError> {
        let url = format!("{}/api/v1/access_token", self.auth_base);

        tracing::debug!(username = %self.credentials.username, "Requesting Reddit access token");

        let response = self
            .client
            .post(&url)
            .basic_auth(
                self.credentials.client_id.expose_secret(),
                Some(self.credentials.client_secret.expose_secret()),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        if response.status() == 401 {
            return Err(SessionError::Auth("Invalid client id or secret".to_string()));
        }

        let status = response.status();

        if status == 429 || status.is_server_error() {
            return Err(SessionError::Network(format!(
                "Token endpoint unavailable ({})",
                status
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::Auth(format!(
                "Token request failed ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SessionError::Auth(e.to_string()))?;

        // Reddit reports bad user credentials as 200 + {"error": "invalid_grant"}
        if let Some(error) = token.error {
            return Err(SessionError::Auth(error));
        }

        let Some(access_token) = token.access_token else {
            return Err(SessionError::Auth(
                "Token response missing access_token".to_string(),
            ));
        };

        let expires_in = token.expires_in.unwrap_or(3600);
        if expires_in < 0 {
            return Err(SessionError::Auth(format!(
                "Token response has negative expires_in: {}",
                expires_in
            )));
        }
        let expires_at = OffsetDateTime::now_utc()
            .checked_add(time::Duration::seconds(expires_in))
            .ok_or_else(|| {
                SessionError::Auth(format!("Token expires_in out of range: {}", expires_in))
            })?;

        tracing::info!(
            username = %self.credentials.username,
            expires_in = expires_in,
            "Authenticated with Reddit"
        );

        Ok(AccessToken {
            value: SecretString::new(access_token.into()),
            expires_at,
        })
    }

    pub(crate) async fn get(&self, path: &str) -> Result<RequestBuilder, SessionError> {
        let token = self.bearer().await?;
        Ok(self
            .client
            .get(format!("{}{}", self.api_base, path))
            .bearer_auth(token.expose_secret()))
    }

    pub(crate) async fn post(&self, path: &str) -> Result<RequestBuilder, SessionError> {
        let token = self.bearer().await?;
        Ok(self
            .client
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(token.expose_secret()))
    }
}
