//! HTTP client for the hosted event table.

pub mod events;

use std::time::Duration;

use reqwest::{header, Method, RequestBuilder};
use url::Url;

use crate::error::{ClientError, Result};

/// Connection settings for [`EventsClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the REST endpoint, e.g. `https://project.example.co/rest/v1`.
    pub base_url: String,
    /// Bearer token of the signed-in principal.
    pub token: Option<String>,
    /// Project key sent as the `apikey` header.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the event table.
#[derive(Debug, Clone)]
pub struct EventsClient {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    api_key: Option<String>,
}

impl EventsClient {
    /// Create a new client from `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidInput(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidInput(format!(
                "{} cannot be used as a base URL",
                config.base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: config.token,
            api_key: config.api_key,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build a URL for a path relative to the base URL.
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidInput(format!("{}: {}", path, e)))
    }

    /// Start a request with the credential headers attached.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let mut builder = self.client.request(method, self.url(path)?);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("apikey", api_key);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder.header(header::ACCEPT, "application/json"))
    }

    /// Handle error responses.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            serde_json::from_str(&body).map_err(ClientError::from)
        } else {
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

/// Extracts the human-readable message from an error body.
///
/// Prefers the `message` field of a JSON body, then the raw text.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string));

    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => "Unknown error".to_string(),
    }
}
