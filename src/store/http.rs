//! HTTP object store for the config API
//!
//! Provides an authenticated client for the namespace-scoped REST endpoints
//! (`/namespaces/{ns}/{plural}[/{name}]`).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::ObjectStore;
use crate::domain::{ConfigObject, Kind};
use crate::errors::{CloneError, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the config API (e.g., "https://tenant.console.example.com/api/config")
    pub base_url: String,

    /// API token sent as `Authorization: APIToken <token>`
    pub token: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Enable verbose request/response logging
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: String::new(), token: String::new(), timeout: 30, verbose: false }
    }
}

/// Certificate listing response
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ListItem>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    #[serde(default)]
    name: Option<String>,
}

/// Authenticated HTTP object store
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: Client,
    config: ClientConfig,
}

impl HttpObjectStore {
    /// Create a new store with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(CloneError::config("base URL must not be empty"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("APIToken {}", config.token))
            .map_err(|_| CloneError::config("API token contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .default_headers(headers)
            .build()
            .map_err(|e| CloneError::transport(e, "Failed to build HTTP client"))?;

        Ok(Self { client, config })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn object_path(kind: Kind, namespace: &str, name: &str) -> String {
        format!("/namespaces/{}/{}/{}", namespace, kind.plural(), name)
    }

    fn collection_path(kind: Kind, namespace: &str) -> String {
        format!("/namespaces/{}/{}", namespace, kind.plural())
    }

    /// Build a GET request
    fn get(&self, path: &str) -> (String, RequestBuilder) {
        let url = self.url(path);
        debug!("GET {}", url);
        let request = self.client.get(&url);
        (url, request)
    }

    /// Build a POST request
    fn post(&self, path: &str) -> (String, RequestBuilder) {
        let url = self.url(path);
        debug!("POST {}", url);
        let request = self.client.post(&url);
        (url, request)
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|e| CloneError::transport(e, format!("request to {} failed", url)))
    }

    /// Check status and return the response text. `sent` is attached to the
    /// error on failure so the operator can see what was posted.
    async fn read_response(
        &self,
        method: &str,
        url: &str,
        response: Response,
        sent: Option<String>,
    ) -> Result<String> {
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<unable to read error>".to_string());

            if self.config.verbose {
                trace!("Error response:\n{}", body);
            }

            return Err(CloneError::Api {
                status: status.as_u16(),
                method: method.to_string(),
                url: url.to_string(),
                body,
                sent,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CloneError::transport(e, "Failed to read response body"))?;

        if self.config.verbose {
            trace!("Response body:\n{}", body);
        }

        Ok(body)
    }

    /// Check status and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        response: Response,
        sent: Option<String>,
    ) -> Result<T> {
        let body = self.read_response(method, url, response, sent).await?;
        serde_json::from_str(&body)
            .map_err(|e| CloneError::serialization(e, format!("Failed to deserialize response from {}", url)))
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn fetch(&self, kind: Kind, namespace: &str, name: &str) -> Result<ConfigObject> {
        let (url, request) = self.get(&Self::object_path(kind, namespace, name));
        let response = self.send(&url, request).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CloneError::not_found(kind, namespace, name));
        }

        self.handle_response("GET", &url, response, None).await
    }

    async fn exists(&self, kind: Kind, namespace: &str, name: &str) -> Result<bool> {
        let (url, request) = self.get(&Self::object_path(kind, namespace, name));
        let status = self.send(&url, request).await?.status();

        if status.is_success() {
            return Ok(true);
        }
        if status != StatusCode::NOT_FOUND {
            warn!(%status, url = %url, "Existence check returned unexpected status; treating as absent");
        }
        Ok(false)
    }

    async fn create(&self, kind: Kind, namespace: &str, body: &ConfigObject) -> Result<ConfigObject> {
        let sent = serde_json::to_string_pretty(body)
            .unwrap_or_else(|_| "<unable to serialize>".to_string());
        if self.config.verbose {
            trace!("Request body:\n{}", sent);
        }

        let (url, request) = self.post(&Self::collection_path(kind, namespace));
        let response = self.send(&url, request.json(body)).await?;
        let text = self.read_response("POST", &url, response, Some(sent)).await?;

        // Some tenants answer a create with an empty body
        if text.trim().is_empty() {
            return Ok(body.clone());
        }
        serde_json::from_str(&text)
            .map_err(|e| CloneError::serialization(e, format!("Failed to deserialize response from {}", url)))
    }

    async fn list_certificates(&self, namespace: &str) -> Result<Vec<String>> {
        let (url, request) = self.get(&format!("/namespaces/{}/certificates", namespace));
        let response = self.send(&url, request).await?;
        let listing: ListResponse = self.handle_response("GET", &url, response, None).await?;

        Ok(listing.items.into_iter().filter_map(|item| item.name).collect())
    }
}
