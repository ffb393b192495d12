//! HTTP client for the dashboard backend.
//!
//! Wraps `reqwest` with retry, status mapping, and typed deserialization of
//! the flat feeds. Collection endpoints may answer with a bare JSON array or
//! a `{ "data": [...] }` envelope; both are accepted.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use storemap_core::{AppConfig, AreaRecord, CityRecord, StoreBusinessesRecord, ZoneRecord};
use storemap_map::BoundaryLayer;

use crate::error::ClientError;
use crate::retry::retry_with_backoff;

const DEFAULT_USER_AGENT: &str = "storemap/0.1 (retail-dashboard)";
const BOUNDARIES_PATH: &str = "static/boundaries.geojson";

/// Transport settings for [`DataClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_retries: 3,
            retry_backoff_base_ms: 500,
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

/// Client for the backend's read-only feeds.
///
/// Use [`DataClient::from_config`] in the binaries or
/// [`DataClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct DataClient {
    client: Client,
    base_url: Url,
    boundaries_url: Url,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl DataClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built
    /// or [`ClientError::InvalidBaseUrl`] if either configured URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_base_url(&config.data_url, ClientOptions::from_config(config))?
            .with_boundaries_url(&config.boundaries_url)
    }

    /// Creates a client for `base_url`; the boundary document defaults to
    /// `static/boundaries.geojson` under it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` is not an http(s) URL.
    pub fn with_base_url(base_url: &str, options: ClientOptions) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash so joins append instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = parse_http_url(&normalised)?;
        let boundaries_url = join(&base_url, BOUNDARIES_PATH)?;

        Ok(Self {
            client,
            base_url,
            boundaries_url,
            max_retries: options.max_retries,
            retry_backoff_base_ms: options.retry_backoff_base_ms,
        })
    }

    /// Override where the boundary document is fetched from.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `url` is not an http(s) URL.
    pub fn with_boundaries_url(mut self, url: &str) -> Result<Self, ClientError> {
        self.boundaries_url = parse_http_url(url)?;
        Ok(self)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn boundaries_url(&self) -> &Url {
        &self.boundaries_url
    }

    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure, a non-2xx status, or a
    /// body that is not a list of city records.
    pub async fn fetch_cities(&self) -> Result<Vec<CityRecord>, ClientError> {
        self.fetch_collection("api/cities").await
    }

    /// # Errors
    ///
    /// See [`DataClient::fetch_cities`].
    pub async fn fetch_areas(&self) -> Result<Vec<AreaRecord>, ClientError> {
        self.fetch_collection("api/areas").await
    }

    /// # Errors
    ///
    /// See [`DataClient::fetch_cities`].
    pub async fn fetch_zones(&self) -> Result<Vec<ZoneRecord>, ClientError> {
        self.fetch_collection("api/zones").await
    }

    /// # Errors
    ///
    /// See [`DataClient::fetch_cities`].
    pub async fn fetch_store_businesses(&self) -> Result<Vec<StoreBusinessesRecord>, ClientError> {
        self.fetch_collection("api/stores-with-businesses").await
    }

    /// Fetch and parse the boundary document.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Boundary`] if the document is not a GeoJSON
    /// FeatureCollection, or any transport error.
    pub async fn fetch_boundaries(&self, name_keys: &[String]) -> Result<BoundaryLayer, ClientError> {
        let body = self.get_text(&self.boundaries_url).await?;
        Ok(BoundaryLayer::parse(&body, name_keys)?)
    }

    async fn fetch_collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ClientError> {
        let url = join(&self.base_url, path)?;
        let body = self.get_text(&url).await?;
        let records: Vec<T> = parse_collection(&body, url.as_str())?;
        tracing::debug!(url = %url, count = records.len(), "fetched collection");
        Ok(records)
    }

    async fn get_text(&self, url: &Url) -> Result<String, ClientError> {
        retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || async move {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ClientError::RateLimited {
                    url: url.to_string(),
                });
            }
            if !status.is_success() {
                return Err(ClientError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Ok(response.text().await?)
        })
        .await
    }
}

/// Parse a collection body: a bare JSON array or a `{ "data": [...] }`
/// envelope. `context` names the source in errors.
///
/// # Errors
///
/// Returns [`ClientError::Deserialize`] if the body is not JSON or its items
/// do not match `T`.
pub fn parse_collection<T: DeserializeOwned>(body: &str, context: &str) -> Result<Vec<T>, ClientError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ClientError::Deserialize {
            context: context.to_owned(),
            source: e,
        })?;
    serde_json::from_value(unwrap_envelope(value)).map_err(|e| ClientError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// `{ "data": [...] }` → `[...]`; anything else passes through unchanged.
fn unwrap_envelope(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) if map.get("data").is_some_and(serde_json::Value::is_array) => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

fn parse_http_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw).map_err(|e| ClientError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

fn join(base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path).map_err(|e| ClientError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
