//! reqwest client for the RapidAPI products-database search endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, warn};
use vitrina_core::config::ProviderConfig;
use vitrina_core::search::{shape_search_response, ProductMatch, ProductSearch, SearchError};

const SEARCH_PAGE: &str = "1";

pub struct RapidApiProductSearch {
    client: Client,
    base_url: String,
    host: String,
    api_key: SecretString,
    lang: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl RapidApiProductSearch {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().to_string(),
            host: config.host.clone(),
            api_key: config.api_key.clone(),
            lang: config.lang.clone(),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    async fn search_once(&self, query: &str) -> Result<ProductMatch, SearchError> {
        let response = self
            .client
            .get(&self.base_url)
            .header("x-rapidapi-key", self.api_key.expose_secret())
            .header("x-rapidapi-host", &self.host)
            .query(&[("query", query), ("page", SEARCH_PAGE), ("lang", self.lang.as_str())])
            .send()
            .await
            .map_err(|error| SearchError::Transient(describe_transport_error(&error)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Transient(format!("provider responded with status {status}")));
        }

        let body: Value = response.json().await.map_err(|error| {
            SearchError::Transient(format!("provider returned a malformed body: {error}"))
        })?;

        shape_search_response(query, &body)
    }
}

#[async_trait]
impl ProductSearch for RapidApiProductSearch {
    async fn search(&self, query: &str) -> Result<ProductMatch, SearchError> {
        let mut attempt: u32 = 0;
        loop {
            match self.search_once(query).await {
                Err(error) if error.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        event_name = "provider.search.retry",
                        query,
                        attempt,
                        max_retries = self.max_retries,
                        error = %error,
                        "product search failed, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                outcome => {
                    debug!(
                        event_name = "provider.search.completed",
                        query,
                        attempts = attempt + 1,
                        found = outcome.is_ok(),
                        "product search completed"
                    );
                    return outcome;
                }
            }
        }
    }
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "provider request timed out".to_string()
    } else if error.is_connect() {
        format!("could not connect to provider: {error}")
    } else {
        format!("provider request failed: {error}")
    }
}
