//! Page fetching seam - one trait so provider tests never touch the network

use crate::ai::ProviderError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

const FETCH_TIMEOUT_SECS: u64 = 20;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; ProspectBot/1.0)";

/// A fetched page with the pieces the providers inspect.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: String,
    /// Response headers, keys lower-cased.
    pub headers: HashMap<String, String>,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ProviderError>;
}

/// Live fetcher over a shared reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        HttpFetcher { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ProviderError> {
        if url::Url::parse(url).is_err() {
            return Err(ProviderError::Network(format!("invalid URL: {}", url)));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("failed to fetch {}: {}", url, e)))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_lowercase(), v.to_string()))
            })
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(format!("failed to read body of {}: {}", url, e)))?;

        Ok(FetchedPage {
            url: final_url,
            status,
            body,
            headers,
        })
    }
}
