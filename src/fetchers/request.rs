use super::PageSource;
use crate::error::CraftError;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, Url};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; craftdb/0.3)";

/// Fetches pages from a wiki over HTTP
pub struct RequestFetcher {
    client: Client,
    base_url: Url,
}

impl RequestFetcher {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, CraftError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?;
        let base_url = Url::parse(base_url).map_err(|e| CraftError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Resolve a wiki path (or pass an absolute URL through)
    pub fn resolve(&self, path: &str) -> Result<Url, CraftError> {
        self.base_url
            .join(path)
            .map_err(|e| CraftError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn get(&self, path: &str) -> Result<Response, CraftError> {
        let url = self.resolve(path)?;
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(CraftError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl PageSource for RequestFetcher {
    async fn fetch(&self, path: &str) -> Result<String, CraftError> {
        Ok(self.get(path).await?.text().await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, CraftError> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}
