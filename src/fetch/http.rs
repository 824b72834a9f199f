use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;

use super::PageSession;
use crate::error::FetchError;

const BROWSER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Plain HTTP fetches for result pages that render server-side. Every read
/// re-requests the page.
pub struct HttpSession {
    client: reqwest::Client,
    url: Option<String>,
}

impl HttpSession {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { client, url: None })
    }
}

#[async_trait]
impl PageSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        self.url = Some(url.to_string());
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, FetchError> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| FetchError::Network("no page requested yet".to_string()))?;

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_AGENT)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("failed to fetch {url}: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read response from {url}: {e}")))
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        self.url = None;
        Ok(())
    }
}
