use async_trait::async_trait;
use thirtyfour::ChromiumLikeCapabilities;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use tracing::info;

use super::PageSession;
use crate::error::FetchError;

fn browser_err(e: WebDriverError) -> FetchError {
    FetchError::Browser(e.to_string())
}

/// Chrome driven through a WebDriver server such as chromedriver.
pub struct BrowserSession {
    driver: Option<WebDriver>,
}

impl BrowserSession {
    pub async fn launch(webdriver_url: &str, headless: bool) -> Result<Self, FetchError> {
        let mut caps = DesiredCapabilities::chrome();
        if headless {
            caps.set_headless().map_err(browser_err)?;
        }

        info!("connecting to webdriver at {webdriver_url}");
        let driver = WebDriver::new(webdriver_url, caps)
            .await
            .map_err(browser_err)?;

        Ok(Self {
            driver: Some(driver),
        })
    }

    fn driver(&self) -> Result<&WebDriver, FetchError> {
        self.driver
            .as_ref()
            .ok_or_else(|| FetchError::Browser("session already closed".to_string()))
    }
}

#[async_trait]
impl PageSession for BrowserSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        self.driver()?.goto(url).await.map_err(browser_err)
    }

    async fn page_source(&mut self) -> Result<String, FetchError> {
        self.driver()?.source().await.map_err(browser_err)
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        match self.driver.take() {
            Some(driver) => driver.quit().await.map_err(browser_err),
            None => Ok(()),
        }
    }
}
