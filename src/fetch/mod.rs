mod browser;
mod http;

pub use browser::BrowserSession;
pub use http::HttpSession;

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::extract::has_listing_titles;

/// A page the fetcher can point somewhere and read back.
#[async_trait]
pub trait PageSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError>;

    /// Markup as currently rendered.
    async fn page_source(&mut self) -> Result<String, FetchError>;

    async fn close(&mut self) -> Result<(), FetchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// Loads `url` and re-reads the page until listing titles show up, which is
/// also how a human gets time to clear a bot check in a visible browser.
/// The session is closed before returning, whatever the outcome.
pub async fn fetch_rendered<S>(
    session: &mut S,
    url: &str,
    poll: &PollConfig,
) -> Result<String, FetchError>
where
    S: PageSession + ?Sized,
{
    let result = wait_for_listings(session, url, poll).await;

    if let Err(e) = session.close().await {
        warn!("failed to close page session: {e}");
    }

    result
}

async fn wait_for_listings<S>(
    session: &mut S,
    url: &str,
    poll: &PollConfig,
) -> Result<String, FetchError>
where
    S: PageSession + ?Sized,
{
    info!("navigating to {url}");
    session.navigate(url).await?;

    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        let html = session.page_source().await?;
        attempts += 1;
        if has_listing_titles(&html) {
            info!(attempts, "listings rendered");
            return Ok(html);
        }

        if let Some(timeout) = poll.timeout {
            if start.elapsed() >= timeout {
                return Err(FetchError::Stalled {
                    waited: start.elapsed(),
                });
            }
        }

        if attempts == 1 {
            info!("no listings yet, waiting (solve the challenge in the browser if one is shown)");
        } else {
            debug!(attempts, "still waiting for listings");
        }
        sleep(poll.interval).await;
    }
}
