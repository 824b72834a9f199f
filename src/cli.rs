use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::fetch::{BrowserSession, HttpSession, PageSession, PollConfig};
use crate::pipeline::{self, Options};
use crate::query::Condition;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Fractional seconds, finite and non-negative.
fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number of seconds"))?;
    if secs < 0.0 {
        return Err(format!("`{s}` is negative"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("`{s}`: {e}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FetcherKind {
    /// Chrome through WebDriver; renders scripts and lets you solve challenges
    Browser,
    /// Plain HTTP request, no script rendering
    Http,
}

#[derive(Parser, Debug)]
#[command(
    name = "sold-scraper",
    version,
    about = "Plot recent sold prices for a marketplace search.",
    after_help = "Example: sold-scraper \"macbook air m1 8gb 256gb\" new"
)]
pub struct Cli {
    /// What to search for
    pub item: String,

    /// Item condition
    #[arg(value_enum, ignore_case = true)]
    pub condition: Condition,

    /// WebDriver server to drive the browser through
    #[arg(long, default_value = "http://localhost:9515")]
    pub webdriver: String,

    /// How the results page is loaded
    #[arg(long, value_enum, default_value_t = FetcherKind::Browser)]
    pub fetcher: FetcherKind,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Seconds between page checks while waiting for listings
    #[arg(long, default_value = "1", value_parser = parse_seconds)]
    pub poll_interval: Duration,

    /// Give up waiting for listings after this many seconds (0 waits forever)
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,

    /// Where the chart image is written
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Print the filtered listings as JSON
    #[arg(long)]
    pub json: bool,
}

impl From<&Cli> for Options {
    fn from(cli: &Cli) -> Self {
        Options {
            item: cli.item.clone(),
            condition: cli.condition,
            poll: PollConfig {
                interval: cli.poll_interval.max(MIN_POLL_INTERVAL),
                timeout: (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout)),
            },
            output_dir: cli.output_dir.clone(),
            print_json: cli.json,
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let options = Options::from(&self);

        let mut session: Box<dyn PageSession> = match self.fetcher {
            FetcherKind::Browser => {
                Box::new(BrowserSession::launch(&self.webdriver, self.headless).await?)
            }
            FetcherKind::Http => Box::new(HttpSession::new()?),
        };

        pipeline::run(session.as_mut(), &options).await?;
        Ok(())
    }
}
