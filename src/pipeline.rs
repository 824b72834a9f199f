use std::path::PathBuf;

use tracing::{info, warn};

use crate::chart::{self, ChartReport};
use crate::error::ScrapeError;
use crate::extract;
use crate::fetch::{self, PageSession, PollConfig};
use crate::listing::Listing;
use crate::outliers::{self, OutlierReport};
use crate::query::{self, Condition};

#[derive(Debug, Clone)]
pub struct Options {
    /// Search text as typed; spaces are escaped when the URL is built.
    pub item: String,
    pub condition: Condition,
    pub poll: PollConfig,
    pub output_dir: PathBuf,
    pub print_json: bool,
}

#[derive(Debug)]
pub struct Outcome {
    pub url: String,
    pub extracted: usize,
    pub outliers: OutlierReport,
    pub chart: ChartReport,
}

impl Outcome {
    pub fn listings(&self) -> &[Listing] {
        &self.outliers.kept
    }
}

/// Builds the search URL, waits for the results page, extracts and filters
/// the listings, then draws the charts.
pub async fn run<S>(session: &mut S, options: &Options) -> Result<Outcome, ScrapeError>
where
    S: PageSession + ?Sized,
{
    let url = query::build_url(&query::escape_item(&options.item), options.condition);
    println!("{url}");

    let html = fetch::fetch_rendered(session, &url, &options.poll).await?;

    let listings = extract::extract_listings(&html)?;
    let extracted = listings.len();
    info!(count = extracted, "extracted listings");

    let report = outliers::filter_outliers(listings);
    match report.band {
        Some((low, high)) => info!(
            removed = report.removed,
            kept = report.kept.len(),
            "outlier band {low:.2}..{high:.2}"
        ),
        None => warn!(
            count = report.kept.len(),
            "too few listings for an outlier band, nothing removed"
        ),
    }

    if options.print_json {
        println!("{}", serde_json::to_string_pretty(&report.kept)?);
    }

    let path = chart::chart_path(&options.output_dir, &options.item, options.condition);
    let chart = chart::render(&report.kept, &path)?;
    println!("Average price: {:.2} {}", chart.average, chart.currency);

    Ok(Outcome {
        url,
        extracted,
        outliers: report,
        chart,
    })
}
