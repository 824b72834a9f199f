use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no `{field}` elements found in page markup ({expected} listings expected)")]
    MissingField { field: &'static str, expected: usize },

    #[error("`{field}` count {found} does not match {expected} listing titles")]
    Misaligned {
        field: &'static str,
        found: usize,
        expected: usize,
    },

    #[error("unreadable sold date {text:?}: {reason}")]
    BadDate { text: String, reason: String },

    #[error("unreadable price {text:?}: {reason}")]
    BadPrice { text: String, reason: String },

    #[error("invalid selector `{0}`")]
    Selector(&'static str),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("browser session error: {0}")]
    Browser(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("no listings appeared after waiting {waited:?} (unsolved challenge or empty results)")]
    Stalled { waited: Duration },
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to plot: no listings left after filtering")]
    Empty,

    #[error("could not create output directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not write chart image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("page fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("data extraction fault: {0}")]
    Extract(#[from] ExtractError),

    #[error("chart rendering failed: {0}")]
    Chart(#[from] ChartError),

    #[error("could not serialize listings: {0}")]
    Json(#[from] serde_json::Error),
}
