pub mod chart;
pub mod cli;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod listing;
pub mod outliers;
pub mod pipeline;
pub mod query;
pub mod stats;

pub use error::ScrapeError;
pub use listing::{Listing, Price};
pub use query::Condition;
