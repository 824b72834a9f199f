use tracing::debug;

use crate::listing::{self, Listing};
use crate::stats;

pub const LOWER_QUANTILE: f64 = 0.1;
pub const UPPER_QUANTILE: f64 = 0.9;

/// Below this many records the percentile band is too coarse to mean
/// anything and everything is kept.
pub const MIN_SAMPLES: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct OutlierReport {
    pub kept: Vec<Listing>,
    pub removed: usize,
    pub band: Option<(f64, f64)>,
}

/// Drops listings priced strictly outside the 10th..90th percentile band and
/// renumbers the survivors 0..N-1.
pub fn filter_outliers(listings: Vec<Listing>) -> OutlierReport {
    let amounts = listing::amounts(&listings);
    if amounts.len() < MIN_SAMPLES {
        debug!(count = amounts.len(), "too few listings for outlier band, keeping all");
        return OutlierReport {
            kept: listings,
            removed: 0,
            band: None,
        };
    }

    let sorted = stats::sorted(&amounts);
    let (Some(low), Some(high)) = (
        stats::percentile(&sorted, LOWER_QUANTILE),
        stats::percentile(&sorted, UPPER_QUANTILE),
    ) else {
        return OutlierReport {
            kept: listings,
            removed: 0,
            band: None,
        };
    };

    let before = listings.len();
    let mut kept: Vec<Listing> = listings
        .into_iter()
        .filter(|l| {
            let v = l.price.value();
            v >= low && v <= high
        })
        .collect();
    listing::renumber(&mut kept);

    OutlierReport {
        removed: before - kept.len(),
        kept,
        band: Some((low, high)),
    }
}
