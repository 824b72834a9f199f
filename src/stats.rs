use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::listing::Listing;

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Linearly interpolated quantile (`q` in 0..=1) of already sorted values.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean price per sold date, oldest date first.
pub fn daily_averages(listings: &[Listing]) -> Vec<(NaiveDate, f64)> {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for listing in listings {
        let entry = by_date.entry(listing.sold_date).or_insert((0.0, 0));
        entry.0 += listing.price.value();
        entry.1 += 1;
    }
    by_date
        .into_iter()
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .collect()
}

/// Middle half of the amounts, picked by position in the sorted list
/// rather than interpolated.
pub fn interquartile_band(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let lower = sorted.len() / 4;
    let upper = (lower * 3).min(sorted.len() - 1);
    Some((sorted[lower], sorted[upper]))
}

/// Points for the latest-listings panel: x is the listing id, y runs over
/// the amounts in reverse so the newest sale sits at x = 0.
pub fn index_series(listings: &[Listing]) -> Vec<(usize, f64)> {
    listings
        .iter()
        .map(|l| l.id)
        .zip(listings.iter().rev().map(|l| l.price.value()))
        .collect()
}
