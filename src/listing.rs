use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Price {
    pub amount: Decimal,
    pub currency: String,
}

impl Price {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Amount as a float for statistics and plotting.
    pub fn value(&self) -> f64 {
        self.amount.to_f64().unwrap_or(f64::NAN)
    }
}

/// One sold listing scraped from the results page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: usize,
    pub title: String,
    pub price: Price,
    pub location: String,
    pub sold_date: NaiveDate,
}

/// Price amounts in listing order.
pub fn amounts(listings: &[Listing]) -> Vec<f64> {
    listings.iter().map(|l| l.price.value()).collect()
}

/// Rewrites ids to 0..N-1 in current order.
pub fn renumber(listings: &mut [Listing]) {
    for (i, listing) in listings.iter_mut().enumerate() {
        listing.id = i;
    }
}
