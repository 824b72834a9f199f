use chrono::NaiveDate;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ExtractError;
use crate::listing::{Listing, Price};

// Results-page markup. These class names belong to the marketplace and
// change when the site is redesigned.
pub const TITLE_SELECTOR: &str = "h3.s-item__title.s-item__title--has-tags";
pub const DATE_TAG_SELECTOR: &str = "div.s-item__title--tag";
pub const DATE_SELECTOR: &str = "span.POSITIVE";
pub const PRICE_SELECTOR: &str = "span.s-item__price";
pub const LOCATION_SELECTOR: &str = "span.s-item__location.s-item__itemLocation";

/// The first matching title is a promoted header card, not a sold listing.
pub const LEADING_PROMOTED_TITLES: usize = 1;

const DATE_PREFIX: &str = "Sold";
const DATE_FORMAT: &str = "%b %d, %Y";
const LOCATION_PREFIX: &str = "from ";

/// Text of each field in page order, before any correction.
#[derive(Debug, Default, Clone)]
pub struct RawFields {
    pub titles: Vec<String>,
    pub dates: Vec<String>,
    pub prices: Vec<String>,
    pub locations: Vec<String>,
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css))
}

fn element_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn texts(document: &Html, css: &'static str) -> Result<Vec<String>, ExtractError> {
    let sel = selector(css)?;
    Ok(document.select(&sel).map(element_text).collect())
}

/// True once the rendered page shows at least one listing title.
pub fn has_listing_titles(html: &str) -> bool {
    let Ok(sel) = selector(TITLE_SELECTOR) else {
        return false;
    };
    Html::parse_document(html).select(&sel).next().is_some()
}

pub fn raw_fields(html: &str) -> Result<RawFields, ExtractError> {
    let document = Html::parse_document(html);

    let date_sel = selector(DATE_SELECTOR)?;
    let tag_sel = selector(DATE_TAG_SELECTOR)?;
    let tags: Vec<ElementRef<'_>> = document.select(&tag_sel).collect();
    let mut dates = Vec::with_capacity(tags.len());
    for tag in &tags {
        let date = tag
            .select(&date_sel)
            .next()
            .ok_or(ExtractError::MissingField {
                field: "sold date",
                expected: tags.len(),
            })?;
        dates.push(element_text(date));
    }

    Ok(RawFields {
        titles: texts(&document, TITLE_SELECTOR)?,
        dates,
        prices: texts(&document, PRICE_SELECTOR)?,
        locations: texts(&document, LOCATION_SELECTOR)?,
    })
}

/// Parses every listing on a rendered results page.
pub fn extract_listings(html: &str) -> Result<Vec<Listing>, ExtractError> {
    let raw = raw_fields(html)?;
    debug!(
        titles = raw.titles.len(),
        dates = raw.dates.len(),
        prices = raw.prices.len(),
        locations = raw.locations.len(),
        "raw fields"
    );
    assemble(raw)
}

/// Applies the page corrections and zips the fields into listings.
pub fn assemble(raw: RawFields) -> Result<Vec<Listing>, ExtractError> {
    let RawFields {
        titles,
        dates,
        mut prices,
        locations,
    } = raw;

    let titles: Vec<String> = titles.into_iter().skip(LEADING_PROMOTED_TITLES).collect();
    let expected = titles.len();
    // Trailing price node after the last listing. The old scraper cut the
    // prices to one fewer than the corrected titles, which conflicts with
    // T titles and T prices producing T listings and loses the last real
    // listing when no trailing node is present. Keep the cut at the title
    // count.
    prices.truncate(expected);

    check_count("sold date", dates.len(), expected)?;
    check_count("price", prices.len(), expected)?;
    check_count("location", locations.len(), expected)?;

    titles
        .into_iter()
        .zip(dates)
        .zip(prices)
        .zip(locations)
        .enumerate()
        .map(|(id, (((title, date), price), location))| -> Result<Listing, ExtractError> {
            Ok(Listing {
                id,
                title,
                price: parse_price(&price)?,
                location: parse_location(&location),
                sold_date: parse_sold_date(&date)?,
            })
        })
        .collect()
}

fn check_count(field: &'static str, found: usize, expected: usize) -> Result<(), ExtractError> {
    if found == expected {
        return Ok(());
    }
    if found == 0 {
        return Err(ExtractError::MissingField { field, expected });
    }
    Err(ExtractError::Misaligned {
        field,
        found,
        expected,
    })
}

pub fn parse_sold_date(text: &str) -> Result<NaiveDate, ExtractError> {
    let trimmed = text.trim();
    let date = trimmed.strip_prefix(DATE_PREFIX).unwrap_or(trimmed).trim();
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|e| ExtractError::BadDate {
        text: text.to_string(),
        reason: e.to_string(),
    })
}

/// Reads `"$ 1,299.00"` or `"$1,299.00"` as amount + currency. Missing
/// currency, missing amount and multi-part text (price ranges) are faults.
pub fn parse_price(text: &str) -> Result<Price, ExtractError> {
    let bad = |reason: &str| ExtractError::BadPrice {
        text: text.to_string(),
        reason: reason.to_string(),
    };

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (currency, number) = match tokens.as_slice() {
        [currency, number] => (*currency, *number),
        [joined] => {
            let split = joined
                .find(|c: char| c.is_ascii_digit())
                .ok_or_else(|| bad("no amount"))?;
            joined.split_at(split)
        }
        [] => return Err(bad("empty")),
        _ => return Err(bad("expected currency and amount")),
    };

    if currency.is_empty() {
        return Err(bad("no currency"));
    }

    let amount: Decimal = number
        .replace(',', "")
        .parse()
        .map_err(|e: rust_decimal::Error| bad(&e.to_string()))?;

    Ok(Price::new(amount, currency))
}

pub fn parse_location(text: &str) -> String {
    let trimmed = text.trim();
    trimmed
        .strip_prefix(LOCATION_PREFIX)
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
