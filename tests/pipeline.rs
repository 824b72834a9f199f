use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sold_scraper::error::{ExtractError, FetchError};
use sold_scraper::fetch::{PageSession, PollConfig};
use sold_scraper::pipeline::{self, Options};
use sold_scraper::{Condition, ScrapeError};

const AMOUNTS: [&str; 12] = [
    "100.00", "102.00", "98.00", "105.00", "97.00", "101.00", "99.00", "103.00", "104.00",
    "96.00", "10,000.00", "100.00",
];

/// Serves a bot check first, then the given page.
struct FakeMarketplace {
    page: String,
    challenge_reads: usize,
    visited: Vec<String>,
    closed: bool,
}

impl FakeMarketplace {
    fn new(page: String) -> Self {
        Self {
            page,
            challenge_reads: 2,
            visited: Vec::new(),
            closed: false,
        }
    }
}

#[async_trait]
impl PageSession for FakeMarketplace {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        self.visited.push(url.to_string());
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, FetchError> {
        if self.challenge_reads > 0 {
            self.challenge_reads -= 1;
            return Ok("<html><body><h1>Pardon our interruption</h1></body></html>".to_string());
        }
        Ok(self.page.clone())
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        self.closed = true;
        Ok(())
    }
}

fn results_page(amounts: &[&str]) -> String {
    let mut html = String::from(
        r#"<html><body><ul class="srp-results">
        <li class="s-item"><h3 class="s-item__title s-item__title--has-tags">Shop on eBay</h3></li>"#,
    );
    for (i, amount) in amounts.iter().enumerate() {
        html.push_str(&format!(
            r#"<li class="s-item">
              <div class="s-item__title--tag"><span class="POSITIVE">Sold  Mar {day}, 2023</span></div>
              <h3 class="s-item__title s-item__title--has-tags">Widget lot #{i}</h3>
              <span class="s-item__price">$ {amount}</span>
              <span class="s-item__location s-item__itemLocation">from United States</span>
            </li>"#,
            day = 1 + i / 3,
        ));
    }
    html.push_str(r#"<li><span class="s-item__price">$ 1.00</span></li></ul></body></html>"#);
    html
}

fn options(dir: &std::path::Path) -> Options {
    Options {
        item: "widget".to_string(),
        condition: Condition::Used,
        poll: PollConfig {
            interval: Duration::from_millis(1),
            timeout: Some(Duration::from_secs(5)),
        },
        output_dir: dir.to_path_buf(),
        print_json: false,
    }
}

#[tokio::test]
async fn test_used_widget_prunes_the_outlier() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = FakeMarketplace::new(results_page(&AMOUNTS));

    let outcome = pipeline::run(&mut session, &options(dir.path())).await.unwrap();

    assert!(session.closed);
    assert_eq!(session.visited, vec![outcome.url.clone()]);
    assert!(outcome.url.contains("_nkw=widget"));
    assert!(outcome.url.contains("LH_ItemCondition=3000|2500"));
    for foreign in ["1500", "1000", "7000"] {
        assert!(!outcome.url.contains(foreign), "{}", outcome.url);
    }

    assert_eq!(outcome.extracted, 12);
    let kept = outcome.listings();
    assert!(kept.len() < 12);
    assert!(
        kept.iter()
            .all(|l| l.price.amount != Decimal::from(10_000))
    );
    let ids: Vec<usize> = kept.iter().map(|l| l.id).collect();
    assert_eq!(ids, (0..kept.len()).collect::<Vec<_>>());
    assert!(kept.iter().all(|l| l.location == "United States"));

    assert!(outcome.chart.path.exists());
    assert_eq!(outcome.chart.path, dir.path().join("widget-used.png"));
    assert_eq!(outcome.chart.currency, "$");
    assert!(outcome.chart.average > 96.0 && outcome.chart.average < 105.0);
}

#[tokio::test]
async fn test_short_page_keeps_every_listing() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = FakeMarketplace::new(results_page(&["10.00", "20.00", "5,000.00"]));

    let outcome = pipeline::run(&mut session, &options(dir.path())).await.unwrap();

    assert_eq!(outcome.listings().len(), 3);
    assert_eq!(outcome.outliers.removed, 0);
    assert_eq!(outcome.outliers.band, None);
}

#[tokio::test]
async fn test_broken_markup_is_a_fault() {
    let dir = tempfile::tempdir().unwrap();
    let page = results_page(&AMOUNTS).replace("from United States", "");
    let page = page.replace(r#"<span class="s-item__location s-item__itemLocation"></span>"#, "");
    let mut session = FakeMarketplace::new(page);

    let err = pipeline::run(&mut session, &options(dir.path()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::Extract(ExtractError::MissingField {
            field: "location",
            ..
        })
    ));
    assert!(session.closed);
    assert!(!dir.path().join("widget-used.png").exists());
}

#[tokio::test]
async fn test_never_rendered_page_stalls() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = FakeMarketplace::new(String::new());
    session.challenge_reads = usize::MAX;
    let mut opts = options(dir.path());
    opts.poll.timeout = Some(Duration::from_millis(20));

    let err = pipeline::run(&mut session, &opts).await.unwrap_err();

    assert!(matches!(err, ScrapeError::Fetch(FetchError::Stalled { .. })));
    assert!(session.closed);
}
