mod canvas;
mod font;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::error::ChartError;
use crate::listing::{self, Listing};
use crate::query::Condition;
use crate::stats;
use canvas::{BLACK, BLUE, Canvas, GREEN, GREY, PALETTE, RED};
use font::{GLYPH_HEIGHT, text_width};

const WIDTH: u32 = 1000;
const PANEL_HEIGHT: u32 = 420;
const MARGIN_LEFT: i64 = 90;
const MARGIN_RIGHT: i64 = 30;
const MARGIN_TOP: i64 = 25;
const MARGIN_BOTTOM: i64 = 45;
const LABEL_SCALE: u32 = 2;
const MAX_TICKS: usize = 8;
const POINT_RADIUS: i64 = 4;

/// What the charts show, for the textual summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartReport {
    pub path: PathBuf,
    pub average: f64,
    pub currency: String,
    pub band: (f64, f64),
    pub daily_averages: Vec<(NaiveDate, f64)>,
}

/// `<dir>/<item>-<condition>.png` with the item reduced to a file-safe slug.
pub fn chart_path(dir: &Path, item: &str, condition: Condition) -> PathBuf {
    let slug: String = item
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    dir.join(format!("{slug}-{condition}.png"))
}

/// Renders the date panel above the latest-listings panel into one PNG.
pub fn render(listings: &[Listing], path: &Path) -> Result<ChartReport, ChartError> {
    let first = listings.first().ok_or(ChartError::Empty)?;
    let amounts = listing::amounts(listings);
    let average = stats::mean(&amounts).ok_or(ChartError::Empty)?;
    let band = stats::interquartile_band(&amounts).ok_or(ChartError::Empty)?;
    let daily = stats::daily_averages(listings);

    let mut canvas = Canvas::new(WIDTH, PANEL_HEIGHT * 2);
    draw_date_panel(&mut canvas, listings, &daily, 0);
    draw_index_panel(&mut canvas, listings, average, band, PANEL_HEIGHT as i64);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    canvas.into_image().save(path)?;
    info!("chart written to {}", path.display());

    Ok(ChartReport {
        path: path.to_path_buf(),
        average,
        currency: first.price.currency.clone(),
        band,
        daily_averages: daily,
    })
}

/// Linear mapping from a data range onto a pixel span.
#[derive(Debug, Clone, Copy)]
struct Axis {
    min: f64,
    max: f64,
    from: i64,
    to: i64,
}

impl Axis {
    fn new(min: f64, max: f64, from: i64, to: i64) -> Self {
        let (min, max) = if (max - min).abs() < f64::EPSILON {
            (min - 1.0, max + 1.0)
        } else {
            (min, max)
        };
        Self { min, max, from, to }
    }

    /// Like `new` but leaves 5% headroom on both ends.
    fn padded(min: f64, max: f64, from: i64, to: i64) -> Self {
        let pad = (max - min).abs() * 0.05;
        Self::new(min - pad, max + pad, from, to)
    }

    fn px(&self, v: f64) -> i64 {
        let t = (v - self.min) / (self.max - self.min);
        (self.from as f64 + t * (self.to - self.from) as f64).round() as i64
    }
}

struct Frame {
    x: Axis,
    y: Axis,
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
}

impl Frame {
    fn new(top_offset: i64, x: (f64, f64), y: (f64, f64)) -> Self {
        let left = MARGIN_LEFT;
        let right = WIDTH as i64 - MARGIN_RIGHT;
        let top = top_offset + MARGIN_TOP;
        let bottom = top_offset + PANEL_HEIGHT as i64 - MARGIN_BOTTOM;
        Self {
            x: Axis::padded(x.0, x.1, left, right),
            y: Axis::padded(y.0, y.1, bottom, top),
            left,
            right,
            top,
            bottom,
        }
    }

    fn point(&self, x: f64, y: f64) -> (i64, i64) {
        (self.x.px(x), self.y.px(y))
    }

    fn draw_axes(&self, canvas: &mut Canvas) {
        canvas.line(self.left, self.bottom, self.right, self.bottom, BLACK);
        canvas.line(self.left, self.top, self.left, self.bottom, BLACK);
    }

    fn x_tick(&self, canvas: &mut Canvas, v: f64, label: &str) {
        let x = self.x.px(v);
        canvas.line(x, self.bottom, x, self.bottom + 6, BLACK);
        let w = text_width(label, LABEL_SCALE) as i64;
        canvas.text(x - w / 2, self.bottom + 12, label, LABEL_SCALE, BLACK);
    }

    fn y_ticks(&self, canvas: &mut Canvas, min: f64, max: f64) {
        for v in tick_values(min, max, 5) {
            let y = self.y.px(v);
            canvas.line(self.left + 1, y, self.right, y, GREY);
            canvas.line(self.left - 6, y, self.left, y, BLACK);
            let label = format_amount(v, max - min);
            let w = text_width(&label, LABEL_SCALE) as i64;
            let h = (GLYPH_HEIGHT * LABEL_SCALE) as i64;
            canvas.text(self.left - 10 - w, y - h / 2, &label, LABEL_SCALE, BLACK);
        }
    }
}

fn value_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

fn tick_values(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count < 2 || (max - min).abs() < f64::EPSILON {
        return vec![min];
    }
    let step = (max - min) / (count - 1) as f64;
    (0..count).map(|i| min + step * i as f64).collect()
}

fn format_amount(v: f64, span: f64) -> String {
    if span >= 10.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

/// Spreads at most `MAX_TICKS` picks evenly over `n` items.
fn tick_indices(n: usize) -> Vec<usize> {
    if n <= MAX_TICKS {
        return (0..n).collect();
    }
    let step = (n - 1) as f64 / (MAX_TICKS - 1) as f64;
    let mut picks: Vec<usize> = (0..MAX_TICKS)
        .map(|i| (i as f64 * step).round() as usize)
        .collect();
    picks.dedup();
    picks
}

fn draw_date_panel(
    canvas: &mut Canvas,
    listings: &[Listing],
    daily: &[(NaiveDate, f64)],
    top_offset: i64,
) {
    let Some(origin) = daily.first().map(|(d, _)| *d) else {
        return;
    };
    let day = |d: NaiveDate| (d - origin).num_days() as f64;

    let (x_min, x_max) = value_range(daily.iter().map(|(d, _)| day(*d)));
    let (y_min, y_max) = value_range(listing::amounts(listings));
    let frame = Frame::new(top_offset, (x_min, x_max), (y_min, y_max));

    frame.y_ticks(canvas, y_min, y_max);
    frame.draw_axes(canvas);

    for i in tick_indices(daily.len()) {
        let date = daily[i].0;
        frame.x_tick(canvas, day(date), &date.format("%m/%d").to_string());
    }

    for (i, listing) in listings.iter().enumerate() {
        let (x, y) = frame.point(day(listing.sold_date), listing.price.value());
        canvas.dot(x, y, POINT_RADIUS, PALETTE[i % PALETTE.len()]);
    }

    let line: Vec<(i64, i64)> = daily
        .iter()
        .map(|(d, avg)| frame.point(day(*d), *avg))
        .collect();
    for pair in line.windows(2) {
        canvas.line(pair[0].0, pair[0].1, pair[1].0, pair[1].1, BLUE);
    }
}

fn draw_index_panel(
    canvas: &mut Canvas,
    listings: &[Listing],
    average: f64,
    band: (f64, f64),
    top_offset: i64,
) {
    let series = stats::index_series(listings);
    let n = series.len();
    let (y_min, y_max) = value_range(series.iter().map(|(_, v)| *v));
    let frame = Frame::new(
        top_offset,
        (0.0, n.saturating_sub(1) as f64),
        (y_min, y_max),
    );

    frame.y_ticks(canvas, y_min, y_max);

    let (_, low) = frame.point(0.0, band.0);
    let (_, high) = frame.point(0.0, band.1);
    canvas.fill_rect(frame.left + 1, low, frame.right, high, GREEN, 0.33);

    frame.draw_axes(canvas);
    for i in tick_indices(n) {
        frame.x_tick(canvas, i as f64, &i.to_string());
    }

    for (i, (id, amount)) in series.iter().enumerate() {
        let (x, y) = frame.point(*id as f64, *amount);
        canvas.dot(x, y, POINT_RADIUS, PALETTE[i % PALETTE.len()]);
    }

    let (_, avg_y) = frame.point(0.0, average);
    canvas.line(frame.left + 1, avg_y, frame.right, avg_y, RED);
}
