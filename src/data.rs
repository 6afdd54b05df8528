//! Data loading and date normalization.
//!
//! Both source files are read with the `csv` crate into typed rows. Header
//! names are matched case-insensitively and checked up front, so a schema
//! mismatch surfaces as [`AnalysisError::MissingColumns`] instead of a
//! failure somewhere downstream. Rows whose date cannot be parsed are
//! dropped and counted.

use crate::error::{AnalysisError, Result};
use crate::types::{NewsRecord, PriceBar};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Columns the news file must provide.
pub const NEWS_COLUMNS: [&str; 4] = ["headline", "publisher", "date", "stock"];

/// Columns every price file must provide.
pub const PRICE_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Suffix of per-ticker price files.
pub const PRICE_FILE_SUFFIX: &str = "_historical_data.csv";

/// Which timezone a timestamp is truncated in when reducing it to a date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateAnchor {
    /// Calendar date in the timestamp's own offset.
    #[default]
    Local,
    /// Calendar date after conversion to UTC.
    Utc,
}

impl DateAnchor {
    /// Truncate a timestamp to its calendar date under this anchor.
    pub fn date_of(&self, ts: &DateTime<FixedOffset>) -> NaiveDate {
        match self {
            DateAnchor::Local => ts.date_naive(),
            DateAnchor::Utc => ts.naive_utc().date(),
        }
    }
}

/// Data source configuration.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// CSV delimiter character. If None, delimiter is auto-detected.
    pub delimiter: Option<u8>,
    /// How news timestamps are reduced to dates.
    pub date_anchor: DateAnchor,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            date_anchor: DateAnchor::Local,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsRow {
    headline: String,
    #[serde(default)]
    publisher: String,
    date: String,
    stock: String,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    #[serde(rename = "adj close", alias = "adj_close", default)]
    adj_close: Option<f64>,
}

const OFFSET_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

const NAIVE_DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// Month-first before day-first for slash dates.
const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
];

/// Parse a timestamp in any of the supported representations.
///
/// Offsets are preserved. Naive datetimes and bare dates are taken as UTC
/// (bare dates at midnight). Empty or malformed input yields `None`.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    for fmt in &OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in &NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.fix().from_utc_datetime(&dt));
        }
    }

    for fmt in &DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d
                .and_hms_opt(0, 0, 0)
                .map(|dt| Utc.fix().from_utc_datetime(&dt));
        }
    }

    None
}

/// Reduce a raw date string to its canonical calendar date.
///
/// Two timestamps on the same day compare equal regardless of time of day.
/// Normalizing an already canonical `YYYY-MM-DD` string returns it unchanged.
pub fn normalize_date(s: &str, anchor: DateAnchor) -> Option<NaiveDate> {
    parse_timestamp(s).map(|ts| anchor.date_of(&ts))
}

/// Parse a price-file date, which may come in mixed formats within one file.
pub fn parse_price_date(s: &str) -> Option<NaiveDate> {
    parse_timestamp(s).map(|ts| ts.date_naive())
}

/// Detect the CSV delimiter by analyzing the first few lines of the file.
///
/// Tries common delimiters (comma, tab, semicolon, pipe) and returns the one
/// that produces the most consistent column count with at least `min_fields`
/// fields. Falls back to a comma.
fn detect_delimiter(path: &Path, min_fields: usize) -> Result<u8> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let lines: Vec<String> = reader.lines().take(5).filter_map(|l| l.ok()).collect();

    if lines.is_empty() {
        return Ok(b',');
    }

    let delimiters = [b',', b'\t', b';', b'|'];
    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in &delimiters {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| line.as_bytes().iter().filter(|&&b| b == delim).count() + 1)
            .collect();

        let first_count = counts[0];
        let all_consistent = counts.iter().all(|&c| c == first_count);

        if all_consistent && first_count >= min_fields && first_count > best_score {
            best_score = first_count;
            best_delimiter = delim;
        }
    }

    // Free text with embedded delimiters breaks consistency; judge by header.
    if best_score == 0 {
        for &delim in &delimiters {
            let count = lines[0].as_bytes().iter().filter(|&&b| b == delim).count() + 1;
            if count >= min_fields {
                return Ok(delim);
            }
        }
    }

    debug!(
        "Detected delimiter {:?} with score {}",
        best_delimiter as char, best_score
    );
    Ok(best_delimiter)
}

/// Open a reader with lowercased headers and verify the required columns.
fn open_checked(
    path: &Path,
    config: &DataConfig,
    required: &[&str],
) -> Result<csv::Reader<File>> {
    let delimiter = match config.delimiter {
        Some(d) => d,
        None => detect_delimiter(path, required.len())?,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?;

    let headers: StringRecord = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let missing: Vec<String> = required
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(AnalysisError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }

    reader.set_headers(headers);
    Ok(reader)
}

/// Load the news / analyst-ratings file.
///
/// A missing file, an unreadable file or a file lacking any of
/// [`NEWS_COLUMNS`] is an error. Rows with unparseable dates are dropped;
/// a file left with no usable rows loads as empty, so every ticker is later
/// skipped for lack of news instead of the run aborting.
pub fn load_news(path: impl AsRef<Path>, config: &DataConfig) -> Result<Vec<NewsRecord>> {
    let path = path.as_ref();
    info!("Loading news from: {}", path.display());

    if !path.is_file() {
        return Err(AnalysisError::NoData(format!(
            "news file not found: {}",
            path.display()
        )));
    }

    let mut reader = open_checked(path, config, &NEWS_COLUMNS)?;

    let mut records = Vec::new();
    let mut malformed = 0;
    let mut bad_dates = 0;

    for (row_num, result) in reader.deserialize::<NewsRow>().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping news row {}: {}", row_num + 1, e);
                malformed += 1;
                continue;
            }
        };

        let Some(published_at) = parse_timestamp(&row.date) else {
            debug!(
                "Dropping news row {} with unparseable date '{}'",
                row_num + 1,
                row.date
            );
            bad_dates += 1;
            continue;
        };

        records.push(NewsRecord {
            headline: row.headline,
            publisher: row.publisher,
            date: config.date_anchor.date_of(&published_at),
            published_at,
            stock: row.stock.trim().to_string(),
        });
    }

    if malformed > 0 {
        warn!("Skipped {} malformed news rows", malformed);
    }
    if bad_dates > 0 {
        warn!("Dropped {} news rows with unparseable dates", bad_dates);
    }

    if records.is_empty() {
        warn!("No usable news rows in {}", path.display());
    } else {
        info!("Loaded {} news records", records.len());
    }
    Ok(records)
}

/// Load one ticker's daily price history, sorted by date.
pub fn load_prices(path: impl AsRef<Path>, config: &DataConfig) -> Result<Vec<PriceBar>> {
    let path = path.as_ref();
    info!("Loading prices from: {}", path.display());

    let mut reader = open_checked(path, config, &PRICE_COLUMNS)?;

    let mut bars = Vec::new();
    let mut skipped = 0;

    for (row_num, result) in reader.deserialize::<PriceRow>().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping price row {}: {}", row_num + 1, e);
                skipped += 1;
                continue;
            }
        };

        let Some(date) = parse_price_date(&row.date) else {
            debug!(
                "Skipping price row {} due to date parse error: '{}'",
                row_num + 1,
                row.date
            );
            skipped += 1;
            continue;
        };

        if !row.volume.is_finite() || row.volume < 0.0 {
            debug!("Skipping price row {} with volume {}", row_num + 1, row.volume);
            skipped += 1;
            continue;
        }

        bars.push(PriceBar {
            date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.round() as u64,
            adj_close: row.adj_close,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} invalid price rows in {}", skipped, path.display());
    }

    bars.sort_by_key(|b| b.date);

    let original_len = bars.len();
    bars.dedup_by_key(|b| b.date);
    if bars.len() < original_len {
        warn!("Removed {} duplicate dates", original_len - bars.len());
    }

    if bars.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "no usable price rows in {}",
            path.display()
        )));
    }

    info!(
        "Loaded {} bars from {} to {}",
        bars.len(),
        bars.first().map(|b| b.date.to_string()).unwrap_or_default(),
        bars.last().map(|b| b.date.to_string()).unwrap_or_default()
    );

    Ok(bars)
}

/// Path of a ticker's price file inside `input_dir`.
pub fn price_file_path(input_dir: impl AsRef<Path>, ticker: &str) -> PathBuf {
    input_dir
        .as_ref()
        .join(format!("{}{}", ticker, PRICE_FILE_SUFFIX))
}

/// Find every ticker that has a price file in `input_dir`, sorted.
pub fn discover_tickers(input_dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = input_dir.as_ref();

    if !dir.is_dir() {
        return Err(AnalysisError::NoData(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let pattern = dir.join(format!("*{}", PRICE_FILE_SUFFIX));
    let pattern = pattern.to_string_lossy();
    debug!("Discovering price files matching: {}", pattern);

    let paths = glob::glob(&pattern)
        .map_err(|e| AnalysisError::ConfigError(format!("Invalid glob pattern: {}", e)))?;

    let mut tickers = BTreeSet::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                let ticker = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .and_then(|s| s.strip_suffix(PRICE_FILE_SUFFIX));
                match ticker {
                    Some(t) if !t.is_empty() && t != "raw_analyst_ratings" => {
                        tickers.insert(t.to_string());
                    }
                    _ => debug!("Ignoring {}", path.display()),
                }
            }
            Err(e) => warn!("Glob error: {}", e),
        }
    }

    info!("Discovered {} tickers in {}", tickers.len(), dir.display());
    Ok(tickers.into_iter().collect())
}

/// Distinct ticker symbols present in the news data, sorted.
pub fn news_tickers(news: &[NewsRecord]) -> Vec<String> {
    news.iter()
        .map(|r| r.stock.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
