//! Core record types shared by the pipeline stages.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single news headline attached to a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub headline: String,
    pub publisher: String,
    /// Full publication timestamp with its original offset.
    pub published_at: DateTime<FixedOffset>,
    /// Canonical grouping key produced by the date normalizer.
    pub date: NaiveDate,
    pub stock: String,
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: Option<f64>,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            adj_close: None,
        }
    }

    /// Close is usable for returns and metrics.
    pub fn has_valid_close(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Mean headline polarity for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub mean_sentiment: f64,
    pub headline_count: usize,
}

/// Close-to-close percentage return ending on `date`.
///
/// `pct_return` is `None` when either close of the gap is non-positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub close: f64,
    pub pct_return: Option<f64>,
}

/// A date present on both the sentiment and the return side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPoint {
    pub date: NaiveDate,
    pub mean_sentiment: f64,
    pub pct_return: f64,
}

/// Sentiment and returns for one ticker reduced to their common dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSeries {
    pub ticker: String,
    pub points: Vec<AlignedPoint>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn sentiments(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.mean_sentiment).collect()
    }

    pub fn returns(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.pct_return).collect()
    }
}

/// Outcome of the correlation study for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub ticker: String,
    pub pearson_r: f64,
    pub p_value: f64,
    pub sample_size: usize,
}

impl CorrelationResult {
    /// Significant at the given two-sided alpha.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

impl fmt::Display for CorrelationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pearson correlation ({}): {:.3}, p-value: {:.3} (n={})",
            self.ticker, self.pearson_r, self.p_value, self.sample_size
        )
    }
}
