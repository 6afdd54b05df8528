//! Flat-file writers for everything the pipeline persists.
//!
//! | File | Contents |
//! |------|----------|
//! | `<T>_news_aligned.csv` | headlines for the ticker with their polarity |
//! | `<T>_daily_sentiment.csv` | mean polarity per date |
//! | `<T>_stock_returns.csv` | defined daily returns |
//! | `correlation_summary.csv` | one row per correlated ticker |
//! | `stock_metrics.csv` | return/volatility metrics per ticker |
//! | `<T>_processed.csv` | OHLCV with SMA, RSI, MACD and signal columns |
//!
//! JSON summaries go through [`write_json`].

use crate::align::ScoredHeadline;
use crate::analytics::StockMetrics;
use crate::error::Result;
use crate::indicators::{IndicatorConfig, IndicatorRow};
use crate::types::{CorrelationResult, DailyReturn, DailySentiment};
use chrono::NaiveDate;
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// File name of the cross-ticker correlation summary.
pub const CORRELATION_SUMMARY_FILE: &str = "correlation_summary.csv";

/// File name of the cross-ticker metrics table.
pub const STOCK_METRICS_FILE: &str = "stock_metrics.csv";

#[derive(Serialize)]
struct NewsAlignedRow<'a> {
    headline: &'a str,
    publisher: &'a str,
    date: NaiveDate,
    stock: &'a str,
    sentiment: f64,
}

#[derive(Serialize)]
struct DailySentimentRow {
    date: NaiveDate,
    sentiment: f64,
    headline_count: usize,
}

#[derive(Serialize)]
struct StockReturnRow {
    date: NaiveDate,
    close: f64,
    daily_return: f64,
}

/// The three audit tables written for one ticker.
#[derive(Debug, Clone)]
pub struct TickerOutputs {
    pub news_aligned: PathBuf,
    pub daily_sentiment: PathBuf,
    pub stock_returns: PathBuf,
}

impl TickerOutputs {
    pub fn new(output_dir: impl AsRef<Path>, ticker: &str) -> Self {
        let dir = output_dir.as_ref();
        Self {
            news_aligned: dir.join(format!("{}_news_aligned.csv", ticker)),
            daily_sentiment: dir.join(format!("{}_daily_sentiment.csv", ticker)),
            stock_returns: dir.join(format!("{}_stock_returns.csv", ticker)),
        }
    }

    pub fn write_news_aligned(&self, news: &[ScoredHeadline]) -> Result<()> {
        let mut writer = Writer::from_path(&self.news_aligned)?;
        for item in news {
            writer.serialize(NewsAlignedRow {
                headline: &item.record.headline,
                publisher: &item.record.publisher,
                date: item.record.date,
                stock: &item.record.stock,
                sentiment: item.sentiment,
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_daily_sentiment(&self, daily: &[DailySentiment]) -> Result<()> {
        let mut writer = Writer::from_path(&self.daily_sentiment)?;
        for day in daily {
            writer.serialize(DailySentimentRow {
                date: day.date,
                sentiment: day.mean_sentiment,
                headline_count: day.headline_count,
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Undefined returns are left out.
    pub fn write_stock_returns(&self, returns: &[DailyReturn]) -> Result<()> {
        let mut writer = Writer::from_path(&self.stock_returns)?;
        for ret in returns {
            if let Some(daily_return) = ret.pct_return {
                writer.serialize(StockReturnRow {
                    date: ret.date,
                    close: ret.close,
                    daily_return,
                })?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

/// Write one row per correlated ticker.
pub fn write_correlation_summary(
    path: impl AsRef<Path>,
    results: &[CorrelationResult],
) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write one row of return/volatility metrics per ticker.
pub fn write_stock_metrics(path: impl AsRef<Path>, metrics: &[StockMetrics]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    for m in metrics {
        writer.serialize(m)?;
    }
    writer.flush()?;
    Ok(())
}

/// Path of a ticker's processed-price table.
pub fn processed_path(output_dir: impl AsRef<Path>, ticker: &str) -> PathBuf {
    output_dir.as_ref().join(format!("{}_processed.csv", ticker))
}

/// Write OHLCV plus indicator columns; warm-up cells are left empty.
pub fn write_processed(
    path: impl AsRef<Path>,
    config: &IndicatorConfig,
    rows: &[IndicatorRow],
) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(config.columns())?;
    for row in rows {
        writer.serialize((
            row.date,
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume,
            row.sma,
            row.rsi,
            row.macd,
            row.macd_signal,
        ))?;
    }
    writer.flush()?;
    Ok(())
}

/// Pretty-print any serializable value to a JSON file.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}
