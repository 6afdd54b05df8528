//! Batch driver.
//!
//! Runs the per-ticker pass (load prices, align, correlate, persist) over a
//! configured ticker list. Every per-ticker failure is a [`TickerError`]:
//! it is logged, recorded in the [`BatchReport`] and the next ticker runs.
//! Only a news file that cannot be loaded aborts the run.

use crate::align::align_ticker;
use crate::analytics::StockMetrics;
use crate::correlation::CorrelationReporter;
use crate::data::{self, DataConfig, DateAnchor};
use crate::eda::{self, EdaConfig, NewsSummary};
use crate::error::{Result, TickerError};
use crate::export;
use crate::indicators::{IndicatorConfig, IndicatorRow, Indicators};
use crate::sentiment::PolarityScorer;
use crate::types::{CorrelationResult, NewsRecord};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Tickers processed when none are configured.
pub const DEFAULT_TICKERS: [&str; 7] = ["AAPL", "AMZN", "GOOG", "MSFT", "NVDA", "TSLA", "META"];

/// File name of the news statistics summary.
pub const NEWS_SUMMARY_FILE: &str = "news_summary.json";

/// Batch run configuration.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Tickers to process, in order.
    pub tickers: Vec<String>,
    /// Minimum aligned dates required to correlate.
    pub min_samples: usize,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// News file name inside `input_dir`.
    pub news_file: String,
    pub date_anchor: DateAnchor,
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            min_samples: 5,
            input_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("data/processed"),
            news_file: "raw_analyst_ratings.csv".to_string(),
            date_anchor: DateAnchor::Local,
            show_progress: false,
        }
    }
}

impl BatchConfig {
    pub fn news_path(&self) -> PathBuf {
        self.input_dir.join(&self.news_file)
    }

    fn data_config(&self) -> DataConfig {
        DataConfig {
            delimiter: None,
            date_anchor: self.date_anchor,
        }
    }
}

/// A ticker that produced no result, and why.
#[derive(Debug)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: TickerError,
}

/// Outcome of a correlation batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successful tickers, in configured order.
    pub results: Vec<CorrelationResult>,
    pub skipped: Vec<SkippedTicker>,
}

impl BatchReport {
    pub fn result_for(&self, ticker: &str) -> Option<&CorrelationResult> {
        self.results.iter().find(|r| r.ticker == ticker)
    }

    pub fn skip_for(&self, ticker: &str) -> Option<&SkippedTicker> {
        self.skipped.iter().find(|s| s.ticker == ticker)
    }
}

/// Outcome of a metrics batch.
#[derive(Debug, Default)]
pub struct MetricsReport {
    pub metrics: Vec<StockMetrics>,
    pub skipped: Vec<SkippedTicker>,
}

/// A processed-price table written for one ticker.
#[derive(Debug, Clone)]
pub struct ProcessedTicker {
    pub ticker: String,
    pub path: PathBuf,
    pub rows: usize,
    /// Last bar with its indicator values.
    pub latest: Option<IndicatorRow>,
}

/// Outcome of an indicator batch.
#[derive(Debug, Default)]
pub struct IndicatorReport {
    pub processed: Vec<ProcessedTicker>,
    pub skipped: Vec<SkippedTicker>,
}

impl IndicatorReport {
    pub fn skip_for(&self, ticker: &str) -> Option<&SkippedTicker> {
        self.skipped.iter().find(|s| s.ticker == ticker)
    }
}

fn progress_bar(len: usize, enabled: bool) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    Some(pb)
}

/// Split per-ticker outcomes into results and skips, logging each skip.
fn partition<T>(
    outcomes: Vec<(String, std::result::Result<T, TickerError>)>,
) -> (Vec<T>, Vec<SkippedTicker>) {
    let mut ok = Vec::new();
    let mut skipped = Vec::new();
    for (ticker, outcome) in outcomes {
        match outcome {
            Ok(value) => ok.push(value),
            Err(reason) => {
                warn!("Skipping {}: {}", ticker, reason);
                skipped.push(SkippedTicker { ticker, reason });
            }
        }
    }
    (ok, skipped)
}

/// Sentiment/return correlation batch driver.
pub struct BatchDriver {
    config: BatchConfig,
    scorer: Box<dyn PolarityScorer>,
    reporter: CorrelationReporter,
}

impl BatchDriver {
    pub fn new(config: BatchConfig, scorer: Box<dyn PolarityScorer>) -> Self {
        let reporter = CorrelationReporter::new(config.output_dir.clone());
        Self {
            config,
            scorer,
            reporter,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Load the news file and process every configured ticker.
    pub fn run(&self) -> Result<BatchReport> {
        let news = data::load_news(self.config.news_path(), &self.config.data_config())?;
        info!(
            "Loaded {} news rows; tickers present: {}",
            news.len(),
            data::news_tickers(&news).join(", ")
        );

        let report = self.run_with_news(&news);

        fs::create_dir_all(&self.config.output_dir)?;
        let summary_path = self.config.output_dir.join(export::CORRELATION_SUMMARY_FILE);
        export::write_correlation_summary(&summary_path, &report.results)?;
        info!(
            "{} correlated, {} skipped; summary written to {}",
            report.results.len(),
            report.skipped.len(),
            summary_path.display()
        );

        Ok(report)
    }

    /// Process every configured ticker against already-loaded news.
    pub fn run_with_news(&self, news: &[NewsRecord]) -> BatchReport {
        let pb = progress_bar(self.config.tickers.len(), self.config.show_progress);

        let mut outcomes = Vec::with_capacity(self.config.tickers.len());
        for ticker in &self.config.tickers {
            info!("Processing {}", ticker);
            if let Some(pb) = &pb {
                pb.set_message(ticker.clone());
            }
            outcomes.push((ticker.clone(), self.run_ticker(news, ticker)));
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let (results, skipped) = partition(outcomes);
        BatchReport { results, skipped }
    }

    /// Run the full pass for one ticker.
    pub fn run_ticker(
        &self,
        news: &[NewsRecord],
        ticker: &str,
    ) -> std::result::Result<CorrelationResult, TickerError> {
        let price_path = data::price_file_path(&self.config.input_dir, ticker);
        if !price_path.exists() {
            return Err(TickerError::MissingFile { path: price_path });
        }

        let bars = data::load_prices(&price_path, &self.config.data_config())
            .map_err(TickerError::Load)?;

        let alignment = align_ticker(
            news,
            &bars,
            ticker,
            self.scorer.as_ref(),
            self.config.min_samples,
        )?;

        self.reporter.report(&alignment)
    }
}

/// Compute return metrics for each ticker and write `stock_metrics.csv`.
pub fn run_metrics(config: &BatchConfig, periods_per_year: f64) -> Result<MetricsReport> {
    let pb = progress_bar(config.tickers.len(), config.show_progress);

    let mut outcomes = Vec::with_capacity(config.tickers.len());
    for ticker in &config.tickers {
        outcomes.push((ticker.clone(), metrics_ticker(config, periods_per_year, ticker)));
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let (metrics, skipped) = partition(outcomes);

    fs::create_dir_all(&config.output_dir)?;
    let path = config.output_dir.join(export::STOCK_METRICS_FILE);
    export::write_stock_metrics(&path, &metrics)?;
    info!("{} tickers measured; metrics written to {}", metrics.len(), path.display());

    Ok(MetricsReport { metrics, skipped })
}

fn metrics_ticker(
    config: &BatchConfig,
    periods_per_year: f64,
    ticker: &str,
) -> std::result::Result<StockMetrics, TickerError> {
    let price_path = data::price_file_path(&config.input_dir, ticker);
    if !price_path.exists() {
        return Err(TickerError::MissingFile { path: price_path });
    }

    let bars = data::load_prices(&price_path, &config.data_config()).map_err(TickerError::Load)?;
    StockMetrics::from_bars(ticker, &bars, periods_per_year)
}

/// Compute indicators per ticker and write `<T>_processed.csv` for each.
///
/// Invalid indicator periods abort the run before any ticker is read.
pub fn run_indicators(
    config: &BatchConfig,
    indicators: &IndicatorConfig,
) -> Result<IndicatorReport> {
    let indicators = Indicators::new(indicators.clone())?;
    fs::create_dir_all(&config.output_dir)?;
    let pb = progress_bar(config.tickers.len(), config.show_progress);

    let mut outcomes = Vec::with_capacity(config.tickers.len());
    for ticker in &config.tickers {
        info!("Computing indicators for {}", ticker);
        outcomes.push((ticker.clone(), indicators_ticker(config, &indicators, ticker)));
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let (processed, skipped) = partition(outcomes);
    info!(
        "{} processed price tables written to {}",
        processed.len(),
        config.output_dir.display()
    );
    Ok(IndicatorReport { processed, skipped })
}

fn indicators_ticker(
    config: &BatchConfig,
    indicators: &Indicators,
    ticker: &str,
) -> std::result::Result<ProcessedTicker, TickerError> {
    let price_path = data::price_file_path(&config.input_dir, ticker);
    if !price_path.exists() {
        return Err(TickerError::MissingFile { path: price_path });
    }

    let bars = data::load_prices(&price_path, &config.data_config()).map_err(TickerError::Load)?;
    let rows = indicators.compute(&bars)?;

    let path = export::processed_path(&config.output_dir, ticker);
    export::write_processed(&path, indicators.config(), &rows).map_err(TickerError::Persist)?;

    Ok(ProcessedTicker {
        ticker: ticker.to_string(),
        path,
        rows: rows.len(),
        latest: rows.last().cloned(),
    })
}

/// Load the news file, summarize it and write `news_summary.json`.
pub fn run_news_summary(config: &BatchConfig, eda_config: &EdaConfig) -> Result<NewsSummary> {
    let news = data::load_news(config.news_path(), &config.data_config())?;
    let summary = eda::summarize(&news, eda_config);

    fs::create_dir_all(&config.output_dir)?;
    let path = config.output_dir.join(NEWS_SUMMARY_FILE);
    export::write_json(&path, &summary)?;
    info!("News summary written to {}", path.display());

    Ok(summary)
}
