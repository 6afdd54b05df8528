//! newsquant - Correlate financial news sentiment with daily stock returns.
//!
//! # Overview
//!
//! newsquant is a batch analysis tool over two flat-file datasets: a corpus
//! of dated, ticker-tagged news headlines and one daily price file per
//! ticker. For each ticker it:
//!
//! - **Scores headlines**: VADER compound polarity in [-1, 1]
//! - **Aggregates by day**: mean polarity per calendar date
//! - **Computes returns**: close-to-close percentage change
//! - **Aligns**: inner join of daily sentiment and returns on date
//! - **Correlates**: Pearson r with a two-sided Student-t p-value
//! - **Persists**: every intermediate table as CSV for auditing
//!
//! Failures are isolated per ticker: a missing price file, a ticker without
//! news, too few overlapping dates or a constant column skips that ticker
//! only, and the reason ends up in the [`batch::BatchReport`].
//!
//! Alongside the correlation study the crate computes technical indicators
//! (SMA, RSI, MACD), per-stock return and risk metrics and descriptive
//! statistics of the news corpus.
//!
//! # Quick Start
//!
//! ```no_run
//! use newsquant::batch::{BatchConfig, BatchDriver};
//! use newsquant::sentiment::VaderScorer;
//!
//! let config = BatchConfig {
//!     tickers: vec!["AAPL".to_string(), "TSLA".to_string()],
//!     ..Default::default()
//! };
//! let driver = BatchDriver::new(config, Box::new(VaderScorer::new()));
//!
//! let report = driver.run().unwrap();
//! for result in &report.results {
//!     println!("{}", result);
//! }
//! for skip in &report.skipped {
//!     println!("skipped {}: {}", skip.ticker, skip.reason);
//! }
//! ```
//!
//! # Custom Scorers
//!
//! Implement [`sentiment::PolarityScorer`] to plug in another model:
//!
//! ```
//! use newsquant::sentiment::PolarityScorer;
//!
//! struct Bullish;
//!
//! impl PolarityScorer for Bullish {
//!     fn name(&self) -> &str {
//!         "bullish"
//!     }
//!
//!     fn score(&self, text: &str) -> f64 {
//!         if text.contains("beat") { 1.0 } else { 0.0 }
//!     }
//! }
//!
//! assert_eq!(Bullish.score("Earnings beat estimates"), 1.0);
//! ```
//!
//! # Modules
//!
//! - [`types`]: Core records (NewsRecord, PriceBar, DailySentiment, DailyReturn, CorrelationResult)
//! - [`error`]: Run-level and per-ticker error types
//! - [`config`]: TOML configuration file support
//! - [`data`]: CSV loading, schema checks and date normalization
//! - [`sentiment`]: Polarity scoring
//! - [`returns`]: Daily percentage returns
//! - [`align`]: Per-ticker sentiment/return alignment
//! - [`correlation`]: Pearson correlation and per-ticker persistence
//! - [`export`]: Flat-file writers
//! - [`batch`]: Batch driver
//! - [`indicators`]: SMA, RSI and MACD columns for the processed-price table
//! - [`analytics`]: Per-stock metrics and terminal reporting
//! - [`eda`]: News corpus statistics

pub mod align;
pub mod analytics;
pub mod batch;
pub mod config;
pub mod correlation;
pub mod data;
pub mod eda;
pub mod error;
pub mod export;
pub mod indicators;
pub mod returns;
pub mod sentiment;
pub mod types;

// Re-exports for convenience
pub use align::{align_ticker, TickerAlignment};
pub use analytics::{ResultFormatter, StockMetrics};
pub use batch::{BatchConfig, BatchDriver, BatchReport, SkippedTicker};
pub use config::AnalysisFileConfig;
pub use correlation::{correlate, pearson, CorrelationReporter};
pub use data::{load_news, load_prices, normalize_date, DataConfig, DateAnchor};
pub use error::{AnalysisError, Result, TickerError};
pub use indicators::{IndicatorConfig, Indicators};
pub use returns::compute_returns;
pub use sentiment::{PolarityScorer, VaderScorer};
pub use types::{
    AlignedPoint, AlignedSeries, CorrelationResult, DailyReturn, DailySentiment, NewsRecord,
    PriceBar,
};
