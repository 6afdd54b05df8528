//! Configuration file support for analysis runs.
//!
//! Allows loading run settings from TOML files for reproducibility.

use crate::batch::{BatchConfig, DEFAULT_TICKERS};
use crate::data::DateAnchor;
use crate::eda::EdaConfig;
use crate::indicators::IndicatorConfig;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Complete analysis configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisFileConfig {
    /// Correlation batch settings.
    #[serde(default)]
    pub pipeline: PipelineSettings,
    /// Technical indicator periods.
    #[serde(default)]
    pub indicators: IndicatorSettings,
    /// Per-stock metric settings.
    #[serde(default)]
    pub metrics: MetricsSettings,
    /// News statistics settings.
    #[serde(default)]
    pub eda: EdaSettings,
}

/// Correlation batch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Tickers to process, in order.
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,
    /// Minimum number of aligned dates required to correlate.
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Directory holding the news file and per-ticker price files.
    #[serde(default = "default_input_dir")]
    pub input_dir: String,
    /// Directory receiving all outputs.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// News file name inside `input_dir`.
    #[serde(default = "default_news_file")]
    pub news_file: String,
    /// Timezone used to reduce news timestamps to dates.
    #[serde(default)]
    pub news_dates: DateAnchor,
    #[serde(default)]
    pub show_progress: bool,
}

fn default_tickers() -> Vec<String> { DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect() }
fn default_min_samples() -> usize { 5 }
fn default_input_dir() -> String { "data/raw".to_string() }
fn default_output_dir() -> String { "data/processed".to_string() }
fn default_news_file() -> String { "raw_analyst_ratings.csv".to_string() }

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            min_samples: default_min_samples(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            news_file: default_news_file(),
            news_dates: DateAnchor::Local,
            show_progress: false,
        }
    }
}

/// Technical indicator periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSettings {
    #[serde(default = "default_sma_period")]
    pub sma_period: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
}

fn default_sma_period() -> usize { 20 }
fn default_rsi_period() -> usize { 14 }
fn default_macd_fast() -> usize { 12 }
fn default_macd_slow() -> usize { 26 }
fn default_macd_signal() -> usize { 9 }

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            sma_period: default_sma_period(),
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
        }
    }
}

/// Per-stock metric settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Trading periods per year, used to annualize volatility and Sharpe.
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
}

fn default_periods_per_year() -> f64 { 252.0 }

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            periods_per_year: 252.0,
        }
    }
}

/// News statistics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdaSettings {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_keyword_sample")]
    pub keyword_sample: usize,
}

fn default_top_n() -> usize { 10 }
fn default_keyword_sample() -> usize { 10_000 }

impl Default for EdaSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            keyword_sample: 10_000,
        }
    }
}

impl AnalysisFileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = fs::read_to_string(path)?;
        let config: AnalysisFileConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AnalysisError::ConfigError(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Convert to the batch driver's configuration.
    pub fn to_batch_config(&self) -> Result<BatchConfig> {
        self.validate()?;
        let p = &self.pipeline;

        Ok(BatchConfig {
            tickers: p
                .tickers
                .iter()
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
            min_samples: p.min_samples,
            input_dir: PathBuf::from(&p.input_dir),
            output_dir: PathBuf::from(&p.output_dir),
            news_file: p.news_file.clone(),
            date_anchor: p.news_dates,
            show_progress: p.show_progress,
        })
    }

    /// Convert to validated indicator periods.
    pub fn to_indicator_config(&self) -> Result<IndicatorConfig> {
        let i = &self.indicators;
        let config = IndicatorConfig {
            sma_period: i.sma_period,
            rsi_period: i.rsi_period,
            macd_fast: i.macd_fast,
            macd_slow: i.macd_slow,
            macd_signal: i.macd_signal,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_eda_config(&self) -> EdaConfig {
        EdaConfig {
            top_n: self.eda.top_n,
            keyword_sample: self.eda.keyword_sample,
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        let p = &self.pipeline;
        if p.min_samples < 2 {
            return Err(AnalysisError::ConfigError(format!(
                "min_samples must be at least 2, got {}",
                p.min_samples
            )));
        }
        if p.tickers.iter().all(|t| t.trim().is_empty()) {
            return Err(AnalysisError::ConfigError(
                "at least one ticker is required".to_string(),
            ));
        }

        let ppy = self.metrics.periods_per_year;
        if !ppy.is_finite() || ppy <= 0.0 {
            return Err(AnalysisError::ConfigError(format!(
                "periods_per_year must be positive, got {}",
                ppy
            )));
        }
        if self.eda.top_n == 0 {
            return Err(AnalysisError::ConfigError("top_n must be positive".to_string()));
        }
        self.to_indicator_config()?;
        Ok(())
    }

    /// Generate an example configuration file content.
    pub fn example() -> String {
        r#"# newsquant configuration file
# Sentiment/return correlation, indicators, stock metrics and news statistics

[pipeline]
tickers = ["AAPL", "AMZN", "GOOG", "MSFT", "NVDA", "TSLA", "META"]
min_samples = 5
input_dir = "data/raw"
output_dir = "data/processed"
news_file = "raw_analyst_ratings.csv"
news_dates = "local"    # or "utc"
show_progress = false

[indicators]
sma_period = 20
rsi_period = 14
macd_fast = 12
macd_slow = 26
macd_signal = 9

[metrics]
periods_per_year = 252.0

[eda]
top_n = 10
keyword_sample = 10000
"#.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AnalysisFileConfig::default();
        assert_eq!(config.pipeline.tickers.len(), 7);
        assert_eq!(config.pipeline.min_samples, 5);
        assert_eq!(config.pipeline.news_dates, DateAnchor::Local);
        assert_eq!(config.metrics.periods_per_year, 252.0);
        assert_eq!(config.eda.top_n, 10);
    }

    #[test]
    fn test_load_config() {
        let toml_content = r#"
[pipeline]
tickers = ["aapl", "TSLA"]
min_samples = 8
news_dates = "utc"

[indicators]
sma_period = 50

[metrics]
periods_per_year = 365.0
"#;
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", toml_content).unwrap();

        let config = AnalysisFileConfig::load(file.path()).unwrap();
        assert_eq!(config.pipeline.min_samples, 8);
        assert_eq!(config.pipeline.news_dates, DateAnchor::Utc);
        assert_eq!(config.pipeline.input_dir, "data/raw");
        assert_eq!(config.metrics.periods_per_year, 365.0);
        assert_eq!(config.eda.top_n, 10);

        let indicators = config.to_indicator_config().unwrap();
        assert_eq!(indicators.sma_period, 50);
        assert_eq!(indicators.rsi_period, 14);

        let batch = config.to_batch_config().unwrap();
        assert_eq!(batch.tickers, vec!["AAPL", "TSLA"]);
        assert_eq!(batch.date_anchor, DateAnchor::Utc);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AnalysisFileConfig::default();
        config.pipeline.min_samples = 1;
        assert!(matches!(config.to_batch_config(), Err(AnalysisError::ConfigError(_))));

        let mut config = AnalysisFileConfig::default();
        config.pipeline.tickers = vec![];
        assert!(matches!(config.to_batch_config(), Err(AnalysisError::ConfigError(_))));

        let mut config = AnalysisFileConfig::default();
        config.metrics.periods_per_year = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("periods_per_year"));

        let mut config = AnalysisFileConfig::default();
        config.indicators.macd_fast = 30;
        assert!(matches!(config.to_indicator_config(), Err(AnalysisError::ConfigError(_))));
    }

    #[test]
    fn test_save_config() {
        let config = AnalysisFileConfig::default();
        let file = NamedTempFile::new().unwrap();
        config.save(file.path()).unwrap();

        // Verify we can load it back
        let loaded = AnalysisFileConfig::load(file.path()).unwrap();
        assert_eq!(loaded.pipeline.tickers, config.pipeline.tickers);
        assert_eq!(loaded.metrics.periods_per_year, 252.0);
    }

    #[test]
    fn test_example_config_parses() {
        let example = AnalysisFileConfig::example();
        assert!(example.contains("[pipeline]"));
        assert!(example.contains("[metrics]"));

        let parsed: AnalysisFileConfig = toml::from_str(&example).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.eda.keyword_sample, 10_000);
    }
}
