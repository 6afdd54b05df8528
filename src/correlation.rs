//! Pearson correlation between daily sentiment and daily returns.
//!
//! Sample variance and covariance come from `statrs` statistics, and the
//! two-sided p-value from its Student-t distribution. Constant columns are
//! rejected as [`TickerError::DegenerateSeries`] before any division happens.

use crate::align::TickerAlignment;
use crate::error::{AnalysisError, TickerError};
use crate::export::TickerOutputs;
use crate::types::{AlignedSeries, CorrelationResult};
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sample variance, or `DegenerateSeries` if it is numerically zero.
fn spread(values: &[f64], column: &'static str) -> Result<f64, TickerError> {
    let variance = values.iter().copied().variance();
    let scale = values.iter().map(|v| v * v).mean();

    if !variance.is_finite() || variance <= f64::EPSILON * scale {
        return Err(TickerError::DegenerateSeries { column });
    }
    Ok(variance)
}

/// Two-sided p-value for a correlation of `r` over `n` samples.
fn p_value(r: f64, n: usize) -> Result<f64, TickerError> {
    if n <= 2 {
        return Ok(1.0);
    }

    let df = (n - 2) as f64;
    let denom = 1.0 - r * r;
    if denom <= 0.0 {
        return Ok(0.0);
    }

    let t = r * (df / denom).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|_| TickerError::InsufficientSamples {
        found: n,
        required: 3,
    })?;

    Ok((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Pearson r and two-sided p-value, labelling each column for error reports.
pub fn pearson_named(
    x: &[f64],
    x_name: &'static str,
    y: &[f64],
    y_name: &'static str,
) -> Result<(f64, f64), TickerError> {
    let n = x.len();
    if n != y.len() || n < 2 {
        return Err(TickerError::InsufficientSamples {
            found: n.min(y.len()),
            required: 2,
        });
    }

    let var_x = spread(x, x_name)?;
    let var_y = spread(y, y_name)?;
    let cov = x.iter().copied().covariance(y.iter().copied());

    let r = (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0);
    let p = p_value(r, n)?;
    Ok((r, p))
}

/// Pearson r and two-sided p-value between two equal-length series.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<(f64, f64), TickerError> {
    pearson_named(x, "x", y, "y")
}

/// Correlate the sentiment and return columns of an aligned series.
pub fn correlate(series: &AlignedSeries) -> Result<CorrelationResult, TickerError> {
    let sentiment = series.sentiments();
    let returns = series.returns();
    let (pearson_r, p_value) = pearson_named(&sentiment, "sentiment", &returns, "return")?;

    Ok(CorrelationResult {
        ticker: series.ticker.clone(),
        pearson_r,
        p_value,
        sample_size: series.len(),
    })
}

/// Computes correlations and persists the intermediate tables per ticker.
#[derive(Debug, Clone)]
pub struct CorrelationReporter {
    output_dir: PathBuf,
}

impl CorrelationReporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Correlate, then write the aligned news, daily sentiment and return tables.
    ///
    /// Nothing is written for a degenerate series.
    pub fn report(&self, alignment: &TickerAlignment) -> Result<CorrelationResult, TickerError> {
        let result = correlate(&alignment.series)?;

        self.persist(alignment).map_err(TickerError::Persist)?;

        info!(
            "Pearson correlation ({}): {:.3}, p-value: {:.3}",
            result.ticker, result.pearson_r, result.p_value
        );
        Ok(result)
    }

    fn persist(&self, alignment: &TickerAlignment) -> Result<(), AnalysisError> {
        fs::create_dir_all(&self.output_dir)?;

        let outputs = TickerOutputs::new(&self.output_dir, &alignment.ticker);
        outputs.write_news_aligned(&alignment.news)?;
        outputs.write_daily_sentiment(&alignment.daily_sentiment)?;
        outputs.write_stock_returns(&alignment.returns)?;

        debug!(
            "Wrote {}, {}, {}",
            outputs.news_aligned.display(),
            outputs.daily_sentiment.display(),
            outputs.stock_returns.display()
        );
        Ok(())
    }
}
