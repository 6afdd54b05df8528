//! Technical indicators over a ticker's close series.
//!
//! The indicator math comes from the `ta` crate. This module owns the
//! configuration, the warm-up masking and the processed-price rows: a value
//! is reported only once its window is full, so the first `period - 1`
//! SMA cells, the first `period` RSI cells and the first
//! `slow + signal - 2` MACD cells are empty.

use crate::error::{AnalysisError, Result, TickerError};
use crate::types::PriceBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ta::indicators::{
    MovingAverageConvergenceDivergence, RelativeStrengthIndex, SimpleMovingAverage,
};
use ta::Next;

/// Indicator periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub sma_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_period: 20,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("sma_period", self.sma_period),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(AnalysisError::ConfigError(format!("{} must be positive", name)));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(AnalysisError::ConfigError(format!(
                "macd_fast ({}) must be below macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        Ok(())
    }

    /// Header of the processed-price table, named after the configured periods.
    pub fn columns(&self) -> [String; 10] {
        [
            "Date".to_string(),
            "Open".to_string(),
            "High".to_string(),
            "Low".to_string(),
            "Close".to_string(),
            "Volume".to_string(),
            format!("SMA_{}", self.sma_period),
            format!("RSI_{}", self.rsi_period),
            "MACD".to_string(),
            "MACD_Signal".to_string(),
        ]
    }

    fn macd_warmup(&self) -> usize {
        self.macd_slow + self.macd_signal - 2
    }
}

/// One bar of the processed-price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub sma: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

/// Validated indicator set, reusable across tickers.
#[derive(Debug, Clone)]
pub struct Indicators {
    config: IndicatorConfig,
    sma: SimpleMovingAverage,
    rsi: RelativeStrengthIndex,
    macd: MovingAverageConvergenceDivergence,
}

fn ta_error(name: &str, e: ta::errors::TaError) -> AnalysisError {
    AnalysisError::ConfigError(format!("invalid {} parameters: {:?}", name, e))
}

impl Indicators {
    pub fn new(config: IndicatorConfig) -> Result<Self> {
        config.validate()?;
        let sma =
            SimpleMovingAverage::new(config.sma_period).map_err(|e| ta_error("SMA", e))?;
        let rsi =
            RelativeStrengthIndex::new(config.rsi_period).map_err(|e| ta_error("RSI", e))?;
        let macd = MovingAverageConvergenceDivergence::new(
            config.macd_fast,
            config.macd_slow,
            config.macd_signal,
        )
        .map_err(|e| ta_error("MACD", e))?;

        Ok(Self {
            config,
            sma,
            rsi,
            macd,
        })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Run every indicator over date-sorted bars, one row per bar.
    ///
    /// A ticker with any non-positive close is rejected with
    /// [`TickerError::InvalidPrices`].
    pub fn compute(
        &self,
        bars: &[PriceBar],
    ) -> std::result::Result<Vec<IndicatorRow>, TickerError> {
        let invalid = bars.iter().filter(|b| !b.has_valid_close()).count();
        if invalid > 0 {
            return Err(TickerError::InvalidPrices { count: invalid });
        }

        // Fresh state per series.
        let mut sma = self.sma.clone();
        let mut rsi = self.rsi.clone();
        let mut macd = self.macd.clone();
        let macd_warmup = self.config.macd_warmup();

        let rows = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let sma_value = sma.next(bar.close);
                let rsi_value = rsi.next(bar.close);
                let macd_value = macd.next(bar.close);

                IndicatorRow {
                    date: bar.date,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: bar.volume,
                    sma: (i + 1 >= self.config.sma_period).then_some(sma_value),
                    rsi: (i >= self.config.rsi_period).then_some(rsi_value),
                    macd: (i >= macd_warmup).then_some(macd_value.macd),
                    macd_signal: (i >= macd_warmup).then_some(macd_value.signal),
                }
            })
            .collect();

        Ok(rows)
    }
}
