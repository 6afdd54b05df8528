//! Per-stock return metrics and terminal reporting.

use crate::batch::{BatchReport, ProcessedTicker};
use crate::eda::NewsSummary;
use crate::error::TickerError;
use crate::types::{CorrelationResult, PriceBar};
use chrono::NaiveDate;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tabled::{builder::Builder, settings::Style};

/// Return and risk summary of one ticker's close series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetrics {
    pub ticker: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Number of bars in the series.
    pub trading_days: usize,
    /// Last close over first close, in percent.
    pub total_return_pct: f64,
    pub mean_daily_return_pct: f64,
    /// Sample standard deviation of daily returns, in percent.
    pub daily_volatility_pct: f64,
    pub annualized_volatility_pct: f64,
    /// Largest peak-to-trough decline of the close, as a positive percent.
    pub max_drawdown_pct: f64,
    /// Annualized Sharpe ratio with a zero risk-free rate.
    pub sharpe: f64,
}

impl StockMetrics {
    /// Compute metrics from date-sorted bars.
    ///
    /// Needs at least two bars and strictly positive closes.
    pub fn from_bars(
        ticker: impl Into<String>,
        bars: &[PriceBar],
        periods_per_year: f64,
    ) -> Result<Self, TickerError> {
        let invalid = bars.iter().filter(|b| !b.has_valid_close()).count();
        if invalid > 0 {
            return Err(TickerError::InvalidPrices { count: invalid });
        }

        let (first, last) = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) if bars.len() >= 2 => (first, last),
            _ => {
                return Err(TickerError::InsufficientSamples {
                    found: bars.len(),
                    required: 2,
                })
            }
        };

        let returns: Vec<f64> = bars
            .windows(2)
            .map(|w| w[1].close / w[0].close - 1.0)
            .collect();

        let mean = returns.iter().copied().mean();
        let std_dev = Self::sample_std(&returns);
        let sharpe = if std_dev > 0.0 {
            mean / std_dev * periods_per_year.sqrt()
        } else {
            0.0
        };

        Ok(Self {
            ticker: ticker.into(),
            first_date: first.date,
            last_date: last.date,
            trading_days: bars.len(),
            total_return_pct: (last.close / first.close - 1.0) * 100.0,
            mean_daily_return_pct: mean * 100.0,
            daily_volatility_pct: std_dev * 100.0,
            annualized_volatility_pct: std_dev * periods_per_year.sqrt() * 100.0,
            max_drawdown_pct: Self::max_drawdown(bars) * 100.0,
            sharpe,
        })
    }

    fn sample_std(values: &[f64]) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        values.iter().copied().std_dev()
    }

    fn max_drawdown(bars: &[PriceBar]) -> f64 {
        let mut peak = f64::MIN;
        let mut max_dd: f64 = 0.0;
        for bar in bars {
            peak = peak.max(bar.close);
            max_dd = max_dd.max((peak - bar.close) / peak);
        }
        max_dd
    }
}

/// Format results for terminal display.
pub struct ResultFormatter;

impl ResultFormatter {
    /// Print the correlation table followed by any skipped tickers.
    pub fn print_batch_report(report: &BatchReport) {
        println!();
        println!("{}", "═".repeat(60).blue());
        println!("{}", " SENTIMENT / RETURN CORRELATION ".bold().blue());
        println!("{}", "═".repeat(60).blue());
        println!();

        if report.results.is_empty() {
            println!("  {}", "No ticker produced a correlation.".yellow());
        } else {
            for result in &report.results {
                println!(
                    "Pearson Correlation ({}): {:.3}, p-value: {:.3}",
                    result.ticker, result.pearson_r, result.p_value
                );
            }
            println!();
            Self::print_correlation_table(&report.results);
        }

        if !report.skipped.is_empty() {
            println!();
            println!("{}", "Skipped".bold().underline());
            for skip in &report.skipped {
                println!(
                    "  {} {:<6} {} ({})",
                    "warning:".yellow().bold(),
                    skip.ticker,
                    skip.reason,
                    skip.reason.kind()
                );
            }
        }

        println!();
        println!("{}", "═".repeat(60).blue());
    }

    /// Print correlation results as a table.
    pub fn print_correlation_table(results: &[CorrelationResult]) {
        let mut builder = Builder::new();
        builder.push_record(["Ticker", "Pearson r", "p-value", "Samples", "Significant"]);

        for result in results {
            let significant = if result.is_significant(0.05) {
                "yes".green().to_string()
            } else {
                "no".normal().to_string()
            };
            builder.push_record([
                result.ticker.clone(),
                format!("{:.3}", result.pearson_r),
                format!("{:.3}", result.p_value),
                result.sample_size.to_string(),
                significant,
            ]);
        }

        let table = builder.build().with(Style::rounded()).to_string();
        println!("{}", table);
    }

    /// Print per-stock metrics as a table.
    pub fn print_metrics_table(metrics: &[StockMetrics]) {
        let mut builder = Builder::new();
        builder.push_record([
            "Ticker", "Period", "Days", "Return %", "Vol % (ann)", "Max DD %", "Sharpe",
        ]);

        for m in metrics {
            builder.push_record([
                m.ticker.clone(),
                format!("{} to {}", m.first_date, m.last_date),
                m.trading_days.to_string(),
                Self::format_pct(m.total_return_pct),
                format!("{:.2}", m.annualized_volatility_pct),
                format!("{:.2}", -m.max_drawdown_pct),
                format!("{:.2}", m.sharpe),
            ]);
        }

        let table = builder.build().with(Style::rounded()).to_string();
        println!("{}", table);
    }

    /// Print the latest indicator values per processed ticker.
    pub fn print_indicator_table(processed: &[ProcessedTicker]) {
        fn cell(value: Option<f64>) -> String {
            value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
        }

        let mut builder = Builder::new();
        builder.push_record(["Ticker", "Bars", "Date", "Close", "SMA", "RSI", "MACD", "Signal"]);

        for p in processed {
            match &p.latest {
                Some(row) => builder.push_record([
                    p.ticker.clone(),
                    p.rows.to_string(),
                    row.date.to_string(),
                    format!("{:.2}", row.close),
                    cell(row.sma),
                    cell(row.rsi),
                    cell(row.macd),
                    cell(row.macd_signal),
                ]),
                None => builder.push_record([
                    p.ticker.clone(),
                    p.rows.to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ]),
            }
        }

        let table = builder.build().with(Style::rounded()).to_string();
        println!("{}", table);
    }

    /// Print the news descriptive statistics.
    pub fn print_news_summary(summary: &NewsSummary) {
        let stats = &summary.headline_stats;

        println!();
        println!("{}", "═".repeat(60).blue());
        println!("{}", " NEWS SUMMARY ".bold().blue());
        println!("{}", "═".repeat(60).blue());
        println!();

        println!("{}", "Overview".bold().underline());
        println!("  Articles:        {:>10}", summary.total_articles);
        println!("  Tickers:         {:>10}", summary.unique_tickers);
        println!("  Publishers:      {:>10}", summary.unique_publishers);
        if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
            println!("  Period:          {} to {}", first, last);
        }
        println!();

        println!("{}", "Headline Length (words)".bold().underline());
        println!("  Mean:            {:>10.2}", stats.mean_words);
        println!("  Median:          {:>10.1}", stats.median_words);
        println!("  Min / Max:       {:>4} / {}", stats.min_words, stats.max_words);
        println!("  Mean characters: {:>10.2}", stats.mean_chars);
        println!();

        Self::print_counts("Top Publishers", &summary.top_publishers);
        if !summary.top_domains.is_empty() {
            Self::print_counts("Top Publisher Domains", &summary.top_domains);
        }
        Self::print_counts("Top Keywords", &summary.top_keywords);

        if let Some(busiest) = summary.busiest_hour() {
            println!(
                "  Busiest hour (UTC): {:02}:00 ({} articles)",
                busiest, summary.hourly_counts[busiest]
            );
        }
        println!();
        println!("{}", "═".repeat(60).blue());
    }

    fn print_counts(title: &str, counts: &[crate::eda::CountEntry]) {
        let mut builder = Builder::new();
        builder.push_record([title, "Count"]);
        for entry in counts {
            builder.push_record([entry.label.clone(), entry.count.to_string()]);
        }
        let table = builder.build().with(Style::rounded()).to_string();
        println!("{}", table);
        println!();
    }

    fn format_pct(pct: f64) -> String {
        if pct >= 0.0 {
            format!("+{:.2}", pct).green().to_string()
        } else {
            format!("{:.2}", pct).red().to_string()
        }
    }

    /// Export any result to pretty JSON.
    pub fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Export a correlation result to a CSV line.
    pub fn to_csv_line(result: &CorrelationResult) -> String {
        format!(
            "{},{:.6},{:.6},{}",
            result.ticker, result.pearson_r, result.p_value, result.sample_size
        )
    }

    /// CSV header matching [`Self::to_csv_line`].
    pub fn csv_header() -> &'static str {
        "ticker,pearson_r,p_value,sample_size"
    }

    /// Export stock metrics to a CSV line.
    pub fn metrics_csv_line(m: &StockMetrics) -> String {
        format!(
            "{},{},{},{},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4}",
            m.ticker,
            m.first_date,
            m.last_date,
            m.trading_days,
            m.total_return_pct,
            m.mean_daily_return_pct,
            m.daily_volatility_pct,
            m.annualized_volatility_pct,
            m.max_drawdown_pct,
            m.sharpe
        )
    }

    /// CSV header matching [`Self::metrics_csv_line`].
    pub fn metrics_csv_header() -> &'static str {
        concat!(
            "ticker,first_date,last_date,trading_days,total_return_pct,",
            "mean_daily_return_pct,daily_volatility_pct,annualized_volatility_pct,",
            "max_drawdown_pct,sharpe"
        )
    }
}
