//! Integration tests for the analysis pipeline.

use newsquant::batch::{self, BatchConfig, BatchDriver, NEWS_SUMMARY_FILE};
use newsquant::data::DateAnchor;
use newsquant::eda::EdaConfig;
use newsquant::error::{AnalysisError, TickerError};
use newsquant::indicators::IndicatorConfig;
use newsquant::export::{CORRELATION_SUMMARY_FILE, STOCK_METRICS_FILE};
use newsquant::sentiment::{PolarityScorer, VaderScorer};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Reads the polarity from the headline's last token.
struct EmbeddedScorer;

impl PolarityScorer for EmbeddedScorer {
    fn name(&self) -> &str {
        "embedded"
    }

    fn score(&self, text: &str) -> f64 {
        text.split_whitespace()
            .last()
            .and_then(|t| t.parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}

fn close_on(day: u32) -> f64 {
    100.0 + (day * day) as f64 + (day % 3) as f64 * 2.5
}

/// Price file for days 1..=days of January 2024, yfinance layout.
fn write_prices(dir: &Path, ticker: &str, days: u32) {
    let mut csv =
        String::from("Date,Open,High,Low,Close,Adj Close,Volume,Dividends,Stock Splits\n");
    for d in 1..=days {
        let c = close_on(d);
        csv.push_str(&format!(
            "2024-01-{:02},{o},{h},{l},{c},{c},{v},0.0,0.0\n",
            d,
            o = c - 1.0,
            h = c + 1.0,
            l = c - 2.0,
            c = c,
            v = 1_000_000 + d * 10
        ));
    }
    fs::write(dir.join(format!("{}_historical_data.csv", ticker)), csv).unwrap();
}

/// News rows: (ticker, day, hour, headline), all at offset -04:00.
fn write_news(dir: &Path, rows: &[(&str, u32, u32, String)]) {
    let mut csv = String::from(",headline,url,publisher,date,stock\n");
    for (i, (ticker, day, hour, headline)) in rows.iter().enumerate() {
        csv.push_str(&format!(
            "{},\"{}\",https://example.com/{},Desk,2024-01-{:02} {:02}:00:00-04:00,{}\n",
            i, headline, i, day, hour, ticker
        ));
    }
    fs::write(dir.join("raw_analyst_ratings.csv"), csv).unwrap();
}

fn config_for(dir: &TempDir, tickers: &[&str]) -> BatchConfig {
    BatchConfig {
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        input_dir: dir.path().to_path_buf(),
        output_dir: dir.path().join("processed"),
        ..Default::default()
    }
}

#[test]
fn test_batch_isolates_failures() {
    let dir = TempDir::new().unwrap();
    write_prices(dir.path(), "AAPL", 10);
    write_prices(dir.path(), "MSFT", 10);

    let mut rows = Vec::new();
    for d in 1..=10 {
        rows.push(("AAPL", d, 10, format!("Apple update {}", (d as f64 * 0.9).sin())));
        rows.push(("TSLA", d, 11, format!("Tesla update {}", (d as f64 * 0.4).cos())));
    }
    write_news(dir.path(), &rows);

    let driver = BatchDriver::new(
        config_for(&dir, &["AAPL", "TSLA", "MSFT"]),
        Box::new(EmbeddedScorer),
    );
    let report = driver.run().unwrap();

    // AAPL: 10 news days, 9 defined returns
    assert_eq!(report.results.len(), 1);
    let aapl = report.result_for("AAPL").unwrap();
    assert_eq!(aapl.sample_size, 9);
    assert!((-1.0..=1.0).contains(&aapl.pearson_r));
    assert!((0.0..=1.0).contains(&aapl.p_value));

    assert!(matches!(
        report.skip_for("TSLA").unwrap().reason,
        TickerError::MissingFile { .. }
    ));
    assert!(matches!(report.skip_for("MSFT").unwrap().reason, TickerError::NoNews));

    let out = dir.path().join("processed");
    for name in ["AAPL_news_aligned.csv", "AAPL_daily_sentiment.csv", "AAPL_stock_returns.csv"] {
        assert!(out.join(name).exists(), "missing {}", name);
    }
    assert!(!out.join("TSLA_news_aligned.csv").exists());

    let summary = fs::read_to_string(out.join(CORRELATION_SUMMARY_FILE)).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("AAPL,"));

    let returns = fs::read_to_string(out.join("AAPL_stock_returns.csv")).unwrap();
    assert_eq!(returns.lines().count(), 10);
}

#[test]
fn test_sentiment_tracking_returns_is_perfectly_correlated() {
    let dir = TempDir::new().unwrap();
    write_prices(dir.path(), "NVDA", 12);

    let rows: Vec<(&str, u32, u32, String)> = (2..=12)
        .map(|d| {
            let ret = (close_on(d) - close_on(d - 1)) / close_on(d - 1) * 100.0;
            ("NVDA", d, 9, format!("Nvidia moves {:.12}", ret / 100.0))
        })
        .collect();
    write_news(dir.path(), &rows);

    let driver = BatchDriver::new(config_for(&dir, &["NVDA"]), Box::new(EmbeddedScorer));
    let report = driver.run().unwrap();

    let nvda = report.result_for("NVDA").unwrap();
    assert_eq!(nvda.sample_size, 11);
    assert!(nvda.pearson_r > 0.999, "r = {}", nvda.pearson_r);
    assert!(nvda.p_value < 1e-6);
}

#[test]
fn test_insufficient_overlap_is_skipped() {
    let dir = TempDir::new().unwrap();
    write_prices(dir.path(), "GOOG", 10);
    let rows: Vec<(&str, u32, u32, String)> = (2..=5)
        .map(|d| ("GOOG", d, 10, format!("Alphabet {}", d as f64 / 10.0)))
        .collect();
    write_news(dir.path(), &rows);

    let driver = BatchDriver::new(config_for(&dir, &["GOOG"]), Box::new(EmbeddedScorer));
    let report = driver.run().unwrap();

    match &report.skip_for("GOOG").unwrap().reason {
        TickerError::InsufficientSamples { found, required } => {
            assert_eq!(*found, 4);
            assert_eq!(*required, 5);
        }
        other => panic!("expected InsufficientSamples, got {:?}", other),
    }
}

#[test]
fn test_utc_anchor_shifts_late_headlines() {
    let dir = TempDir::new().unwrap();
    write_prices(dir.path(), "AMZN", 10);
    // 21:00-04:00 is 01:00 UTC on the following day
    let rows: Vec<(&str, u32, u32, String)> = (1..=9)
        .map(|d| ("AMZN", d, 21, format!("Amazon {}", (d as f64).sqrt())))
        .collect();
    write_news(dir.path(), &rows);

    let local = BatchDriver::new(config_for(&dir, &["AMZN"]), Box::new(EmbeddedScorer))
        .run()
        .unwrap();
    assert_eq!(local.result_for("AMZN").unwrap().sample_size, 8);

    let mut config = config_for(&dir, &["AMZN"]);
    config.date_anchor = DateAnchor::Utc;
    let utc = BatchDriver::new(config, Box::new(EmbeddedScorer)).run().unwrap();
    assert_eq!(utc.result_for("AMZN").unwrap().sample_size, 9);
}

#[test]
fn test_news_without_required_columns_is_fatal() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("raw_analyst_ratings.csv"),
        "title,date,stock\nSomething,2024-01-02,AAPL\n",
    )
    .unwrap();

    let driver = BatchDriver::new(config_for(&dir, &["AAPL"]), Box::new(EmbeddedScorer));
    match driver.run() {
        Err(AnalysisError::MissingColumns { missing, .. }) => {
            assert!(missing.contains(&"headline".to_string()));
        }
        other => panic!("expected MissingColumns, got {:?}", other.map(|r| r.results)),
    }
}

#[test]
fn test_vader_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_prices(dir.path(), "META", 10);
    let rows: Vec<(&str, u32, u32, String)> = (1..=10)
        .map(|d| {
            let headline = if d % 2 == 0 {
                "Meta shares surge on excellent results"
            } else {
                "Meta stock plunges after terrible lawsuit"
            };
            ("META", d, 10, headline.to_string())
        })
        .collect();
    write_news(dir.path(), &rows);

    let driver = BatchDriver::new(config_for(&dir, &["META"]), Box::new(VaderScorer::new()));
    let report = driver.run().unwrap();

    let meta = report.result_for("META").unwrap();
    assert_eq!(meta.sample_size, 9);
    assert!((-1.0..=1.0).contains(&meta.pearson_r));
}

#[test]
fn test_metrics_and_news_summary_flows() {
    let dir = TempDir::new().unwrap();
    write_prices(dir.path(), "AAPL", 31);
    write_news(
        dir.path(),
        &[
            ("AAPL", 2, 10, "Apple earnings beat".to_string()),
            ("AAPL", 3, 10, "Apple earnings preview".to_string()),
        ],
    );

    let config = config_for(&dir, &["AAPL"]);
    let report = batch::run_metrics(&config, 252.0).unwrap();
    assert_eq!(report.metrics.len(), 1);
    let aapl = &report.metrics[0];
    assert_eq!(aapl.trading_days, 31);
    let expected = (close_on(31) - close_on(1)) / close_on(1) * 100.0;
    assert!((aapl.total_return_pct - expected).abs() < 1e-9);
    assert!(aapl.max_drawdown_pct >= 0.0);

    let out = dir.path().join("processed");
    let metrics = fs::read_to_string(out.join(STOCK_METRICS_FILE)).unwrap();
    assert_eq!(metrics.lines().count(), 2);
    assert!(metrics.lines().nth(1).unwrap().starts_with("AAPL,2024-01-01,2024-01-31,31,"));

    let summary = batch::run_news_summary(&config, &EdaConfig::default()).unwrap();
    assert_eq!(summary.total_articles, 2);
    assert_eq!(summary.top_keywords[0].label, "apple");
    assert!(out.join(NEWS_SUMMARY_FILE).exists());
}

#[test]
fn test_indicator_flow_writes_processed_prices() {
    let dir = TempDir::new().unwrap();
    write_prices(dir.path(), "TSLA", 31);

    let config = config_for(&dir, &["TSLA", "NVDA"]);
    let report = batch::run_indicators(&config, &IndicatorConfig::default()).unwrap();

    assert_eq!(report.processed.len(), 1);
    let tsla = &report.processed[0];
    assert_eq!(tsla.rows, 31);
    let latest = tsla.latest.as_ref().unwrap();
    assert!(latest.sma.is_some() && latest.rsi.is_some());
    // 31 bars is short of the MACD warm-up
    assert!(latest.macd.is_none());
    assert!(matches!(
        report.skip_for("NVDA").unwrap().reason,
        TickerError::MissingFile { .. }
    ));

    let processed = fs::read_to_string(&tsla.path).unwrap();
    let lines: Vec<&str> = processed.lines().collect();
    assert_eq!(lines.len(), 32);
    assert_eq!(lines[0], "Date,Open,High,Low,Close,Volume,SMA_20,RSI_14,MACD,MACD_Signal");

    let sma_cell = |line: &str| line.split(',').nth(6).unwrap().to_string();
    assert!(sma_cell(lines[19]).is_empty());
    assert!(!sma_cell(lines[20]).is_empty());
}

#[test]
fn test_news_with_no_usable_rows_skips_tickers() {
    let dir = TempDir::new().unwrap();
    write_prices(dir.path(), "AAPL", 10);
    fs::write(
        dir.path().join("raw_analyst_ratings.csv"),
        "headline,publisher,date,stock\nApple up,Desk,not a date,AAPL\n",
    )
    .unwrap();

    let driver = BatchDriver::new(config_for(&dir, &["AAPL"]), Box::new(EmbeddedScorer));
    let report = driver.run().unwrap();

    assert!(report.results.is_empty());
    let skip = report.skip_for("AAPL").unwrap();
    assert!(matches!(skip.reason, TickerError::NoNews));
    assert_eq!(skip.reason.kind(), "empty_filter");
}
