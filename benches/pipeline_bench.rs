//! Performance benchmarks for the analysis pipeline.
//!
//! Run with: cargo bench

use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use newsquant::align::align_ticker;
use newsquant::correlation::pearson;
use newsquant::analytics::StockMetrics;
use newsquant::eda::{summarize, EdaConfig};
use newsquant::indicators::{IndicatorConfig, Indicators};
use newsquant::returns::compute_returns;
use newsquant::sentiment::{score_records, VaderScorer};
use newsquant::types::{NewsRecord, PriceBar};

/// Generate synthetic daily bars for benchmarking.
fn generate_bars(count: usize) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let mut price = 100.0;
    (0..count)
        .map(|i| {
            let noise = ((i as f64 * 0.7).sin() * 2.0 + (i as f64 * 1.3).cos()) * 0.5;
            price += 0.001 * price + noise;
            price = price.max(50.0);
            PriceBar::new(
                start + Duration::days(i as i64),
                price - 1.0,
                price + 2.0,
                price - 2.0,
                price,
                1_000_000,
            )
        })
        .collect()
}

const HEADLINES: [&str; 6] = [
    "Shares surge after record quarterly earnings",
    "Analysts downgrade stock on weak guidance",
    "Company announces new product lineup",
    "Stock plunges as lawsuit fears grow",
    "Board approves dividend increase",
    "Stocks That Hit 52-Week Highs On Friday",
];

/// Generate synthetic headlines, three per day.
fn generate_news(days: usize, ticker: &str) -> Vec<NewsRecord> {
    let offset = FixedOffset::west_opt(4 * 3600).unwrap();
    (0..days * 3)
        .map(|i| {
            let published_at = offset.with_ymd_and_hms(2015, 1, 1, 9, 0, 0).unwrap()
                + Duration::days((i / 3) as i64)
                + Duration::hours((i % 3) as i64 * 3);
            NewsRecord {
                headline: HEADLINES[i % HEADLINES.len()].to_string(),
                publisher: if i % 4 == 0 { "desk@benzinga.com" } else { "Lisa Levin" }.to_string(),
                date: published_at.date_naive(),
                published_at,
                stock: ticker.to_string(),
            }
        })
        .collect()
}

fn bench_returns(c: &mut Criterion) {
    let mut group = c.benchmark_group("returns");
    for size in [252, 2520, 10_000] {
        let bars = generate_bars(size);
        group.bench_with_input(BenchmarkId::new("compute_returns", size), &bars, |b, bars| {
            b.iter(|| compute_returns(black_box(bars)))
        });
    }
    group.finish();
}

fn bench_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation");
    for size in [30, 250, 2500] {
        let x: Vec<f64> = (0..size).map(|i| (i as f64 * 0.37).sin()).collect();
        let y: Vec<f64> = (0..size).map(|i| (i as f64 * 0.11).cos() + x[i] * 0.2).collect();
        group.bench_with_input(BenchmarkId::new("pearson", size), &(x, y), |b, (x, y)| {
            b.iter(|| pearson(black_box(x), black_box(y)))
        });
    }
    group.finish();
}

fn bench_sentiment(c: &mut Criterion) {
    let scorer = VaderScorer::new();
    let news = generate_news(100, "AAPL");

    let mut group = c.benchmark_group("sentiment");
    group.bench_function("score_300_headlines", |b| {
        b.iter(|| score_records(&scorer, black_box(&news)))
    });
    group.finish();
}

fn bench_alignment(c: &mut Criterion) {
    let scorer = VaderScorer::new();
    let bars = generate_bars(500);
    let news = generate_news(500, "AAPL");

    c.bench_function("align_ticker_500_days", |b| {
        b.iter(|| align_ticker(black_box(&news), black_box(&bars), "AAPL", &scorer, 5))
    });
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("stock_metrics");
    for days in [252, 2520] {
        let bars = generate_bars(days);
        group.bench_with_input(BenchmarkId::new("from_bars", days), &bars, |b, bars| {
            b.iter(|| StockMetrics::from_bars("AAPL", black_box(bars), 252.0))
        });
    }
    group.finish();
}

fn bench_indicators(c: &mut Criterion) {
    let indicators = Indicators::new(IndicatorConfig::default()).unwrap();
    let mut group = c.benchmark_group("indicators");
    for days in [252, 2520] {
        let bars = generate_bars(days);
        group.bench_with_input(BenchmarkId::new("compute", days), &bars, |b, bars| {
            b.iter(|| indicators.compute(black_box(bars)))
        });
    }
    group.finish();
}

fn bench_eda(c: &mut Criterion) {
    let news = generate_news(1000, "TSLA");
    c.bench_function("summarize_3000_headlines", |b| {
        b.iter(|| summarize(black_box(&news), &EdaConfig::default()))
    });
}

criterion_group!(
    benches,
    bench_returns,
    bench_correlation,
    bench_sentiment,
    bench_alignment,
    bench_metrics,
    bench_indicators,
    bench_eda
);
criterion_main!(benches);
