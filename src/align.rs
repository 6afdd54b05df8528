//! Per-ticker alignment of daily sentiment with daily returns.

use crate::error::TickerError;
use crate::returns::compute_returns;
use crate::sentiment::PolarityScorer;
use crate::types::{
    AlignedPoint, AlignedSeries, DailyReturn, DailySentiment, NewsRecord, PriceBar,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A news record together with its polarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredHeadline {
    pub record: NewsRecord,
    pub sentiment: f64,
}

/// Everything produced while aligning one ticker.
///
/// Carries the intermediate tables alongside the joined series so they can
/// be persisted for auditing.
#[derive(Debug, Clone)]
pub struct TickerAlignment {
    pub ticker: String,
    pub news: Vec<ScoredHeadline>,
    pub daily_sentiment: Vec<DailySentiment>,
    pub returns: Vec<DailyReturn>,
    pub series: AlignedSeries,
}

/// Group scored headlines by date and average their polarity.
///
/// Duplicate headlines on the same day all count toward the mean.
pub fn daily_sentiment(scored: &[ScoredHeadline]) -> Vec<DailySentiment> {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for item in scored {
        let entry = by_date.entry(item.record.date).or_insert((0.0, 0));
        entry.0 += item.sentiment;
        entry.1 += 1;
    }

    by_date
        .into_iter()
        .map(|(date, (sum, count))| DailySentiment {
            date,
            mean_sentiment: sum / count as f64,
            headline_count: count,
        })
        .collect()
}

/// Inner-join daily sentiment and returns on date.
///
/// Only dates with a defined return survive. Output is sorted by date.
pub fn join_on_date(
    ticker: &str,
    sentiment: &[DailySentiment],
    returns: &[DailyReturn],
) -> AlignedSeries {
    let by_date: HashMap<NaiveDate, f64> = returns
        .iter()
        .filter_map(|r| r.pct_return.map(|pct| (r.date, pct)))
        .collect();

    let mut points: Vec<AlignedPoint> = sentiment
        .iter()
        .filter_map(|s| {
            by_date.get(&s.date).map(|&pct_return| AlignedPoint {
                date: s.date,
                mean_sentiment: s.mean_sentiment,
                pct_return,
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);

    AlignedSeries {
        ticker: ticker.to_string(),
        points,
    }
}

/// Build the aligned sentiment/return series for one ticker.
///
/// Fails with [`TickerError::NoNews`] when no headline matches the ticker and
/// with [`TickerError::InsufficientSamples`] when fewer than `min_samples`
/// dates overlap.
pub fn align_ticker(
    news: &[NewsRecord],
    bars: &[PriceBar],
    ticker: &str,
    scorer: &dyn PolarityScorer,
    min_samples: usize,
) -> Result<TickerAlignment, TickerError> {
    let scored: Vec<ScoredHeadline> = news
        .iter()
        .filter(|r| r.stock == ticker)
        .map(|r| ScoredHeadline {
            sentiment: scorer.score(&r.headline),
            record: r.clone(),
        })
        .collect();

    if scored.is_empty() {
        return Err(TickerError::NoNews);
    }
    debug!("{}: {} headlines scored with {}", ticker, scored.len(), scorer.name());

    let daily = daily_sentiment(&scored);
    let returns = compute_returns(bars);
    let series = join_on_date(ticker, &daily, &returns);

    debug!(
        "{}: {} sentiment days, {} return days, {} aligned",
        ticker,
        daily.len(),
        returns.len(),
        series.len()
    );

    if series.len() < min_samples {
        return Err(TickerError::InsufficientSamples {
            found: series.len(),
            required: min_samples,
        });
    }

    Ok(TickerAlignment {
        ticker: ticker.to_string(),
        news: scored,
        daily_sentiment: daily,
        returns,
        series,
    })
}
