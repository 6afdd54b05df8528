//! Descriptive statistics over the news corpus.
//!
//! Publication dates and hours are taken in UTC. Keyword counts run over a
//! leading sample of headlines, lowercased and tokenized with
//! `unicode-segmentation`; tokens that are not purely alphabetic and
//! common English stop words are dropped.

use crate::types::NewsRecord;
use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

/// Options for [`summarize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdaConfig {
    /// Entries kept in each top-N list.
    pub top_n: usize,
    /// Number of leading headlines used for keyword extraction.
    pub keyword_sample: usize,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            keyword_sample: 10_000,
        }
    }
}

/// A label with its frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

/// Articles published on one UTC date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Headline length statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadlineStats {
    pub mean_words: f64,
    pub median_words: f64,
    pub min_words: usize,
    pub max_words: usize,
    pub mean_chars: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSummary {
    pub total_articles: usize,
    pub unique_tickers: usize,
    pub unique_publishers: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub headline_stats: HeadlineStats,
    pub top_publishers: Vec<CountEntry>,
    /// E-mail publishers count under their domain, others under their name.
    pub top_domains: Vec<CountEntry>,
    pub daily_counts: Vec<DateCount>,
    /// Index is the UTC hour.
    pub hourly_counts: Vec<usize>,
    pub top_keywords: Vec<CountEntry>,
}

impl NewsSummary {
    /// UTC hour with the most articles; earliest hour wins ties.
    pub fn busiest_hour(&self) -> Option<usize> {
        let max = *self.hourly_counts.iter().max()?;
        if max == 0 {
            return None;
        }
        self.hourly_counts.iter().position(|&c| c == max)
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "you", "your", "yours", "yourself",
    "yourselves", "s", "t", "don", "won", "vs",
];

fn stop_words() -> HashSet<&'static str> {
    STOP_WORDS.iter().copied().collect()
}

/// Domain of an e-mail style publisher; any other publisher is its own label.
///
/// ```
/// use newsquant::eda::publisher_domain;
///
/// assert_eq!(publisher_domain("jsmith@benzinga.com"), "benzinga.com");
/// assert_eq!(publisher_domain("Lisa Levin"), "Lisa Levin");
/// ```
pub fn publisher_domain(publisher: &str) -> &str {
    match publisher.split('@').nth(1) {
        Some(domain) => domain,
        None => publisher,
    }
}

/// Word and character length statistics of all headlines.
pub fn headline_stats(news: &[NewsRecord]) -> HeadlineStats {
    if news.is_empty() {
        return HeadlineStats::default();
    }

    let mut words: Vec<usize> = news
        .iter()
        .map(|r| r.headline.split_whitespace().count())
        .collect();
    words.sort_unstable();

    let n = words.len();
    let median_words = if n % 2 == 0 {
        (words[n / 2 - 1] + words[n / 2]) as f64 / 2.0
    } else {
        words[n / 2] as f64
    };
    let total_chars: usize = news.iter().map(|r| r.headline.chars().count()).sum();

    HeadlineStats {
        mean_words: words.iter().sum::<usize>() as f64 / n as f64,
        median_words,
        min_words: words[0],
        max_words: words[n - 1],
        mean_chars: total_chars as f64 / n as f64,
    }
}

/// Count labels and keep the `n` most frequent, ties broken alphabetically.
pub fn top_counts<I, S>(labels: I, n: usize) -> Vec<CountEntry>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label.into()).or_insert(0) += 1;
    }

    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(label, count)| CountEntry { label, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries.truncate(n);
    entries
}

/// Lowercased alphabetic tokens of `text` with stop words removed.
pub fn keywords(text: &str) -> Vec<String> {
    let stop = stop_words();
    tokenize(text, &stop)
}

fn tokenize(text: &str, stop: &HashSet<&'static str>) -> Vec<String> {
    text.unicode_words()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().all(char::is_alphanumeric))
        .filter(|w| !stop.contains(w.as_str()))
        .collect()
}

/// Most frequent keywords over the first `sample` headlines.
pub fn top_keywords(news: &[NewsRecord], sample: usize, n: usize) -> Vec<CountEntry> {
    let stop = stop_words();
    let tokens = news
        .iter()
        .take(sample)
        .flat_map(|r| tokenize(&r.headline, &stop));
    top_counts(tokens, n)
}

/// Compute the full news summary.
pub fn summarize(news: &[NewsRecord], config: &EdaConfig) -> NewsSummary {
    let mut daily: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut hourly = vec![0usize; 24];
    for record in news {
        let utc = record.published_at.naive_utc();
        *daily.entry(utc.date()).or_insert(0) += 1;
        hourly[utc.hour() as usize] += 1;
    }

    let tickers: HashSet<&str> = news.iter().map(|r| r.stock.as_str()).collect();
    let publishers: HashSet<&str> = news.iter().map(|r| r.publisher.as_str()).collect();

    NewsSummary {
        total_articles: news.len(),
        unique_tickers: tickers.len(),
        unique_publishers: publishers.len(),
        first_date: daily.keys().next().copied(),
        last_date: daily.keys().next_back().copied(),
        headline_stats: headline_stats(news),
        top_publishers: top_counts(news.iter().map(|r| r.publisher.as_str()), config.top_n),
        top_domains: top_counts(
            news.iter().map(|r| publisher_domain(&r.publisher)),
            config.top_n,
        ),
        daily_counts: daily
            .into_iter()
            .map(|(date, count)| DateCount { date, count })
            .collect(),
        hourly_counts: hourly,
        top_keywords: top_keywords(news, config.keyword_sample, config.top_n),
    }
}
