//! Headline polarity scoring.
//!
//! Scoring is a pluggable capability behind [`PolarityScorer`]. The default
//! implementation wraps the VADER lexicon model from the `vader_sentiment`
//! crate and reports its compound score.
//!
//! # Example
//!
//! ```
//! use newsquant::sentiment::{PolarityScorer, VaderScorer};
//!
//! let scorer = VaderScorer::new();
//! assert!(scorer.score("Shares surge after a great quarter") > 0.0);
//! assert_eq!(scorer.score(""), 0.0);
//! ```

use crate::types::NewsRecord;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Maps text to a polarity in [-1, 1]; negative means negative sentiment.
///
/// Implementations must be deterministic and must return 0.0 for empty
/// input rather than failing.
pub trait PolarityScorer: Send + Sync {
    /// Human-readable model name.
    fn name(&self) -> &str;

    /// Polarity of `text`.
    fn score(&self, text: &str) -> f64;
}

/// VADER compound-score scorer.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for VaderScorer {
    fn name(&self) -> &str {
        "vader"
    }

    fn score(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let scores = self.analyzer.polarity_scores(text);
        match scores.get("compound") {
            Some(&compound) if compound.is_finite() => compound.clamp(-1.0, 1.0),
            _ => 0.0,
        }
    }
}

/// Score every record's headline, in order.
pub fn score_records(scorer: &dyn PolarityScorer, records: &[NewsRecord]) -> Vec<f64> {
    records.iter().map(|r| scorer.score(&r.headline)).collect()
}
