//! Deterministic importance scoring (C5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FREQUENCY_CAP, DEFAULT_SCORER_WEIGHT, RECENCY_TAU_HOURS};
use crate::error::{Error, Result};
use crate::types::MemoryKind;

/// Weights (and the frequency cap) used by [`ImportanceScorer::score`].
/// Weights need not sum to 1; the result is clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScorerWeights {
    pub recency: f64,
    pub frequency: f64,
    pub confidence: f64,
    pub salience: f64,
    pub frequency_cap: u32,
}

impl Default for ScorerWeights {
    fn default() -> Self {
        Self {
            recency: DEFAULT_SCORER_WEIGHT,
            frequency: DEFAULT_SCORER_WEIGHT,
            confidence: DEFAULT_SCORER_WEIGHT,
            salience: DEFAULT_SCORER_WEIGHT,
            frequency_cap: DEFAULT_FREQUENCY_CAP,
        }
    }
}

impl ScorerWeights {
    /// Validate: all weights `>= 0` and the cap is a positive integer.
    pub fn validate(&self) -> Result<()> {
        if self.recency < 0.0 || self.frequency < 0.0 || self.confidence < 0.0 || self.salience < 0.0 {
            return Err(Error::InvalidInput("scorer weights must be >= 0".into()));
        }
        if self.frequency_cap == 0 {
            return Err(Error::InvalidInput(
                "scorer frequency cap must be a positive integer".into(),
            ));
        }
        Ok(())
    }
}

/// The inputs [`ImportanceScorer::score_with_breakdown`] needs; gathered by
/// the caller from working context / pending memories / the access log.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput {
    pub last_accessed: Option<DateTime<Utc>>,
    pub first_seen: Option<DateTime<Utc>>,
    pub access_count: u32,
    pub confidence: f64,
    pub memory_type: MemoryKind,
}

/// Per-component score breakdown plus the weighted total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub recency: f64,
    pub frequency: f64,
    pub confidence: f64,
    pub salience: f64,
    pub total: f64,
}

/// Scores candidates deterministically from recency, frequency, confidence,
/// and salience. Holds its configuration; `configure` atomically replaces
/// it or leaves it untouched on invalid input.
#[derive(Debug, Default)]
pub struct ImportanceScorer {
    weights: ScorerWeights,
}

impl ImportanceScorer {
    #[must_use]
    pub fn new(weights: ScorerWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> ScorerWeights {
        self.weights
    }

    /// Replace the weights. Invalid configuration is rejected and the
    /// current configuration is left untouched.
    pub fn configure(&mut self, weights: ScorerWeights) -> Result<()> {
        weights.validate()?;
        self.weights = weights;
        Ok(())
    }

    fn recency_component(input: &ScoreInput, now: DateTime<Utc>) -> f64 {
        let anchor = input.last_accessed.or(input.first_seen);
        match anchor {
            Some(t) => {
                let age_hours = (now - t).num_milliseconds() as f64 / 3_600_000.0;
                (-age_hours.max(0.0) / RECENCY_TAU_HOURS).exp()
            }
            None => 0.5,
        }
    }

    fn frequency_component(&self, input: &ScoreInput) -> f64 {
        let cap = f64::from(self.weights.frequency_cap);
        (f64::from(input.access_count).min(cap)) / cap
    }

    /// Score `input`, returning the per-component breakdown and the
    /// weighted total (clamped to `[0, 1]`).
    #[must_use]
    pub fn score_with_breakdown(&self, input: &ScoreInput) -> ScoreBreakdown {
        self.score_with_breakdown_at(input, Utc::now())
    }

    fn score_with_breakdown_at(&self, input: &ScoreInput, now: DateTime<Utc>) -> ScoreBreakdown {
        let recency = Self::recency_component(input, now);
        let frequency = self.frequency_component(input);
        let confidence = input.confidence.clamp(0.0, 1.0);
        let salience = input.memory_type.salience();
        let total = (self.weights.recency * recency
            + self.weights.frequency * frequency
            + self.weights.confidence * confidence
            + self.weights.salience * salience)
            .clamp(0.0, 1.0);
        ScoreBreakdown {
            recency,
            frequency,
            confidence,
            salience,
            total,
        }
    }

    /// Convenience wrapper returning only the total score.
    #[must_use]
    pub fn score(&self, input: &ScoreInput) -> f64 {
        self.score_with_breakdown(input).total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(access_count: u32, confidence: f64, memory_type: MemoryKind) -> ScoreInput {
        ScoreInput {
            last_accessed: Some(Utc::now()),
            first_seen: Some(Utc::now()),
            access_count,
            confidence,
            memory_type,
        }
    }

    #[test]
    fn fresh_high_confidence_risk_scores_near_one() {
        let scorer = ImportanceScorer::default();
        let score = scorer.score(&input(20, 1.0, MemoryKind::Risk));
        assert!(score > 0.9, "expected near-maximal score, got {score}");
    }

    #[test]
    fn no_access_history_defaults_recency_to_half() {
        let scorer = ImportanceScorer::default();
        let input = ScoreInput {
            last_accessed: None,
            first_seen: None,
            access_count: 0,
            confidence: 0.5,
            memory_type: MemoryKind::Fact,
        };
        let breakdown = scorer.score_with_breakdown(&input);
        assert_eq!(breakdown.recency, 0.5);
    }

    #[test]
    fn configure_rejects_negative_weights_without_mutating() {
        let mut scorer = ImportanceScorer::default();
        let before = scorer.weights();
        let bad = ScorerWeights {
            recency: -1.0,
            ..ScorerWeights::default()
        };
        assert!(scorer.configure(bad).is_err());
        assert_eq!(scorer.weights().recency, before.recency);
    }

    #[test]
    fn configure_rejects_zero_cap() {
        let mut scorer = ImportanceScorer::default();
        let bad = ScorerWeights {
            frequency_cap: 0,
            ..ScorerWeights::default()
        };
        assert!(scorer.configure(bad).is_err());
    }

    #[test]
    fn frequency_saturates_at_cap() {
        let scorer = ImportanceScorer::default();
        let low = scorer.score_with_breakdown(&input(10, 0.5, MemoryKind::Fact));
        let high = scorer.score_with_breakdown(&input(100, 0.5, MemoryKind::Fact));
        assert_eq!(low.frequency, high.frequency);
        assert_eq!(low.frequency, 1.0);
    }
}
