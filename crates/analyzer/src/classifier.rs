use crate::error::AnalyzerError;
use analytics::WindowedStatistic;
use configuration::{ScoreConfiguration, validate_percentile_threshold, validate_sigma_threshold};
use core_types::{Direction, OutlierClassification, OutlierDirection, StatisticKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How far from its peers a statistic must sit to be flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Threshold {
    /// For z-scores and MAD scores: flagged strictly beyond `±sigma`.
    Sigma(f64),
    /// For percentiles: `t` flags `p >= t` and `p <= 100 - t`.
    Percentile(f64),
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Sigma(sigma) => write!(f, "{sigma} sigma"),
            Threshold::Percentile(t) => write!(f, "{t}%"),
        }
    }
}

/// Which tail of the peer distribution a statistic landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    BelowPeers,
    AbovePeers,
}

impl Threshold {
    pub fn sigma(sigma: f64) -> Result<Self, AnalyzerError> {
        validate_sigma_threshold(sigma)?;
        Ok(Threshold::Sigma(sigma))
    }

    pub fn percentile(threshold: f64) -> Result<Self, AnalyzerError> {
        validate_percentile_threshold(threshold)?;
        Ok(Threshold::Percentile(threshold))
    }

    /// The threshold variant that matches statistics of `kind`.
    pub fn for_kind(kind: StatisticKind, value: f64) -> Result<Self, AnalyzerError> {
        match kind {
            StatisticKind::Percentile => Self::percentile(value),
            StatisticKind::ZScore | StatisticKind::Mad => Self::sigma(value),
        }
    }

    pub fn from_config(config: &ScoreConfiguration, kind: StatisticKind) -> Result<Self, AnalyzerError> {
        Self::for_kind(kind, config.threshold)
    }

    pub fn value(&self) -> f64 {
        match self {
            Threshold::Sigma(v) | Threshold::Percentile(v) => *v,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Threshold::Sigma(_) => "sigma",
            Threshold::Percentile(_) => "percentile",
        }
    }

    pub fn applies_to(&self, kind: StatisticKind) -> bool {
        matches!(
            (self, kind),
            (Threshold::Percentile(_), StatisticKind::Percentile)
                | (Threshold::Sigma(_), StatisticKind::ZScore | StatisticKind::Mad)
        )
    }

    pub(crate) fn ensure_applies_to(&self, kind: StatisticKind) -> Result<(), AnalyzerError> {
        if self.applies_to(kind) {
            Ok(())
        } else {
            Err(AnalyzerError::ThresholdMismatch {
                threshold: self.label(),
                statistic: kind,
            })
        }
    }

    /// Value a perfectly typical peer would score.
    pub fn neutral_score(&self) -> f64 {
        match self {
            Threshold::Sigma(_) => 0.0,
            Threshold::Percentile(_) => 50.0,
        }
    }

    fn tail(&self, score: f64) -> Option<Tail> {
        match *self {
            Threshold::Sigma(sigma) if score < -sigma => Some(Tail::BelowPeers),
            Threshold::Sigma(sigma) if score > sigma => Some(Tail::AbovePeers),
            Threshold::Percentile(t) if score <= 100.0 - t => Some(Tail::BelowPeers),
            Threshold::Percentile(t) if score >= t => Some(Tail::AbovePeers),
            _ => None,
        }
    }
}

/// Labels a score given the side of the distribution that is good for the metric.
///
/// Missing or non-finite scores are never outliers.
pub fn classify(score: Option<f64>, direction: Direction, threshold: Threshold) -> OutlierClassification {
    let Some(tail) = score.filter(|s| s.is_finite()).and_then(|s| threshold.tail(s)) else {
        return OutlierClassification::NEUTRAL;
    };
    let label = match (direction, tail) {
        (Direction::Lower, Tail::BelowPeers) | (Direction::Higher, Tail::AbovePeers) => {
            OutlierDirection::Favorable
        }
        (Direction::Lower, Tail::AbovePeers) | (Direction::Higher, Tail::BelowPeers) => {
            OutlierDirection::Unfavorable
        }
    };
    OutlierClassification::flagged(label)
}

/// Classifies a windowed statistic, rejecting a threshold of the wrong kind.
pub fn classify_statistic(
    statistic: &WindowedStatistic,
    direction: Direction,
    threshold: Threshold,
) -> Result<OutlierClassification, AnalyzerError> {
    threshold.ensure_applies_to(statistic.kind())?;
    Ok(classify(statistic.score(), direction, threshold))
}
