use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of the peer distribution is considered "good" for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Lower,
    Higher,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn flipped(&self) -> Self {
        match self {
            Direction::Lower => Direction::Higher,
            Direction::Higher => Direction::Lower,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Lower => "lower",
            Direction::Higher => "higher",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lower" => Ok(Direction::Lower),
            "higher" => Ok(Direction::Higher),
            _ => Err(CoreError::InvalidDirection(s.to_string())),
        }
    }
}

/// The statistic backend used by the windowed engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum StatisticKind {
    #[cfg_attr(feature = "clap", value(name = "zscore"))]
    ZScore,
    Percentile,
    Mad,
}

impl StatisticKind {
    /// Column suffix of the score this backend produces.
    pub fn score_suffix(&self) -> &'static str {
        match self {
            StatisticKind::ZScore => "zscore",
            StatisticKind::Percentile => "percentile",
            StatisticKind::Mad => "mad_score",
        }
    }
}

impl fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatisticKind::ZScore => "zscore",
            StatisticKind::Percentile => "percentile",
            StatisticKind::Mad => "mad",
        };
        f.write_str(name)
    }
}

impl FromStr for StatisticKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zscore" | "z" => Ok(StatisticKind::ZScore),
            "percentile" => Ok(StatisticKind::Percentile),
            "mad" => Ok(StatisticKind::Mad),
            _ => Err(CoreError::InvalidStatisticKind(s.to_string())),
        }
    }
}

/// Label attached to a metric that sits beyond the outlier threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutlierDirection {
    Favorable,
    Unfavorable,
}

impl OutlierDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutlierDirection::Favorable => "favorable",
            OutlierDirection::Unfavorable => "unfavorable",
        }
    }
}

impl fmt::Display for OutlierDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutlierDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "favorable" => Ok(OutlierDirection::Favorable),
            "unfavorable" => Ok(OutlierDirection::Unfavorable),
            _ => Err(CoreError::InvalidOutlierDirection(s.to_string())),
        }
    }
}

/// Report grouping for catalog metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricCategory {
    Valuation,
    Profitability,
    Liquidity,
    Leverage,
    /// Scale of the business (market value, revenue, assets).
    Size,
    /// Quarter-over-quarter and year-over-year change.
    Growth,
}

impl MetricCategory {
    /// All categories in report order.
    pub const ALL: [MetricCategory; 6] = [
        MetricCategory::Valuation,
        MetricCategory::Profitability,
        MetricCategory::Liquidity,
        MetricCategory::Leverage,
        MetricCategory::Size,
        MetricCategory::Growth,
    ];
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricCategory::Valuation => "Valuation",
            MetricCategory::Profitability => "Profitability",
            MetricCategory::Liquidity => "Liquidity",
            MetricCategory::Leverage => "Leverage",
            MetricCategory::Size => "Size",
            MetricCategory::Growth => "Growth",
        };
        f.write_str(name)
    }
}

/// Column used to order signal-count results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum SignalSortKey {
    #[default]
    #[cfg_attr(feature = "clap", value(name = "net_signal"))]
    NetSignal,
    #[cfg_attr(feature = "clap", value(name = "favorable_count"))]
    FavorableCount,
    #[cfg_attr(feature = "clap", value(name = "unfavorable_count"))]
    UnfavorableCount,
    #[cfg_attr(feature = "clap", value(name = "total_signal_count"))]
    TotalSignalCount,
}

impl SignalSortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSortKey::NetSignal => "net_signal",
            SignalSortKey::FavorableCount => "favorable_count",
            SignalSortKey::UnfavorableCount => "unfavorable_count",
            SignalSortKey::TotalSignalCount => "total_signal_count",
        }
    }
}

impl fmt::Display for SignalSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalSortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "net_signal" => Ok(SignalSortKey::NetSignal),
            "favorable_count" => Ok(SignalSortKey::FavorableCount),
            "unfavorable_count" => Ok(SignalSortKey::UnfavorableCount),
            "total_signal_count" => Ok(SignalSortKey::TotalSignalCount),
            _ => Err(CoreError::InvalidSortKey(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse_and_flip() {
        assert_eq!("lower".parse::<Direction>().unwrap(), Direction::Lower);
        assert_eq!("Higher".parse::<Direction>().unwrap(), Direction::Higher);
        assert_eq!(Direction::Lower.flipped(), Direction::Higher);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_outlier_direction_rejects_malformed_input() {
        assert_eq!(
            "favorable".parse::<OutlierDirection>().unwrap(),
            OutlierDirection::Favorable
        );
        assert_eq!(
            "bad".parse::<OutlierDirection>(),
            Err(CoreError::InvalidOutlierDirection("bad".to_string()))
        );
        // Only the exact lowercase spellings are accepted.
        assert!("Favorable".parse::<OutlierDirection>().is_err());
    }

    #[test]
    fn test_statistic_kind_suffixes() {
        assert_eq!(StatisticKind::ZScore.score_suffix(), "zscore");
        assert_eq!(StatisticKind::Mad.score_suffix(), "mad_score");
        assert_eq!("mad".parse::<StatisticKind>().unwrap(), StatisticKind::Mad);
    }
}
