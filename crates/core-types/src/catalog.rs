use crate::enums::{Direction, MetricCategory};
use serde::Serialize;

/// A ranked ratio and the side of the peer distribution that counts as good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricDefinition {
    pub name: &'static str,
    pub direction: Direction,
    pub category: MetricCategory,
    pub description: &'static str,
    /// Rendered as a percentage in human-readable reports.
    pub percent_display: bool,
}

const fn metric(
    name: &'static str,
    direction: Direction,
    category: MetricCategory,
    description: &'static str,
    percent_display: bool,
) -> MetricDefinition {
    MetricDefinition {
        name,
        direction,
        category,
        description,
        percent_display,
    }
}

/// The fixed, ordered metric catalog shared by every consumer.
pub const METRIC_CATALOG: [MetricDefinition; 11] = [
    // Valuation: cheaper is better.
    metric(
        "pe_ratio",
        Direction::Lower,
        MetricCategory::Valuation,
        "Price-to-Earnings ratio (lower = cheaper)",
        false,
    ),
    metric(
        "pb_ratio",
        Direction::Lower,
        MetricCategory::Valuation,
        "Price-to-Book ratio (lower = cheaper)",
        false,
    ),
    metric(
        "ps_ratio",
        Direction::Lower,
        MetricCategory::Valuation,
        "Price-to-Sales ratio (lower = cheaper)",
        false,
    ),
    metric(
        "pc_ratio",
        Direction::Lower,
        MetricCategory::Valuation,
        "Price-to-Cash ratio (lower = cheaper)",
        false,
    ),
    metric(
        "ev_ebitda_ratio",
        Direction::Lower,
        MetricCategory::Valuation,
        "EV/EBITDA ratio (lower = cheaper)",
        false,
    ),
    metric(
        "roe_calculated",
        Direction::Higher,
        MetricCategory::Profitability,
        "Return on Equity (higher = better profitability)",
        true,
    ),
    metric(
        "roic_calculated",
        Direction::Higher,
        MetricCategory::Profitability,
        "Return on Invested Capital (higher = better profitability)",
        true,
    ),
    metric(
        "current_ratio",
        Direction::Higher,
        MetricCategory::Liquidity,
        "Current Ratio (higher = better liquidity)",
        false,
    ),
    metric(
        "interest_coverage",
        Direction::Higher,
        MetricCategory::Liquidity,
        "Interest Coverage (higher = better debt serviceability)",
        false,
    ),
    metric(
        "debt_to_equity",
        Direction::Lower,
        MetricCategory::Leverage,
        "Debt-to-Equity (lower = less leveraged)",
        false,
    ),
    metric(
        "debt_to_assets",
        Direction::Lower,
        MetricCategory::Leverage,
        "Debt-to-Assets (lower = less leveraged)",
        true,
    ),
];

/// Size levels and period-over-period growth.
///
/// These are derived and scored like catalog metrics but never enter signal
/// counts or the default long-format reshape, which cover `METRIC_CATALOG` only.
pub const SUPPLEMENTARY_METRICS: [MetricDefinition; 15] = [
    metric(
        "marketcap",
        Direction::Higher,
        MetricCategory::Size,
        "Market Capitalization (higher = larger company)",
        false,
    ),
    metric(
        "revenue",
        Direction::Higher,
        MetricCategory::Size,
        "Revenue (higher = larger company)",
        false,
    ),
    metric(
        "assets",
        Direction::Higher,
        MetricCategory::Size,
        "Total Assets (higher = larger company)",
        false,
    ),
    metric(
        "revenue_growth_qoq",
        Direction::Higher,
        MetricCategory::Growth,
        "Revenue Growth QoQ (higher = faster growth)",
        true,
    ),
    metric(
        "revenue_growth_yoy",
        Direction::Higher,
        MetricCategory::Growth,
        "Revenue Growth YoY (higher = faster growth)",
        true,
    ),
    metric(
        "marketcap_growth_qoq",
        Direction::Higher,
        MetricCategory::Growth,
        "Market Cap Growth QoQ (higher = faster growth)",
        true,
    ),
    metric(
        "marketcap_growth_yoy",
        Direction::Higher,
        MetricCategory::Growth,
        "Market Cap Growth YoY (higher = faster growth)",
        true,
    ),
    metric(
        "assets_growth_qoq",
        Direction::Higher,
        MetricCategory::Growth,
        "Total Assets Growth QoQ (higher = faster growth)",
        true,
    ),
    metric(
        "assets_growth_yoy",
        Direction::Higher,
        MetricCategory::Growth,
        "Total Assets Growth YoY (higher = faster growth)",
        true,
    ),
    metric(
        "eps_growth_qoq",
        Direction::Higher,
        MetricCategory::Growth,
        "Diluted EPS Growth QoQ (higher = better earnings growth)",
        true,
    ),
    metric(
        "eps_growth_yoy",
        Direction::Higher,
        MetricCategory::Growth,
        "Diluted EPS Growth YoY (higher = better earnings growth)",
        true,
    ),
    metric(
        "roe_calculated_growth_qoq",
        Direction::Higher,
        MetricCategory::Growth,
        "ROE Change QoQ (higher = improving profitability)",
        true,
    ),
    metric(
        "roe_calculated_growth_yoy",
        Direction::Higher,
        MetricCategory::Growth,
        "ROE Change YoY (higher = improving profitability)",
        true,
    ),
    metric(
        "roic_calculated_growth_qoq",
        Direction::Higher,
        MetricCategory::Growth,
        "ROIC Change QoQ (higher = improving profitability)",
        true,
    ),
    metric(
        "roic_calculated_growth_yoy",
        Direction::Higher,
        MetricCategory::Growth,
        "ROIC Change YoY (higher = improving profitability)",
        true,
    ),
];

/// Looks up a catalog or supplementary entry by metric name.
pub fn find_metric(name: &str) -> Option<&'static MetricDefinition> {
    all_metrics().find(|m| m.name == name)
}

/// Catalog entries followed by the supplementary ones.
pub fn all_metrics() -> impl Iterator<Item = &'static MetricDefinition> {
    METRIC_CATALOG.iter().chain(SUPPLEMENTARY_METRICS.iter())
}

/// Catalog metric names in catalog order.
pub fn metric_names() -> Vec<&'static str> {
    METRIC_CATALOG.iter().map(|m| m.name).collect()
}

/// Catalog entries belonging to one report category, in catalog order.
pub fn metrics_in(category: MetricCategory) -> impl Iterator<Item = &'static MetricDefinition> {
    METRIC_CATALOG.iter().filter(move |m| m.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_unique_names() {
        let names: HashSet<_> = all_metrics().map(|m| m.name).collect();
        assert_eq!(names.len(), METRIC_CATALOG.len() + SUPPLEMENTARY_METRICS.len());
    }

    #[test]
    fn test_supplementary_metrics_stay_out_of_the_catalog() {
        assert_eq!(METRIC_CATALOG.len(), 11);
        for m in SUPPLEMENTARY_METRICS.iter() {
            assert!(matches!(m.category, MetricCategory::Size | MetricCategory::Growth), "{}", m.name);
            assert!(!metric_names().contains(&m.name), "{}", m.name);
        }
        assert_eq!(find_metric("eps_growth_yoy").unwrap().category, MetricCategory::Growth);
        assert_eq!(metrics_in(MetricCategory::Growth).count(), 0);
    }

    #[test]
    fn test_catalog_directions_follow_category() {
        for m in all_metrics() {
            let expected = match m.category {
                MetricCategory::Valuation | MetricCategory::Leverage => Direction::Lower,
                MetricCategory::Profitability
                | MetricCategory::Liquidity
                | MetricCategory::Size
                | MetricCategory::Growth => Direction::Higher,
            };
            assert_eq!(m.direction, expected, "{}", m.name);
        }
    }

    #[test]
    fn test_find_metric() {
        assert_eq!(find_metric("roe_calculated").unwrap().direction, Direction::Higher);
        assert!(find_metric("not_a_metric").is_none());
        assert_eq!(metric_names()[0], "pe_ratio");
        assert_eq!(metrics_in(MetricCategory::Liquidity).count(), 2);
    }
}
