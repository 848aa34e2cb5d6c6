//! Value formatting shared by the text report and the tables.
use analyzer::Threshold;
use core_types::{MetricDefinition, StatisticKind};

pub const NOT_AVAILABLE: &str = "N/A";

/// Raw metric value, as a percentage for return and leverage shares.
pub fn format_value(value: Option<f64>, metric: &MetricDefinition) -> String {
    match value {
        None => NOT_AVAILABLE.to_string(),
        Some(v) if metric.percent_display => format!("{:.1}%", v * 100.0),
        Some(v) => format!("{v:.2}"),
    }
}

/// Marker after a score: `**` for outliers, `*` for notable percentiles.
pub fn score_marker(score: f64, threshold: Threshold) -> &'static str {
    match threshold {
        Threshold::Percentile(t) if score <= 100.0 - t || score >= t => "**",
        Threshold::Percentile(_) if score <= 20.0 || score >= 80.0 => "*",
        Threshold::Sigma(sigma) if score.abs() > sigma => "**",
        _ => "",
    }
}

/// Score with its marker, e.g. `95.0%**` or `+2.31**`.
pub fn format_score(score: Option<f64>, kind: StatisticKind, threshold: Threshold) -> String {
    let Some(s) = score else {
        return NOT_AVAILABLE.to_string();
    };
    let marker = score_marker(s, threshold);
    match kind {
        StatisticKind::Percentile => format!("{s:.1}%{marker}"),
        StatisticKind::ZScore | StatisticKind::Mad => format!("{s:+.2}{marker}"),
    }
}

/// Short column label for a statistic kind.
pub fn score_label(kind: StatisticKind) -> &'static str {
    match kind {
        StatisticKind::Percentile => "Pctl",
        StatisticKind::ZScore => "Z",
        StatisticKind::Mad => "MAD",
    }
}
