use crate::format::{NOT_AVAILABLE, format_score, format_value, score_label};
use analytics::{ScoredRow, WindowedStatistic};
use analyzer::{Threshold, classify};
use core_types::{MetricCategory, MetricDefinition, OutlierDirection};

const RULE_WIDTH: usize = 70;

/// Renders one entity's scored row as a text report grouped by category.
///
/// Metrics absent from `catalog` are not shown; categories with no shown
/// metric are skipped. Nothing is recomputed beyond the outlier label.
pub fn format_entity_report(row: &ScoredRow, catalog: &[MetricDefinition], threshold: Threshold) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = format!(
        "{heavy}\n  {} - Fundamental Analysis\n  As of: {} | Segment: {}\n{heavy}",
        row.entity_id(),
        row.as_of_date(),
        row.segment()
    );

    for category in MetricCategory::ALL {
        let metrics: Vec<&MetricDefinition> = catalog.iter().filter(|m| m.category == category).collect();
        if metrics.is_empty() {
            continue;
        }
        out.push_str(&format!("\n\n{category}:\n{light}"));
        for metric in metrics {
            out.push_str(&format!("\n  {}\n    {}", metric.description, metric_line(row, metric, threshold)));
        }
    }

    out.push_str(&format!("\n\n{light}\n{}\n{heavy}", legend(threshold)));
    out
}

fn metric_line(row: &ScoredRow, metric: &MetricDefinition, threshold: Threshold) -> String {
    let value = format_value(row.observation.value(metric.name), metric);
    let Some(statistic) = row.statistic(metric.name) else {
        return format!("Value: {value}  |  Score: {NOT_AVAILABLE}");
    };

    let kind = statistic.kind();
    let score = format_score(statistic.score(), kind, threshold);
    let label = match classify(statistic.score(), metric.direction, threshold).direction {
        Some(OutlierDirection::Favorable) => "[FAVORABLE]",
        Some(OutlierDirection::Unfavorable) => "[UNFAVORABLE]",
        None => "",
    };

    let line = format!(
        "Value: {value}  |  {}: {score} {} {label}",
        score_label(kind),
        peer_summary(statistic, metric)
    );
    line.trim_end().to_string()
}

/// Peer statistics in parentheses, empty when there was no peer group.
fn peer_summary(statistic: &WindowedStatistic, metric: &MetricDefinition) -> String {
    let Some(n) = statistic.population() else {
        return String::new();
    };
    let v = |x: Option<f64>| format_value(x, metric);
    match *statistic {
        WindowedStatistic::Percentile { median, p10, p90, .. } => {
            format!("(p10={}, med={}, p90={}, n={n})", v(p10), v(median), v(p90))
        }
        WindowedStatistic::ZScore { mean, std, .. } => {
            format!("(mean={}, std={}, n={n})", v(mean), v(std))
        }
        WindowedStatistic::Mad { median, mad, .. } => {
            format!("(med={}, mad={}, n={n})", v(median), v(mad))
        }
    }
}

fn legend(threshold: Threshold) -> String {
    let marks = match threshold {
        Threshold::Percentile(t) => format!(
            "Legend: * = notable (<=20% or >=80%), ** = outlier (<={:.1}% or >={:.1}%)",
            100.0 - t,
            t
        ),
        Threshold::Sigma(sigma) => format!("Legend: ** = outlier (|score| > {sigma:.1})"),
    };
    format!("{marks}\n[FAVORABLE] = outlier in good direction, [UNFAVORABLE] = outlier in bad direction")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{METRIC_CATALOG, ObservationRow, find_metric};

    fn create_test_row() -> ScoredRow {
        let on = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let mut row = ScoredRow::new(
            ObservationRow::new("ACME", on, "Industrials")
                .with_value("pe_ratio", 8.5)
                .with_value("roe_calculated", 0.215),
        );
        row.statistics.insert(
            "pe_ratio".to_string(),
            WindowedStatistic::Percentile {
                percentile: Some(6.1),
                population: Some(40),
                median: Some(17.0),
                p10: Some(9.0),
                p90: Some(31.5),
            },
        );
        row.statistics.insert(
            "roe_calculated".to_string(),
            WindowedStatistic::Percentile {
                percentile: Some(82.0),
                population: Some(38),
                median: Some(0.12),
                p10: Some(0.02),
                p90: Some(0.25),
            },
        );
        row
    }

    #[test]
    fn test_report_header_and_lines() {
        let report = format_entity_report(&create_test_row(), &METRIC_CATALOG, Threshold::Percentile(90.0));
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "=".repeat(70));
        assert_eq!(lines[1], "  ACME - Fundamental Analysis");
        assert_eq!(lines[2], "  As of: 2024-03-31 | Segment: Industrials");
        assert!(report.contains(
            "    Value: 8.50  |  Pctl: 6.1%** (p10=9.00, med=17.00, p90=31.50, n=40) [FAVORABLE]"
        ));
        assert!(report.contains("    Value: 21.5%  |  Pctl: 82.0%* (p10=2.0%, med=12.0%, p90=25.0%, n=38)"));
        assert!(report.contains("  Debt-to-Assets (lower = less leveraged)\n    Value: N/A  |  Score: N/A"));
        assert!(report.contains("Legend: * = notable (<=20% or >=80%), ** = outlier (<=10.0% or >=90.0%)"));
        assert_eq!(*lines.last().unwrap(), "=".repeat(70));
    }

    #[test]
    fn test_categories_follow_catalog_subset() {
        let pe = *find_metric("pe_ratio").unwrap();
        let report = format_entity_report(&create_test_row(), &[pe], Threshold::Percentile(90.0));
        assert!(report.contains("Valuation:"));
        assert!(!report.contains("Profitability:"));
    }

    #[test]
    fn test_zscore_rows_render_mean_and_std() {
        let on = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let mut row = ScoredRow::new(ObservationRow::new("CCC", on, "Tech").with_value("pe_ratio", 100.0));
        row.statistics.insert(
            "pe_ratio".to_string(),
            WindowedStatistic::ZScore {
                mean: Some(41.67),
                std: Some(50.58),
                zscore: Some(1.153),
                population: Some(3),
            },
        );
        let pe = *find_metric("pe_ratio").unwrap();
        let report = format_entity_report(&row, &[pe], Threshold::Sigma(1.0));
        assert!(report.contains("Value: 100.00  |  Z: +1.15** (mean=41.67, std=50.58, n=3) [UNFAVORABLE]"));
        assert!(report.contains("Legend: ** = outlier (|score| > 1.0)"));
    }

    #[test]
    fn test_growth_section_follows_the_ratio_categories() {
        let mut row = create_test_row();
        row.observation = row.observation.clone().with_value("revenue_growth_yoy", 0.3);
        row.statistics.insert(
            "revenue_growth_yoy".to_string(),
            WindowedStatistic::Percentile {
                percentile: Some(95.0),
                population: Some(12),
                median: Some(0.05),
                p10: Some(-0.1),
                p90: Some(0.2),
            },
        );
        let catalog = [*find_metric("pe_ratio").unwrap(), *find_metric("revenue_growth_yoy").unwrap()];
        let report = format_entity_report(&row, &catalog, Threshold::Percentile(90.0));

        let growth = report.find("Growth:").unwrap();
        assert!(report.find("Valuation:").unwrap() < growth);
        assert!(report.contains(
            "  Revenue Growth YoY (higher = faster growth)\n    \
             Value: 30.0%  |  Pctl: 95.0%** (p10=-10.0%, med=5.0%, p90=20.0%, n=12) [FAVORABLE]"
        ));
    }
}
