use crate::format::{format_score, format_value, score_label};
use analyzer::{LongRow, SignalRow, Threshold};
use comfy_table::{Cell, Color, Table, presets::UTF8_FULL};
use core_types::{OutlierDirection, find_metric};
use std::collections::HashMap;

fn header(labels: &[&str]) -> Vec<Cell> {
    labels.iter().map(|l| Cell::new(l).fg(Color::Cyan)).collect()
}

fn direction_cell(direction: Option<OutlierDirection>) -> Cell {
    match direction {
        Some(OutlierDirection::Favorable) => Cell::new("favorable").fg(Color::Green),
        Some(OutlierDirection::Unfavorable) => Cell::new("unfavorable").fg(Color::Red),
        None => Cell::new(""),
    }
}

/// Ranked signal counts, one line per entity, with optional verdict notes.
pub fn signal_table(rows: &[SignalRow], verdicts: Option<&HashMap<String, String>>) -> Table {
    let mut table = Table::new();
    let mut labels = vec![
        "ticker",
        "segment",
        "as of",
        "favorable",
        "unfavorable",
        "total",
        "net",
        "available",
    ];
    if verdicts.is_some() {
        labels.push("verdict");
    }
    table.load_preset(UTF8_FULL).set_header(header(&labels));

    for row in rows {
        let counts = &row.counts;
        let net_color = match counts.net_signal() {
            n if n > 0 => Color::Green,
            n if n < 0 => Color::Red,
            _ => Color::Reset,
        };
        let mut cells = vec![
            Cell::new(row.scored.entity_id()),
            Cell::new(row.scored.segment()),
            Cell::new(row.scored.as_of_date()),
            Cell::new(counts.favorable_count),
            Cell::new(counts.unfavorable_count),
            Cell::new(counts.total_signal_count()),
            Cell::new(counts.net_signal()).fg(net_color),
            Cell::new(counts.metrics_available),
        ];
        if let Some(verdicts) = verdicts {
            let verdict = verdicts.get(row.scored.entity_id()).map(String::as_str).unwrap_or("");
            cells.push(Cell::new(verdict));
        }
        table.add_row(cells);
    }
    table
}

/// Long-format rows for one or more metrics.
pub fn outlier_table(rows: &[LongRow], threshold: Threshold) -> Table {
    let mut table = Table::new();
    let score_header = rows.first().map_or("score", |r| score_label(r.statistic_kind));
    table.load_preset(UTF8_FULL).set_header(header(&[
        "ticker",
        "segment",
        "as of",
        "metric",
        "raw value",
        score_header,
        "n",
        "outlier",
    ]));

    for row in rows {
        let value = match find_metric(&row.metric_name) {
            Some(metric) => format_value(row.raw_value, metric),
            None => row.raw_value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}")),
        };
        table.add_row(vec![
            Cell::new(&row.entity_id),
            Cell::new(&row.segment),
            Cell::new(row.as_of_date),
            Cell::new(&row.metric_name),
            Cell::new(value),
            Cell::new(format_score(row.statistic, row.statistic_kind, threshold)),
            Cell::new(row.population.map_or_else(String::new, |n| n.to_string())),
            direction_cell(row.outlier_direction),
        ]);
    }
    table
}
