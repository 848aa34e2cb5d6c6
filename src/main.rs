mod pipeline;

use analyzer::{
    AnalyzerError, OutlierFilter, SignalScreen, Threshold, latest_per_entity, melt,
    select_metric_outliers,
};
use analytics::ScoredRow;
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use configuration::{Settings, init_tracing, load_config, load_config_from};
use core_types::{Direction, MetricDefinition, OutlierDirection, SignalSortKey, find_metric};
use dataset::{read_verdicts, write_scored_table};
use pipeline::{DataArgs, RunPlan};
use reporter::{format_entity_report, outlier_table, signal_table};
use std::path::PathBuf;

const RULE_WIDTH: usize = 70;

/// The main entry point for the Peerscope screening tool.
fn main() -> Result<()> {
    // PEERSCOPE__* overrides may live in a local .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("Failed to load configuration")?;
    let _log_guard = init_tracing(&settings.logging).context("Failed to initialise logging")?;

    match cli.command {
        Commands::CountSelection(args) => handle_count_selection(&settings, args),
        Commands::MetricSelection(args) => handle_metric_selection(&settings, args),
        Commands::Analyze(args) => handle_analyze(&settings, args),
        Commands::Score(args) => handle_score(&settings, args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Point-in-time, peer-relative screening of company fundamentals.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file. Defaults to ./peerscope.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank entities by how many metrics flag them as peer outliers.
    CountSelection(CountSelectionArgs),
    /// List the entities that stand out from their peers on one metric.
    MetricSelection(MetricSelectionArgs),
    /// Print every metric of one entity against its peers.
    Analyze(AnalyzeArgs),
    /// Score a table and write it out with statistic columns.
    Score(ScoreArgs),
}

#[derive(Args)]
struct CountSelectionArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Minimum total signal count to include.
    #[arg(long, default_value_t = 1)]
    min_signals: usize,

    /// Maximum total signal count to include.
    #[arg(long)]
    max_signals: Option<usize>,

    /// Column to sort by.
    #[arg(long, value_enum, default_value_t = SignalSortKey::NetSignal)]
    sort_by: SignalSortKey,

    /// Sort in ascending order (default: descending).
    #[arg(long)]
    ascending: bool,

    /// Number of entities to display.
    #[arg(long, default_value_t = 20)]
    top_n: usize,
}

#[derive(Args)]
struct MetricSelectionArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Metric to screen on (e.g. "pe_ratio" or "revenue_growth_yoy").
    #[arg(long)]
    metric: String,

    /// Which side of the peer distribution to look for.
    #[arg(long, value_enum, default_value_t = OutlierDirection::Favorable)]
    direction: OutlierDirection,

    /// Number of entities to display.
    #[arg(long, default_value_t = 20)]
    top_n: usize,

    /// Show every metric for this ticker after the list.
    #[arg(long)]
    drill_down: Option<String>,
}

#[derive(Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Ticker to analyze.
    #[arg(long)]
    ticker: String,

    /// Print the long-format rows as JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ScoreArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Output file (.parquet or .csv). Defaults to the results directory.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Metric column to score; repeatable. Defaults to every known metric present.
    #[arg(long = "metric")]
    metrics: Vec<String>,

    /// Also print the outlier rows of the scored table.
    #[arg(long)]
    outliers: bool,

    /// Only print outliers in this direction ("favorable" or "unfavorable").
    #[arg(long)]
    outlier_direction: Option<String>,

    /// Only print outliers for these tickers; repeatable.
    #[arg(long = "ticker")]
    tickers: Vec<String>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn print_banner(lines: &[String]) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    for line in lines {
        println!("  {line}");
    }
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn print_section(title: &str) {
    println!("\n{}", "-".repeat(RULE_WIDTH));
    println!("{title}");
    println!("{}\n", "-".repeat(RULE_WIDTH));
}

/// Handles the `count-selection` command.
fn handle_count_selection(settings: &Settings, args: CountSelectionArgs) -> Result<()> {
    let plan = RunPlan::resolve(settings, &args.data)?;
    let signal_range = match args.max_signals {
        Some(max) => format!("{}-{max}", args.min_signals),
        None => format!(">= {}", args.min_signals),
    };

    print_banner(&[
        "Count-Based Stock Selection".to_string(),
        format!("As of: {} | Threshold: {}", plan.as_of, plan.threshold),
        format!("Signals: {signal_range} | Sort by: {}", args.sort_by),
    ]);

    let Some(scored) = plan.load_and_score()? else {
        return Ok(());
    };

    let catalog = scored.catalog();
    if catalog.is_empty() {
        bail!("Signal counts need at least one catalog metric in the loaded data");
    }
    let screen = SignalScreen {
        metrics: catalog,
        min_signals: args.min_signals,
        max_signals: args.max_signals,
        sort_by: args.sort_by,
        ascending: args.ascending,
        top_n: Some(args.top_n),
        ..SignalScreen::new(plan.threshold)
    };
    let outcome = screen.run(&scored.table.rows)?;
    println!("Found {} stocks with {signal_range} signal(s)", outcome.matched);

    let order = if args.ascending { "ascending" } else { "descending" };
    print_section(&format!("Top {} stocks by {} ({order})", args.top_n, args.sort_by));

    let Some(top) = outcome.rows.first() else {
        println!("No stocks found matching criteria.");
        return Ok(());
    };

    let verdicts = read_verdicts(&settings.data.verdicts).context("Failed to read verdicts")?;
    println!("{}", signal_table(&outcome.rows, verdicts.as_ref()));
    println!(
        "\nTip: Run `peerscope analyze --ticker {} --as-of-date {}` for details",
        top.scored.entity_id(),
        plan.as_of
    );
    Ok(())
}

fn metric_heading(metric: &MetricDefinition, direction: OutlierDirection) -> String {
    let name = metric.name;
    match (direction, metric.direction) {
        (OutlierDirection::Favorable, Direction::Lower) => {
            format!("Stocks with LOW {name} (favorable - cheap/safe)")
        }
        (OutlierDirection::Favorable, Direction::Higher) => {
            format!("Stocks with HIGH {name} (favorable - good performance)")
        }
        (OutlierDirection::Unfavorable, Direction::Lower) => {
            format!("Stocks with HIGH {name} (unfavorable - expensive/risky)")
        }
        (OutlierDirection::Unfavorable, Direction::Higher) => {
            format!("Stocks with LOW {name} (unfavorable - poor performance)")
        }
    }
}

/// Handles the `metric-selection` command.
fn handle_metric_selection(settings: &Settings, args: MetricSelectionArgs) -> Result<()> {
    let metric = *find_metric(&args.metric)
        .ok_or_else(|| AnalyzerError::UnknownMetric(args.metric.clone()))?;
    let plan = RunPlan::resolve(settings, &args.data)?;

    print_banner(&[
        "Metric-Based Stock Selection".to_string(),
        format!(
            "As of: {} | Metric: {} | Direction: {}",
            plan.as_of, metric.name, args.direction
        ),
        format!(
            "Threshold: {} | Window: {} days",
            plan.threshold, plan.config.window_days
        ),
    ]);

    let Some(scored) = plan.load_and_score()? else {
        return Ok(());
    };

    if !scored.table.is_scored(metric.name) {
        bail!("{} is not available in the loaded data", metric.name);
    }

    let latest = latest_per_entity(&scored.table.rows);
    println!("Evaluating {} stocks (most recent data per ticker)", latest.len());

    let mut selected = select_metric_outliers(&latest, metric.name, args.direction, plan.threshold, args.top_n)?;
    selected.truncate(args.top_n);

    print_section(&metric_heading(&metric, args.direction));
    let Some(top) = selected.first() else {
        println!("No stocks found matching criteria.");
        return Ok(());
    };
    println!("{}", outlier_table(&selected, plan.threshold));

    match &args.drill_down {
        Some(ticker) => drill_down(&latest, ticker, &scored.metrics, plan.threshold),
        None => println!(
            "\nTip: Use --drill-down {} to see all metrics for the top stock",
            top.entity_id
        ),
    }
    Ok(())
}

fn drill_down(latest: &[ScoredRow], ticker: &str, metrics: &[MetricDefinition], threshold: Threshold) {
    print_banner(&[format!("Drill-down: All metrics for {ticker}")]);
    match latest.iter().find(|r| r.entity_id() == ticker) {
        Some(row) => println!("{}", format_entity_report(row, metrics, threshold)),
        None => println!("Ticker {ticker} not found in data"),
    }
}

/// Handles the `analyze` command.
fn handle_analyze(settings: &Settings, args: AnalyzeArgs) -> Result<()> {
    let plan = RunPlan::resolve(settings, &args.data)?;
    println!("\nAnalyzing {} as of {}", args.ticker, plan.as_of);

    let Some(table) = plan.load_observations()? else {
        return Ok(());
    };
    if !table.rows.iter().any(|r| r.entity_id == args.ticker) {
        println!("Ticker {} not found in data", args.ticker);
        return Ok(());
    }

    let metrics = pipeline::known_metrics(&table)?;
    let scored = plan.score(&table, &[])?;
    let own_rows: Vec<ScoredRow> = scored
        .rows
        .into_iter()
        .filter(|r| r.entity_id() == args.ticker)
        .collect();
    let Some(row) = latest_per_entity(&own_rows).pop() else {
        println!("No data found for {} as of {}", args.ticker, plan.as_of);
        return Ok(());
    };

    if args.json {
        let long = melt(std::slice::from_ref(&row), &metrics, plan.threshold)?;
        println!("{}", serde_json::to_string_pretty(&long)?);
    } else {
        println!("{}", format_entity_report(&row, &metrics, plan.threshold));
    }
    Ok(())
}

/// Handles the `score` command.
fn handle_score(settings: &Settings, args: ScoreArgs) -> Result<()> {
    let plan = RunPlan::resolve(settings, &args.data)?;
    // Fail on a malformed direction before any data is read.
    let filter = OutlierFilter::new(true, args.outlier_direction.as_deref())?;

    let Some(table) = plan.load_observations()? else {
        return Ok(());
    };
    let scored = plan.score(&table, &args.metrics)?;

    let output = args.output.clone().unwrap_or_else(|| {
        let source = if plan.reads_snapshots() { "snapshots" } else { "input" };
        settings
            .data
            .results
            .join(format!("scored_{source}_{}_{}.parquet", plan.kind, plan.as_of))
    });
    write_scored_table(&output, &scored, &plan.schema)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Scored {} rows on {} metric(s) with {} over {} days -> {}",
        scored.len(),
        scored.metrics.len(),
        plan.kind,
        scored.window_days,
        output.display()
    );

    if args.outliers || args.outlier_direction.is_some() || !args.tickers.is_empty() {
        let filter = if args.tickers.is_empty() {
            filter
        } else {
            filter.with_entities(args.tickers.iter().cloned())
        };
        let definitions: Vec<MetricDefinition> = scored
            .metrics
            .iter()
            .filter_map(|m| find_metric(m).copied())
            .collect();
        let long = filter.apply(melt(&scored.rows, &definitions, plan.threshold)?);
        print_section(&format!("{} outlier cell(s) at {}", long.len(), plan.threshold));
        if !long.is_empty() {
            println!("{}", outlier_table(&long, plan.threshold));
        }
    }
    Ok(())
}
