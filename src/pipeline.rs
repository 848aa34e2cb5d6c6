use analytics::{ScoredTable, ScoringEngine};
use analyzer::Threshold;
use anyhow::{Context, Result, bail};
use chrono::{Days, Local, NaiveDate};
use clap::Args;
use configuration::{DataPaths, ScoreConfiguration, Settings};
use core_types::{METRIC_CATALOG, MetricDefinition, ObservationTable, StatisticKind, all_metrics};
use dataset::{DataReader, DatasetError, TableSchema, read_observation_table};
use indicatif::{ProgressBar, ProgressStyle};
use metrics::{SegmentMap, derive_observations};
use std::path::PathBuf;
use tracing::{info, warn};

/// Where the data comes from and how peers are scored.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Analysis date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub as_of_date: Option<NaiveDate>,

    /// Trailing peer window in calendar days. Defaults to the configured value.
    #[arg(long)]
    pub window_days: Option<i64>,

    /// Statistic used to compare each entity with its peers.
    #[arg(long, value_enum, default_value_t = StatisticKind::Percentile)]
    pub statistic: StatisticKind,

    /// Outlier threshold: a percentile cut for percentiles, a sigma multiple otherwise.
    #[arg(long, alias = "sigma-threshold")]
    pub threshold: Option<f64>,

    /// Prepared observation table (.parquet or .csv) used instead of the snapshots.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

/// A scored table plus the definitions of every metric it carries statistics for.
pub struct ScoredData {
    pub table: ScoredTable,
    pub metrics: Vec<MetricDefinition>,
}

impl ScoredData {
    /// The catalog subset, which is all that signal counts cover.
    pub fn catalog(&self) -> Vec<MetricDefinition> {
        self.metrics
            .iter()
            .filter(|m| METRIC_CATALOG.contains(m))
            .copied()
            .collect()
    }
}

/// Command-line flags layered over the configured defaults.
pub struct RunPlan {
    pub as_of: NaiveDate,
    pub kind: StatisticKind,
    pub config: ScoreConfiguration,
    pub threshold: Threshold,
    pub schema: TableSchema,
    input: Option<PathBuf>,
    paths: DataPaths,
    lookback_padding_days: i64,
    max_data_delay_days: Option<i64>,
}

impl RunPlan {
    pub fn resolve(settings: &Settings, args: &DataArgs) -> Result<Self> {
        let kind = args.statistic;
        let mut config = settings.scoring.score_configuration(kind);
        if let Some(window_days) = args.window_days {
            config = config.with_window_days(window_days);
        }
        if let Some(threshold) = args.threshold {
            config = config.with_threshold(threshold);
        }
        config.validate_for(kind).context("Invalid scoring options")?;
        let threshold = Threshold::from_config(&config, kind)?;

        Ok(Self {
            as_of: args.as_of_date.unwrap_or_else(|| Local::now().date_naive()),
            kind,
            config,
            threshold,
            schema: TableSchema::from_defaults(&settings.scoring),
            input: args.input.clone(),
            paths: settings.data.clone(),
            lookback_padding_days: settings.scoring.lookback_padding_days,
            max_data_delay_days: settings.scoring.max_data_delay_days,
        })
    }

    /// First datekey loaded: one window plus padding before the as-of date.
    pub fn start_date(&self) -> NaiveDate {
        let days = (self.config.window_days + self.lookback_padding_days).max(0) as u64;
        self.as_of.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
    }

    pub fn reads_snapshots(&self) -> bool {
        self.input.is_none()
    }

    /// Loads observations known on or before the as-of date.
    ///
    /// Returns `None` after telling the user when there is nothing to score.
    pub fn load_observations(&self) -> Result<Option<ObservationTable>> {
        match &self.input {
            Some(path) => {
                let mut table = read_observation_table(path, &self.schema)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                table.rows.retain(|r| r.as_of_date <= self.as_of);
                if table.is_empty() {
                    println!("No rows dated on or before {} in {}", self.as_of, path.display());
                    return Ok(None);
                }
                Ok(Some(table))
            }
            None => self.load_snapshots(),
        }
    }

    fn load_snapshots(&self) -> Result<Option<ObservationTable>> {
        let start = self.start_date();
        println!("\nLoading data from {start} to {}...", self.as_of);

        let progress = stage_bar(2)?;
        progress.set_message("Reading fundamentals");
        let reader = DataReader::new(self.paths.clone());
        let records = match reader.read_fundamentals(start, self.as_of, self.max_data_delay_days) {
            Ok(records) => records,
            Err(DatasetError::NotFound(reason)) => {
                progress.finish_and_clear();
                println!("No data found: {reason}");
                return Ok(None);
            }
            Err(e) => return Err(e).context("Failed to read fundamentals"),
        };
        if records.is_empty() {
            progress.finish_and_clear();
            println!("No data found for date range {start} to {}", self.as_of);
            return Ok(None);
        }
        progress.inc(1);

        progress.set_message("Deriving ratios");
        let tickers = match reader.read_tickers(self.as_of) {
            Ok(tickers) => tickers,
            Err(DatasetError::NotFound(reason)) => {
                warn!(%reason, "No ticker metadata, every entity falls into the Unknown segment");
                Vec::new()
            }
            Err(e) => return Err(e).context("Failed to read ticker metadata"),
        };
        let table = derive_observations(&records, &SegmentMap::from_tickers(&tickers));
        progress.inc(1);
        progress.finish_and_clear();

        info!(rows = table.len(), "Observations ready");
        Ok(Some(table))
    }

    /// Scores `metrics`, or every known metric the table carries when empty.
    pub fn score(&self, table: &ObservationTable, metrics: &[String]) -> Result<ScoredTable> {
        let requested: Vec<&str> = if metrics.is_empty() {
            known_metrics(table)?.iter().map(|m| m.name).collect()
        } else {
            metrics.iter().map(String::as_str).collect()
        };

        let progress = stage_bar(1)?;
        progress.set_message(format!("Scoring {} metric(s) with {}", requested.len(), self.kind));
        let scored = ScoringEngine::for_catalog(self.config.clone(), self.kind)?
            .score(table, &requested)
            .context("Scoring failed")?;
        progress.inc(1);
        progress.finish_and_clear();
        Ok(scored)
    }

    /// Loads and scores every known metric available.
    pub fn load_and_score(&self) -> Result<Option<ScoredData>> {
        let Some(table) = self.load_observations()? else {
            return Ok(None);
        };
        let metrics = known_metrics(&table)?;
        let scored = self.score(&table, &[])?;
        Ok(Some(ScoredData { table: scored, metrics }))
    }
}

/// Catalog and supplementary metrics present in `table`, catalog first.
pub fn known_metrics(table: &ObservationTable) -> Result<Vec<MetricDefinition>> {
    let metrics: Vec<MetricDefinition> = all_metrics()
        .filter(|m| table.has_metric(m.name))
        .copied()
        .collect();
    if metrics.is_empty() {
        bail!("The table carries none of the known metrics");
    }
    Ok(metrics)
}

fn stage_bar(stages: u64) -> Result<ProgressBar> {
    let progress = ProgressBar::new(stages);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    Ok(progress)
}
