//! CLI argument parsing for covshift

use crate::metrics::ShiftMetric;
use crate::shift::ShiftConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report (default)
    Text,
    /// JSON for machine parsing
    Json,
}

/// Metric reported as the shift score
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    RocAuc,
    BalancedAccuracy,
    Accuracy,
}

impl From<MetricArg> for ShiftMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::RocAuc => ShiftMetric::RocAuc,
            MetricArg::BalancedAccuracy => ShiftMetric::BalancedAccuracy,
            MetricArg::Accuracy => ShiftMetric::Accuracy,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "covshift")]
#[command(version)]
#[command(
    about = "Detect dataset shift by training a random forest to tell two samples apart",
    long_about = None
)]
pub struct Cli {
    /// Reference sample (dataset A)
    #[arg(short = 'r', long = "reference", value_name = "CSV")]
    pub reference: Option<PathBuf>,

    /// Current sample (dataset B)
    #[arg(short = 'c', long = "current", value_name = "CSV")]
    pub current: Option<PathBuf>,

    /// Single table to split into two samples (use with --split-column/--split-threshold)
    #[arg(short = 'i', long = "input", value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Column whose value decides the split of --input
    #[arg(long = "split-column", value_name = "COLUMN")]
    pub split_column: Option<String>,

    /// Rows with split column <= VALUE are the reference, the rest the current sample
    #[arg(long = "split-threshold", value_name = "VALUE", allow_hyphen_values = true)]
    pub split_threshold: Option<f64>,

    /// TOML detector configuration; flags below override it
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of trees in the forest (default: 100)
    #[arg(long = "n-trees", value_name = "N")]
    pub n_trees: Option<usize>,

    /// Maximum tree depth (default: unlimited)
    #[arg(long = "max-depth", value_name = "DEPTH")]
    pub max_depth: Option<usize>,

    /// Share of each sample held out for evaluation (default: 0.3)
    #[arg(long = "test-fraction", value_name = "FRACTION")]
    pub test_fraction: Option<f64>,

    /// Random seed for reproducible scores
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Minimum rows per sample (default: 10)
    #[arg(long = "min-rows", value_name = "N")]
    pub min_rows: Option<usize>,

    /// Held-out metric used as the score (default: roc-auc)
    #[arg(long = "metric", value_enum)]
    pub metric: Option<MetricArg>,

    /// Number of stratified splits averaged into the score (default: 1)
    #[arg(long = "repeats", value_name = "N")]
    pub repeats: Option<usize>,

    /// Drop columns whose name matches this regex before comparing
    #[arg(long = "exclude-columns", value_name = "REGEX")]
    pub exclude_columns: Option<String>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Build the detector configuration: file (or defaults), then flag overrides
    pub fn shift_config(&self) -> anyhow::Result<ShiftConfig> {
        let mut config = match &self.config {
            Some(path) => ShiftConfig::from_file(path)?,
            None => ShiftConfig::default(),
        };

        if let Some(n) = self.n_trees {
            config.n_trees = n;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = Some(depth);
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        if let Some(seed) = self.seed {
            config.random_seed = Some(seed);
        }
        if let Some(n) = self.min_rows {
            config.min_rows_per_side = n;
        }
        if let Some(metric) = self.metric {
            config.metric = metric.into();
        }
        if let Some(n) = self.repeats {
            config.n_repeats = n;
        }

        config.validate()?;
        Ok(config)
    }
}
