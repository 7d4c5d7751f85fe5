// Configuration for discriminative dataset shift detection
//
// Every option is a named, typed, defaulted field. Files may set any subset;
// missing fields take the defaults below.

use crate::error::ValidationError;
use crate::forest::{ForestParams, MaxFeatures};
use crate::metrics::ShiftMetric;
use crate::shift::split::eval_count;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the dataset shift detector
///
/// # Example
/// ```
/// use covshift::shift::ShiftConfig;
///
/// let config = ShiftConfig::default();
/// assert_eq!(config.n_trees, 100);
/// assert_eq!(config.test_fraction, 0.3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShiftConfig {
    /// Number of trees in the discriminator forest
    pub n_trees: usize,

    /// Depth cap per tree; `None` grows until leaves are pure
    pub max_depth: Option<usize>,

    /// Share of each dataset held out for evaluation, in (0, 1)
    pub test_fraction: f64,

    /// Seed for splitting and tree sampling
    ///
    /// `None` draws a fresh seed per call; the seed actually used is reported
    /// in the assessment so the run can be reproduced.
    pub random_seed: Option<u64>,

    /// Minimum number of rows each dataset must have
    pub min_rows_per_side: usize,

    /// Smallest leaf a split may create
    pub min_samples_leaf: usize,

    /// Features tried at each split
    pub max_features: MaxFeatures,

    /// Held-out metric reported as the score
    ///
    /// - `roc-auc` (default): 0.5 at chance regardless of class balance
    /// - `balanced-accuracy`: 0.5 at chance regardless of class balance
    /// - `accuracy`: chance equals the majority class rate
    pub metric: ShiftMetric,

    /// Number of independent stratified splits averaged into the score
    ///
    /// More repeats lower the variance when one dataset is small.
    pub n_repeats: usize,

    /// Held-out rows the smaller side should contribute over all repeats
    ///
    /// When one split alone holds out fewer, repeats are added on top of
    /// `n_repeats` until this many are scored. `0` turns this off.
    pub min_eval_rows: usize,

    /// Scores at or above this are reported as a shift
    pub shift_threshold: f64,

    /// Scores below this are reported as no shift
    pub no_shift_threshold: f64,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            test_fraction: 0.3,
            random_seed: None,
            min_rows_per_side: 10,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            metric: ShiftMetric::RocAuc,
            n_repeats: 1,
            min_eval_rows: 60,
            shift_threshold: 0.8,
            no_shift_threshold: 0.6,
        }
    }
}

impl ShiftConfig {
    /// Smaller, shallower forest for quick checks on large tables
    pub fn fast() -> Self {
        Self {
            n_trees: 25,
            max_depth: Some(10),
            min_samples_leaf: 2,
            ..Self::default()
        }
    }

    /// Larger forest averaged over several splits, for small or imbalanced samples
    pub fn thorough() -> Self {
        Self {
            n_trees: 300,
            n_repeats: 5,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load and validate a TOML configuration file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.n_trees == 0 {
            return Err(invalid("n_trees", "must be >= 1".to_string()));
        }

        if self.max_depth == Some(0) {
            return Err(invalid("max_depth", "must be >= 1 when set".to_string()));
        }

        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(invalid(
                "test_fraction",
                format!("must be in (0, 1), got {}", self.test_fraction),
            ));
        }

        if self.min_rows_per_side == 0 {
            return Err(invalid("min_rows_per_side", "must be >= 1".to_string()));
        }

        if self.min_samples_leaf == 0 {
            return Err(invalid("min_samples_leaf", "must be >= 1".to_string()));
        }

        if self.max_features == MaxFeatures::Count(0) {
            return Err(invalid("max_features", "count must be >= 1".to_string()));
        }

        if self.n_repeats == 0 {
            return Err(invalid("n_repeats", "must be >= 1".to_string()));
        }

        for (name, value) in [
            ("shift_threshold", self.shift_threshold),
            ("no_shift_threshold", self.no_shift_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(name, format!("must be in [0, 1], got {}", value)));
            }
        }

        if self.no_shift_threshold > self.shift_threshold {
            return Err(invalid(
                "no_shift_threshold",
                format!(
                    "must not exceed shift_threshold ({} > {})",
                    self.no_shift_threshold, self.shift_threshold
                ),
            ));
        }

        Ok(())
    }

    /// Repeats to run for samples of these sizes
    ///
    /// At least `n_repeats`, raised so the smaller side's held-out rows
    /// add up to `min_eval_rows`.
    pub fn effective_repeats(&self, reference_rows: usize, current_rows: usize) -> usize {
        let per_split = eval_count(reference_rows.min(current_rows), self.test_fraction);
        self.n_repeats.max(self.min_eval_rows.div_ceil(per_split))
    }

    pub(crate) fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
        }
    }
}

fn invalid(name: &'static str, reason: String) -> ValidationError {
    ValidationError::InvalidOption { name, reason }
}
