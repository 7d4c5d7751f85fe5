// Discriminative dataset shift detection
//
// Label reference rows 0 and current rows 1, hold out a stratified share of
// each, fit a random forest on the rest and measure how well it tells the
// held-out rows apart. Only held-out rows are scored: scoring training rows
// would let an overfit forest report a shift that is not there.

use crate::dataset::{column_difference, Dataset};
use crate::error::{Result, Side, ValidationError};
use crate::forest::RandomForest;
use crate::metrics::ShiftMetric;
use crate::shift::config::ShiftConfig;
use crate::shift::split::{stratified_split, LabeledPool};
use crate::shift::statistics::RepeatSummary;
use crate::shift::verdict::{FeatureImportance, ShiftAssessment, ShiftVerdict};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::borrow::Cow;

/// Score how distinguishable `current` is from `reference`
///
/// Returns the held-out discrimination metric in `[0, 1]`: about 0.5 when the
/// two samples come from one distribution, close to 1.0 when they separate
/// cleanly.
///
/// # Example
/// ```
/// use covshift::{detect_dataset_shift, Dataset, ShiftConfig};
///
/// let columns = vec!["x".to_string(), "y".to_string()];
/// let low: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 7) as f64]).collect();
/// let high: Vec<Vec<f64>> = (0..40).map(|i| vec![100.0 + i as f64, (i % 7) as f64]).collect();
///
/// let reference = Dataset::new(columns.clone(), low).unwrap();
/// let current = Dataset::new(columns, high).unwrap();
///
/// let config = ShiftConfig::default().with_seed(7);
/// let score = detect_dataset_shift(&reference, &current, &config).unwrap();
/// assert!(score > 0.8);
/// ```
pub fn detect_dataset_shift(
    reference: &Dataset,
    current: &Dataset,
    config: &ShiftConfig,
) -> Result<f64> {
    assess_dataset_shift(reference, current, config).map(|a| a.score)
}

/// Like [`detect_dataset_shift`], returning verdict, seed and feature importances too
pub fn assess_dataset_shift(
    reference: &Dataset,
    current: &Dataset,
    config: &ShiftConfig,
) -> Result<ShiftAssessment> {
    config.validate()?;
    let current = validate_inputs(reference, current, config)?;

    let seed = config
        .random_seed
        .unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);

    let pool = LabeledPool::new(reference, &current);
    let params = config.forest_params();
    let n_features = reference.n_columns();

    tracing::debug!(
        "Comparing {} reference rows with {} current rows over {} columns (seed={}, pool={})",
        reference.len(),
        current.len(),
        n_features,
        seed,
        pool.len()
    );

    let (small, large) = if reference.len() <= current.len() {
        (reference.len(), current.len())
    } else {
        (current.len(), reference.len())
    };
    if config.metric == ShiftMetric::Accuracy && large >= 4 * small {
        tracing::warn!(
            "Plain accuracy on {} vs {} rows is dominated by the majority side; consider roc-auc",
            large,
            small
        );
    }

    let n_repeats = config.effective_repeats(reference.len(), current.len());
    if n_repeats > config.n_repeats {
        tracing::info!(
            "Raising repeats from {} to {}: the smaller sample holds out too few rows per split",
            config.n_repeats,
            n_repeats
        );
    }

    let mut repeat_scores = Vec::with_capacity(n_repeats);
    let mut importance_sum = vec![0.0; n_features];
    let mut split_sizes = (0, 0);

    for repeat in 0..n_repeats {
        let split = stratified_split(&pool.labels, config.test_fraction, &mut rng)?;
        let forest_seed: u64 = rng.gen();

        let (train_rows, train_labels) = pool.subset(&split.train);
        let forest = RandomForest::fit(&train_rows, &train_labels, &params, forest_seed);

        let (eval_rows, eval_labels) = pool.subset(&split.eval);
        let probas: Vec<f64> = eval_rows
            .iter()
            .map(|row| forest.predict_proba(row))
            .collect();
        let score = config.metric.score(&probas, &eval_labels);

        tracing::debug!(
            "Repeat {}: train={} eval={} {}={:.4}",
            repeat,
            split.train.len(),
            split.eval.len(),
            config.metric,
            score
        );

        if repeat == 0 {
            split_sizes = (split.train.len(), split.eval.len());
        }
        for (acc, imp) in importance_sum.iter_mut().zip(forest.feature_importances()) {
            *acc += imp;
        }
        repeat_scores.push(score);
    }

    let score = repeat_scores.iter().sum::<f64>() / repeat_scores.len() as f64;
    let verdict = ShiftVerdict::from_score(score, config);

    let mut feature_importance: Vec<FeatureImportance> = reference
        .columns()
        .iter()
        .zip(&importance_sum)
        .map(|(column, &sum)| FeatureImportance {
            column: column.clone(),
            importance: sum / n_repeats as f64,
        })
        .collect();
    feature_importance.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    tracing::info!(
        "Dataset shift {}={:.4} verdict={:?}",
        config.metric,
        score,
        verdict
    );

    Ok(ShiftAssessment {
        score,
        metric: config.metric,
        verdict,
        seed,
        repeat_summary: RepeatSummary::from_scores(&repeat_scores),
        repeat_scores,
        reference_rows: reference.len(),
        current_rows: current.len(),
        train_rows: split_sizes.0,
        eval_rows: split_sizes.1,
        feature_importance,
        config: config.clone(),
    })
}

/// Check preconditions and return `current` with columns in reference order
fn validate_inputs<'a>(
    reference: &Dataset,
    current: &'a Dataset,
    config: &ShiftConfig,
) -> Result<Cow<'a, Dataset>> {
    for (side, ds) in [(Side::Reference, reference), (Side::Current, current)] {
        if ds.is_empty() {
            return Err(ValidationError::EmptyDataset { side }.into());
        }
    }

    for (side, ds) in [(Side::Reference, reference), (Side::Current, current)] {
        if ds.len() < config.min_rows_per_side {
            return Err(ValidationError::TooFewRows {
                side,
                required: config.min_rows_per_side,
                actual: ds.len(),
            }
            .into());
        }
    }

    let (missing_in_reference, missing_in_current) =
        column_difference(reference.columns(), current.columns());
    if !missing_in_reference.is_empty() || !missing_in_current.is_empty() {
        return Err(ValidationError::ColumnMismatch {
            missing_in_reference,
            missing_in_current,
        }
        .into());
    }

    if reference.n_columns() == 0 {
        return Err(ValidationError::NoFeatures.into());
    }

    let current = if reference.columns() == current.columns() {
        Cow::Borrowed(current)
    } else {
        let order: Vec<&str> = reference.columns().iter().map(String::as_str).collect();
        Cow::Owned(current.select(&order)?)
    };

    reference.check_finite(Side::Reference)?;
    current.check_finite(Side::Current)?;

    Ok(current)
}

/// Shift detector bound to one configuration
///
/// Holds no mutable state; one instance can serve concurrent comparisons.
#[derive(Debug, Clone, Default)]
pub struct DatasetShiftDetector {
    config: ShiftConfig,
}

impl DatasetShiftDetector {
    /// Create a detector, validating the configuration up front
    pub fn new(config: ShiftConfig) -> std::result::Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ShiftConfig {
        &self.config
    }

    pub fn detect(&self, reference: &Dataset, current: &Dataset) -> Result<f64> {
        detect_dataset_shift(reference, current, &self.config)
    }

    pub fn assess(&self, reference: &Dataset, current: &Dataset) -> Result<ShiftAssessment> {
        assess_dataset_shift(reference, current, &self.config)
    }
}
