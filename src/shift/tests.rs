// Detector tests: input validation, alignment and small shift scenarios
//
// Larger scenarios on synthetic housing data live in tests/.

use super::*;
use crate::error::{NumericError, ShiftError, Side, ValidationError};
use crate::forest::MaxFeatures;
use crate::metrics::ShiftMetric;
use crate::Dataset;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// `n` rows of uniform noise in three columns, first column offset by `shift`
fn noise(n: usize, shift: f64, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = (0..n)
        .map(|_| {
            vec![
                shift + rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
            ]
        })
        .collect();
    Dataset::new(columns(&["a", "b", "c"]), rows).unwrap()
}

fn seeded() -> ShiftConfig {
    ShiftConfig {
        n_trees: 30,
        ..ShiftConfig::default()
    }
    .with_seed(17)
}

// ==================== VALIDATION ====================

#[test]
fn test_empty_reference_rejected() {
    let empty = Dataset::new(columns(&["a", "b", "c"]), vec![]).unwrap();
    let err = detect_dataset_shift(&empty, &noise(20, 0.0, 1), &seeded()).unwrap_err();
    assert_eq!(
        err,
        ShiftError::Validation(ValidationError::EmptyDataset {
            side: Side::Reference
        })
    );
}

#[test]
fn test_empty_current_rejected() {
    let empty = Dataset::new(columns(&["a", "b", "c"]), vec![]).unwrap();
    let err = detect_dataset_shift(&noise(20, 0.0, 1), &empty, &seeded()).unwrap_err();
    assert_eq!(
        err,
        ShiftError::Validation(ValidationError::EmptyDataset {
            side: Side::Current
        })
    );
}

#[test]
fn test_too_few_rows_rejected() {
    let err = detect_dataset_shift(&noise(20, 0.0, 1), &noise(9, 0.0, 2), &seeded()).unwrap_err();
    assert_eq!(
        err,
        ShiftError::Validation(ValidationError::TooFewRows {
            side: Side::Current,
            required: 10,
            actual: 9,
        })
    );
}

#[test]
fn test_column_mismatch_rejected() {
    let other = Dataset::new(
        columns(&["a", "b", "d"]),
        (0..20).map(|i| vec![i as f64, 0.0, 1.0]).collect(),
    )
    .unwrap();

    let err = detect_dataset_shift(&noise(20, 0.0, 1), &other, &seeded()).unwrap_err();
    match err {
        ShiftError::Validation(ValidationError::ColumnMismatch {
            missing_in_reference,
            missing_in_current,
        }) => {
            assert_eq!(missing_in_reference, vec!["d".to_string()]);
            assert_eq!(missing_in_current, vec!["c".to_string()]);
        }
        other => panic!("Expected ColumnMismatch, got {:?}", other),
    }
}

#[test]
fn test_no_columns_rejected() {
    let empty_cols = Dataset::new(vec![], vec![vec![]; 20]).unwrap();
    let err = detect_dataset_shift(&empty_cols, &empty_cols, &seeded()).unwrap_err();
    assert_eq!(err, ShiftError::Validation(ValidationError::NoFeatures));
}

#[test]
fn test_non_finite_rejected_as_numeric() {
    let mut rows = noise(20, 0.0, 1).rows().to_vec();
    rows[4][1] = f64::NAN;
    let bad = Dataset::new(columns(&["a", "b", "c"]), rows).unwrap();

    let err = detect_dataset_shift(&noise(20, 0.0, 2), &bad, &seeded()).unwrap_err();
    assert!(err.is_numeric());
    match err {
        ShiftError::Numeric(NumericError::NonFinite {
            side, row, column, ..
        }) => {
            assert_eq!(side, Side::Current);
            assert_eq!(row, 4);
            assert_eq!(column, "b");
        }
        other => panic!("Expected NonFinite, got {:?}", other),
    }
}

#[test]
fn test_invalid_config_rejected() {
    let config = ShiftConfig {
        test_fraction: 0.0,
        ..seeded()
    };
    let err = detect_dataset_shift(&noise(20, 0.0, 1), &noise(20, 0.0, 2), &config).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_class_too_small_to_split() {
    let config = ShiftConfig {
        min_rows_per_side: 1,
        ..seeded()
    };
    let one_row = Dataset::new(columns(&["a", "b", "c"]), vec![vec![0.5, 0.5, 0.5]]).unwrap();

    let err = detect_dataset_shift(&noise(20, 0.0, 1), &one_row, &config).unwrap_err();
    assert!(matches!(
        err,
        ShiftError::Validation(ValidationError::EmptySplit {
            side: Side::Current,
            ..
        })
    ));
}

#[test]
fn test_detector_new_validates() {
    let config = ShiftConfig {
        n_trees: 0,
        ..ShiftConfig::default()
    };
    assert!(DatasetShiftDetector::new(config).is_err());
    assert_eq!(DatasetShiftDetector::default().config().n_trees, 100);
}

// ==================== BEHAVIOUR ====================

#[test]
fn test_column_order_is_aligned() {
    let reference = noise(40, 0.0, 1);
    let current = noise(40, 3.0, 2);
    let reordered = current.select(&["c", "a", "b"]).unwrap();

    let config = seeded();
    let a = detect_dataset_shift(&reference, &current, &config).unwrap();
    let b = detect_dataset_shift(&reference, &reordered, &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_separable_samples_score_high() {
    let assessment =
        assess_dataset_shift(&noise(60, 0.0, 1), &noise(60, 5.0, 2), &seeded()).unwrap();

    assert!(assessment.score > 0.95, "score = {}", assessment.score);
    assert_eq!(assessment.verdict, ShiftVerdict::Shift);
    assert_eq!(assessment.seed, 17);
    assert_eq!(assessment.eval_rows, 36); // 18 per side
    assert_eq!(assessment.train_rows, 84);
    assert_eq!(assessment.feature_importance[0].column, "a");
}

#[test]
fn test_identical_copy_scores_low() {
    let reference = noise(60, 0.0, 1);
    let copy = reference.clone();

    let assessment = assess_dataset_shift(&reference, &copy, &seeded()).unwrap();
    assert!(assessment.score < 0.6, "score = {}", assessment.score);
    assert!(assessment.suggests_duplicate_rows());
    assert!(assessment.to_report_string().contains("rows duplicated across"));
}

#[test]
fn test_independent_samples_do_not_suggest_duplicates() {
    let assessment =
        assess_dataset_shift(&noise(60, 0.0, 1), &noise(60, 0.0, 2), &seeded()).unwrap();
    assert!(!assessment.suggests_duplicate_rows(), "score = {}", assessment.score);
}

#[test]
fn test_every_metric_bounded() {
    for metric in [
        ShiftMetric::RocAuc,
        ShiftMetric::BalancedAccuracy,
        ShiftMetric::Accuracy,
    ] {
        let config = ShiftConfig { metric, ..seeded() };
        let score = detect_dataset_shift(&noise(40, 0.0, 1), &noise(40, 0.3, 2), &config).unwrap();
        assert!((0.0..=1.0).contains(&score), "{} = {}", metric, score);
    }
}

#[test]
fn test_repeats_are_averaged() {
    let config = ShiftConfig {
        n_repeats: 3,
        min_eval_rows: 0,
        max_features: MaxFeatures::All,
        ..seeded()
    };
    let assessment =
        assess_dataset_shift(&noise(40, 0.0, 1), &noise(40, 0.5, 2), &config).unwrap();

    assert_eq!(assessment.repeat_scores.len(), 3);
    let mean = assessment.repeat_scores.iter().sum::<f64>() / 3.0;
    assert!((assessment.score - mean).abs() < 1e-12);
    assert!(assessment.repeat_summary.min as f64 <= assessment.score + 1e-6);
    assert!(assessment.repeat_summary.max as f64 >= assessment.score - 1e-6);
}

#[test]
fn test_small_side_adds_repeats() {
    // 12 of 40 rows held out per split: 5 splits reach the default 60
    let assessment =
        assess_dataset_shift(&noise(200, 0.0, 1), &noise(40, 0.0, 2), &seeded()).unwrap();
    assert_eq!(assessment.repeat_scores.len(), 5);
    assert_eq!(assessment.config.n_repeats, 1);

    let config = ShiftConfig {
        min_eval_rows: 0,
        ..seeded()
    };
    let single = assess_dataset_shift(&noise(200, 0.0, 1), &noise(40, 0.0, 2), &config).unwrap();
    assert_eq!(single.repeat_scores.len(), 1);
}

#[test]
fn test_unseeded_run_is_reproducible_from_reported_seed() {
    let config = ShiftConfig {
        n_trees: 10,
        ..ShiftConfig::default()
    };
    let reference = noise(30, 0.0, 1);
    let current = noise(30, 0.4, 2);

    let first = assess_dataset_shift(&reference, &current, &config).unwrap();
    let replay = detect_dataset_shift(&reference, &current, &config.clone().with_seed(first.seed))
        .unwrap();
    assert_eq!(first.score, replay);
}

#[test]
fn test_detector_shared_across_threads() {
    let detector = DatasetShiftDetector::new(seeded()).unwrap();
    let reference = noise(40, 0.0, 1);
    let current = noise(40, 4.0, 2);

    let scores: Vec<f64> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..3)
            .map(|_| s.spawn(|| detector.detect(&reference, &current).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(scores.windows(2).all(|w| w[0] == w[1]));
}
