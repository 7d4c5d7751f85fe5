//! covshift - dataset shift detection with a discriminative random forest
//!
//! Given two tabular samples with the same columns, covshift trains a random
//! forest to predict which sample each row came from and reports how well it
//! does on held-out rows. A score near 0.5 means the forest cannot tell the
//! samples apart; a score near 1.0 means they come from different
//! distributions.
//!
//! ```
//! use covshift::{Dataset, DatasetShiftDetector, ShiftConfig};
//!
//! let columns = vec!["lat".to_string(), "income".to_string()];
//! let rows: Vec<Vec<f64>> = (0..60)
//!     .map(|i| vec![-124.0 + i as f64 * 0.15, (i % 9) as f64])
//!     .collect();
//! let table = Dataset::new(columns, rows).unwrap();
//! let (west, east) = table.split_at_threshold("lat", -119.0).unwrap();
//!
//! let detector = DatasetShiftDetector::new(ShiftConfig::default().with_seed(1)).unwrap();
//! let assessment = detector.assess(&west, &east).unwrap();
//! assert!(assessment.score > 0.8);
//! ```

pub mod cli;
pub mod csv_input;
pub mod dataset;
pub mod error;
pub mod forest;
pub mod metrics;
pub mod shift;

pub use dataset::Dataset;
pub use error::{NumericError, ShiftError, Side, ValidationError};
pub use metrics::ShiftMetric;
pub use shift::{
    assess_dataset_shift, detect_dataset_shift, DatasetShiftDetector, RepeatSummary,
    ShiftAssessment, ShiftConfig, ShiftVerdict,
};
