// Dataset shift detection with a discriminative classifier
//
// Two samples are pooled with their origin as the label, and a random forest
// is asked to tell them apart on rows it never trained on. If it does much
// better than chance the samples come from different distributions.
//
// Scientific Foundation:
// [1] Rabanser, S., Günnemann, S., & Lipton, Z. (2019). Failing loudly: An
//     empirical study of methods for detecting dataset shift. NeurIPS.
//     Domain classifiers are a strong, simple shift detector.
//
// [2] Lopez-Paz, D., & Oquab, M. (2017). Revisiting classifier two-sample
//     tests. ICLR. Held-out accuracy of a classifier is a valid two-sample
//     statistic.

mod config;
mod detector;
mod split;
mod statistics;
mod verdict;

pub use config::ShiftConfig;
pub use detector::{assess_dataset_shift, detect_dataset_shift, DatasetShiftDetector};
pub use statistics::RepeatSummary;
pub use verdict::{FeatureImportance, ShiftAssessment, ShiftVerdict};

#[cfg(test)]
mod tests;
