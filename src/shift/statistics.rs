// Spread of the per-repeat scores
//
// The reported score is the exact f64 mean of the repeats. This summary is for
// reading how stable that mean is; it goes through trueno's f32 vector
// statistics and aprender's quantiles, so it is not used for any decision.

use aprender::stats::DescriptiveStats;
use serde::Serialize;
use trueno::Vector;

/// Median, spread and range of the repeat scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RepeatSummary {
    pub median: f32,
    pub stddev: f32,
    pub min: f32,
    pub max: f32,
}

impl RepeatSummary {
    pub fn from_scores(scores: &[f64]) -> Self {
        let values: Vec<f32> = scores.iter().map(|&s| s as f32).collect();
        let v = Vector::from_slice(&values);

        // quantile(0.5) is the R-7 median
        let median = DescriptiveStats::new(&v).quantile(0.5).unwrap_or(0.0);

        Self {
            median,
            stddev: v.stddev().unwrap_or(0.0),
            min: v.min().unwrap_or(0.0),
            max: v.max().unwrap_or(0.0),
        }
    }
}
