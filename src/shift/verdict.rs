// Shift verdict and assessment report
//
// The raw score is what callers threshold; the verdict is a convenience
// reading of that score against the configured thresholds.

use crate::metrics::ShiftMetric;
use crate::shift::config::ShiftConfig;
use crate::shift::statistics::RepeatSummary;
use serde::Serialize;

/// Scores under this are read as duplicated rows across the samples
const DUPLICATE_ROWS_BELOW: f64 = 0.3;

/// Reading of a shift score against the configured thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftVerdict {
    /// Score below `no_shift_threshold`: samples look like one population
    NoShift,
    /// Score between the two thresholds
    Inconclusive,
    /// Score at or above `shift_threshold`: samples are separable
    Shift,
}

impl ShiftVerdict {
    pub fn from_score(score: f64, config: &ShiftConfig) -> Self {
        if score >= config.shift_threshold {
            ShiftVerdict::Shift
        } else if score < config.no_shift_threshold {
            ShiftVerdict::NoShift
        } else {
            ShiftVerdict::Inconclusive
        }
    }
}

/// Share of the forest's impurity decrease attributed to one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub column: String,
    pub importance: f64,
}

/// Detailed result of one detector call
#[derive(Debug, Clone, Serialize)]
pub struct ShiftAssessment {
    /// Held-out discrimination metric, averaged over repeats
    pub score: f64,

    /// Metric the score was computed with
    pub metric: ShiftMetric,

    pub verdict: ShiftVerdict,

    /// Seed actually used; pass it back as `random_seed` to reproduce
    pub seed: u64,

    /// Score of each repeat, in order
    pub repeat_scores: Vec<f64>,

    pub repeat_summary: RepeatSummary,

    pub reference_rows: usize,
    pub current_rows: usize,

    /// Rows per split in the first repeat
    pub train_rows: usize,
    pub eval_rows: usize,

    /// Columns ranked by mean importance over repeats, highest first
    pub feature_importance: Vec<FeatureImportance>,

    /// Configuration used for assessment
    pub config: ShiftConfig,
}

impl ShiftAssessment {
    /// Whether the score sits well below chance
    ///
    /// Held-out rows whose exact twin was trained on with the other label get
    /// ranked backwards, so this points at rows shared by both samples rather
    /// than at a shift.
    pub fn suggests_duplicate_rows(&self) -> bool {
        self.score < DUPLICATE_ROWS_BELOW
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        match self.verdict {
            ShiftVerdict::Shift => report.push_str("❌ DATASET SHIFT DETECTED\n\n"),
            ShiftVerdict::Inconclusive => report.push_str("⚠️  INCONCLUSIVE\n\n"),
            ShiftVerdict::NoShift => report.push_str("✅ NO DATASET SHIFT DETECTED\n\n"),
        }

        report.push_str(&format!("Shift score ({}): {:.4}\n", self.metric, self.score));
        if self.suggests_duplicate_rows() {
            report.push_str("Note: scores far below 0.5 indicate rows duplicated across\n");
            report.push_str("      the samples, not a shift\n");
        }
        report.push_str(&format!(
            "Thresholds: shift >= {}, no shift < {}\n",
            self.config.shift_threshold, self.config.no_shift_threshold
        ));
        report.push_str(&format!(
            "Rows: reference={}, current={} (train={}, eval={})\n",
            self.reference_rows, self.current_rows, self.train_rows, self.eval_rows
        ));
        report.push_str(&format!(
            "Forest: {} trees, max_depth={}\n",
            self.config.n_trees,
            self.config
                .max_depth
                .map_or_else(|| "none".to_string(), |d| d.to_string())
        ));
        report.push_str(&format!("Seed: {}\n", self.seed));

        if self.repeat_scores.len() > 1 {
            let scores: Vec<String> = self
                .repeat_scores
                .iter()
                .map(|s| format!("{:.4}", s))
                .collect();
            report.push_str(&format!("Repeat scores: {}\n", scores.join(", ")));
            report.push_str(&format!(
                "Repeat spread: median={:.4}, stddev={:.4}, range=[{:.4}, {:.4}]\n",
                self.repeat_summary.median,
                self.repeat_summary.stddev,
                self.repeat_summary.min,
                self.repeat_summary.max
            ));
        }

        if !self.feature_importance.is_empty() {
            report.push_str("\n📊 Feature Importance:\n");
            for fi in &self.feature_importance {
                report.push_str(&format!(
                    "  {:<24} {:>6.1}%\n",
                    fi.column,
                    fi.importance * 100.0
                ));
            }
        }

        report
    }
}
