//! Discrimination metrics for the held-out split
//!
//! All metrics are bounded to `[0, 1]` and grow with how well the predicted
//! class-1 probabilities separate the two origin labels. Chance level is 0.5
//! for ROC AUC and balanced accuracy; plain accuracy sits at the majority
//! class rate instead, so it is only meaningful for balanced samples.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric reported as the shift score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShiftMetric {
    /// Area under the ROC curve of the forest probabilities
    #[default]
    RocAuc,
    /// Mean of per-class recall at the 0.5 probability cut
    BalancedAccuracy,
    /// Fraction of correctly predicted origin labels at the 0.5 cut
    Accuracy,
}

impl ShiftMetric {
    /// Score `probas` (class-1 probabilities) against binary `labels`
    pub fn score(self, probas: &[f64], labels: &[u8]) -> f64 {
        match self {
            ShiftMetric::RocAuc => roc_auc(probas, labels),
            ShiftMetric::BalancedAccuracy => balanced_accuracy(&hard_labels(probas), labels),
            ShiftMetric::Accuracy => accuracy(&hard_labels(probas), labels),
        }
    }
}

impl fmt::Display for ShiftMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShiftMetric::RocAuc => "roc-auc",
            ShiftMetric::BalancedAccuracy => "balanced-accuracy",
            ShiftMetric::Accuracy => "accuracy",
        };
        f.write_str(name)
    }
}

fn hard_labels(probas: &[f64]) -> Vec<u8> {
    probas.iter().map(|&p| u8::from(p >= 0.5)).collect()
}

/// Fraction of `predicted` equal to `labels`
pub fn accuracy(predicted: &[u8], labels: &[u8]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(labels)
        .filter(|(p, l)| p == l)
        .count();
    correct as f64 / labels.len() as f64
}

/// Mean recall over the classes present in `labels`
pub fn balanced_accuracy(predicted: &[u8], labels: &[u8]) -> f64 {
    let mut recalls = Vec::with_capacity(2);
    for class in [0u8, 1] {
        let total = labels.iter().filter(|&&l| l == class).count();
        if total == 0 {
            continue;
        }
        let hits = predicted
            .iter()
            .zip(labels)
            .filter(|(&p, &l)| l == class && p == class)
            .count();
        recalls.push(hits as f64 / total as f64);
    }

    if recalls.is_empty() {
        return 0.0;
    }
    recalls.iter().sum::<f64>() / recalls.len() as f64
}

/// ROC AUC via the Mann-Whitney U statistic, ties counted as one half
///
/// Returns 0.5 when either class is absent.
pub fn roc_auc(probas: &[f64], labels: &[u8]) -> f64 {
    let n_pos = labels.iter().filter(|&&l| l == 1).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..probas.len()).collect();
    order.sort_by(|&a, &b| probas[a].total_cmp(&probas[b]));

    // Sum of 1-based midranks of the positives
    let mut rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && probas[order[end]] == probas[order[start]] {
            end += 1;
        }
        let midrank = (start + 1 + end) as f64 / 2.0;
        let pos_in_group = order[start..end]
            .iter()
            .filter(|&&i| labels[i] == 1)
            .count();
        rank_sum += midrank * pos_in_group as f64;
        start = end;
    }

    let u = rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0;
    u / (n_pos as f64 * n_neg as f64)
}
