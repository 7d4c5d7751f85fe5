// Labeled pool construction and stratified train/evaluation partition

use crate::dataset::Dataset;
use crate::error::{Side, ValidationError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Reference rows labeled 0 followed by current rows labeled 1
///
/// Borrowed from the two datasets for the duration of one detector call.
#[derive(Debug)]
pub(crate) struct LabeledPool<'a> {
    pub rows: Vec<&'a [f64]>,
    pub labels: Vec<u8>,
}

impl<'a> LabeledPool<'a> {
    /// Pool both datasets, each in canonical row order
    pub fn new(reference: &'a Dataset, current: &'a Dataset) -> Self {
        let mut rows = reference.canonical_rows();
        let mut labels = vec![Side::Reference.label(); rows.len()];

        let current_rows = current.canonical_rows();
        labels.extend(std::iter::repeat(Side::Current.label()).take(current_rows.len()));
        rows.extend(current_rows);

        Self { rows, labels }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Gather the rows and labels at `indices`
    pub fn subset(&self, indices: &[usize]) -> (Vec<&'a [f64]>, Vec<u8>) {
        indices
            .iter()
            .map(|&i| (self.rows[i], self.labels[i]))
            .unzip()
    }
}

/// Row indices into a [`LabeledPool`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StratifiedSplit {
    pub train: Vec<usize>,
    pub eval: Vec<usize>,
}

/// Evaluation rows for a class of `n` rows: `round(n * fraction)` kept in `[1, n - 1]`
pub(crate) fn eval_count(n: usize, test_fraction: f64) -> usize {
    let wanted = (n as f64 * test_fraction).round() as usize;
    wanted.clamp(1, n.saturating_sub(1).max(1))
}

/// Partition `labels` per class so both splits hold rows of both classes
pub(crate) fn stratified_split(
    labels: &[u8],
    test_fraction: f64,
    rng: &mut StdRng,
) -> Result<StratifiedSplit, ValidationError> {
    let mut train = Vec::with_capacity(labels.len());
    let mut eval = Vec::new();

    for side in [Side::Reference, Side::Current] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == side.label())
            .map(|(i, _)| i)
            .collect();

        if members.len() < 2 {
            return Err(ValidationError::EmptySplit {
                split: if members.is_empty() {
                    "evaluation"
                } else {
                    "training"
                },
                side,
                available: members.len(),
            });
        }

        members.shuffle(rng);
        let n_eval = eval_count(members.len(), test_fraction);
        eval.extend_from_slice(&members[..n_eval]);
        train.extend_from_slice(&members[n_eval..]);
    }

    Ok(StratifiedSplit { train, eval })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_eval_count() {
        assert_eq!(eval_count(100, 0.3), 30);
        assert_eq!(eval_count(20, 0.3), 6);
        // Rounds to zero, kept at one
        assert_eq!(eval_count(2, 0.1), 1);
        // Rounds to everything, one row left for training
        assert_eq!(eval_count(3, 0.9), 2);
    }

    #[test]
    fn test_split_is_stratified() {
        let labels: Vec<u8> = std::iter::repeat(0)
            .take(1000)
            .chain(std::iter::repeat(1).take(20))
            .collect();
        let mut rng = StdRng::seed_from_u64(5);
        let split = stratified_split(&labels, 0.3, &mut rng).unwrap();

        let eval_pos = split.eval.iter().filter(|&&i| labels[i] == 1).count();
        let train_pos = split.train.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(eval_pos, 6);
        assert_eq!(train_pos, 14);
        assert_eq!(split.eval.len(), 306);
        assert_eq!(split.train.len(), 714);

        // Disjoint and complete
        let mut all: Vec<usize> = split.train.iter().chain(&split.eval).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..1020).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_row_class_fails() {
        let labels = [0, 0, 0, 1];
        let mut rng = StdRng::seed_from_u64(5);
        let err = stratified_split(&labels, 0.3, &mut rng).unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptySplit {
                split: "training",
                side: Side::Current,
                available: 1,
            }
        );
    }

    #[test]
    fn test_split_depends_only_on_seed() {
        let labels: Vec<u8> = (0..50).map(|i| (i % 2) as u8).collect();
        let a = stratified_split(&labels, 0.3, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = stratified_split(&labels, 0.3, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pool_orders_reference_then_current() {
        let columns = vec!["x".to_string()];
        let reference = Dataset::new(columns.clone(), vec![vec![3.0], vec![1.0]]).unwrap();
        let current = Dataset::new(columns, vec![vec![2.0]]).unwrap();

        let pool = LabeledPool::new(&reference, &current);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.labels, vec![0, 0, 1]);
        assert_eq!(pool.rows, vec![&[1.0][..], &[3.0][..], &[2.0][..]]);

        let (rows, labels) = pool.subset(&[2, 0]);
        assert_eq!(rows, vec![&[2.0][..], &[1.0][..]]);
        assert_eq!(labels, vec![1, 0]);
    }
}
