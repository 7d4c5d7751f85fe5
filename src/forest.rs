//! Random forest discriminator for binary origin labels
//!
//! Bagged CART trees grown on class-stratified bootstrap samples. At each node
//! a random subset of features is searched for the Gini-optimal threshold.
//! Leaves hold the fraction of class-1 rows they saw, and the forest
//! probability is the mean over trees.
//!
//! Trees are independent tasks: every tree gets its own seed drawn up front
//! from the forest seed, so the result does not depend on how rayon schedules
//! the work.
//!
//! # References
//!
//! Breiman, L. (2001). Random forests. Machine Learning, 45(1), 5-32.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of features tried at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`
    Sqrt,
    /// `floor(log2(n_features))`
    Log2,
    /// Every feature (plain bagging)
    All,
    /// Fixed count, capped at the number of features
    Count(usize),
}

impl MaxFeatures {
    /// Resolve to a concrete count in `1..=n_features`
    pub fn resolve(self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Count(k) => k,
        };
        n.clamp(1, n_features.max(1))
    }
}

/// Hyperparameters for [`RandomForest::fit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
        }
    }
}

/// A node in a decision tree
#[derive(Debug, Clone)]
enum TreeNode {
    /// Rows with `row[feature_idx] <= threshold` go left
    Internal {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Fraction of class-1 rows among the training rows that reached it
    Leaf { proba: f64 },
}

impl TreeNode {
    fn predict_proba(&self, row: &[f64]) -> f64 {
        match self {
            TreeNode::Internal {
                feature_idx,
                threshold,
                left,
                right,
            } => {
                if row[*feature_idx] <= *threshold {
                    left.predict_proba(row)
                } else {
                    right.predict_proba(row)
                }
            }
            TreeNode::Leaf { proba } => *proba,
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
            TreeNode::Leaf { .. } => 0,
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Internal { left, right, .. } => left.n_leaves() + right.n_leaves(),
            TreeNode::Leaf { .. } => 1,
        }
    }
}

/// Best split found for a node
#[derive(Debug, Clone, Copy)]
struct Split {
    feature_idx: usize,
    threshold: f64,
    /// Weighted Gini decrease in row-count units
    decrease: f64,
}

/// `n * gini` for a node with `n` rows of which `pos` are class 1
fn weighted_gini(n: usize, pos: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    let pos = pos as f64;
    2.0 * pos * (n - pos) / n
}

/// Training view shared by every node of one tree
struct TreeBuilder<'a> {
    features: &'a [&'a [f64]],
    labels: &'a [u8],
    params: &'a ForestParams,
    n_try: usize,
    importances: Vec<f64>,
}

impl TreeBuilder<'_> {
    fn build_node(&mut self, indices: &mut [usize], depth: usize, rng: &mut StdRng) -> TreeNode {
        let size = indices.len();
        let positives = indices.iter().filter(|&&i| self.labels[i] == 1).count();
        let leaf = TreeNode::Leaf {
            proba: if size == 0 {
                0.0
            } else {
                positives as f64 / size as f64
            },
        };

        if positives == 0
            || positives == size
            || size < 2 * self.params.min_samples_leaf
            || self.params.max_depth.is_some_and(|d| depth >= d)
        {
            return leaf;
        }

        let Some(split) = self.find_split(indices, positives, rng) else {
            return leaf;
        };

        // Partition in place: left half holds rows going left
        let mut mid = 0;
        for k in 0..indices.len() {
            if self.features[indices[k]][split.feature_idx] <= split.threshold {
                indices.swap(k, mid);
                mid += 1;
            }
        }

        self.importances[split.feature_idx] += split.decrease;

        let (left_idx, right_idx) = indices.split_at_mut(mid);
        let left = Box::new(self.build_node(left_idx, depth + 1, rng));
        let right = Box::new(self.build_node(right_idx, depth + 1, rng));

        TreeNode::Internal {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left,
            right,
        }
    }

    /// Search up to `n_try` non-constant features in random order
    fn find_split(&self, indices: &[usize], positives: usize, rng: &mut StdRng) -> Option<Split> {
        let n_features = self.features[indices[0]].len();
        let mut candidates: Vec<usize> = (0..n_features).collect();
        candidates.shuffle(rng);

        let parent = weighted_gini(indices.len(), positives);
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<Split> = None;
        let mut tried = 0;
        let mut column: Vec<(f64, u8)> = Vec::with_capacity(indices.len());

        for feature_idx in candidates {
            if tried >= self.n_try {
                break;
            }

            column.clear();
            column.extend(
                indices
                    .iter()
                    .map(|&i| (self.features[i][feature_idx], self.labels[i])),
            );
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let n = column.len();
            if column[0].0 == column[n - 1].0 {
                // Constant here; does not count towards n_try
                continue;
            }
            tried += 1;

            let mut left_pos = 0;
            for k in 0..n - 1 {
                left_pos += column[k].1 as usize;
                let (lo, hi) = (column[k].0, column[k + 1].0);
                if lo == hi {
                    continue;
                }
                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let decrease = parent
                    - weighted_gini(n_left, left_pos)
                    - weighted_gini(n_right, positives - left_pos);

                if best.map_or(true, |b| decrease > b.decrease) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(Split {
                        feature_idx,
                        threshold,
                        decrease,
                    });
                }
            }
        }

        best
    }
}

/// Single CART tree
#[derive(Debug, Clone)]
pub struct DecisionTree {
    root: TreeNode,
    importances: Vec<f64>,
}

impl DecisionTree {
    /// Grow a tree on `sample`, a list of row indices that may repeat
    fn fit(
        features: &[&[f64]],
        labels: &[u8],
        mut sample: Vec<usize>,
        params: &ForestParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = features.first().map_or(0, |r| r.len());
        let mut builder = TreeBuilder {
            features,
            labels,
            params,
            n_try: params.max_features.resolve(n_features),
            importances: vec![0.0; n_features],
        };
        let root = builder.build_node(&mut sample, 0, rng);

        DecisionTree {
            root,
            importances: builder.importances,
        }
    }

    /// Probability that `row` belongs to class 1
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        self.root.predict_proba(row)
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }
}

/// Draw a bootstrap sample that resamples each class within itself
///
/// Every class keeps its own size, so a minority class present in the
/// training rows is present in every tree.
fn stratified_bootstrap(by_class: &[Vec<usize>; 2], rng: &mut StdRng) -> Vec<usize> {
    let total = by_class[0].len() + by_class[1].len();
    let mut sample = Vec::with_capacity(total);
    for members in by_class {
        if members.is_empty() {
            continue;
        }
        for _ in 0..members.len() {
            sample.push(members[rng.gen_range(0..members.len())]);
        }
    }
    sample
}

/// Random forest - ensemble of decision trees
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Fit on rows `features` with binary `labels` (0 or 1)
    ///
    /// `features` and `labels` must have equal length and every row the same
    /// width; the detector guarantees both before calling.
    pub fn fit(features: &[&[f64]], labels: &[u8], params: &ForestParams, seed: u64) -> Self {
        debug_assert_eq!(features.len(), labels.len());
        let n_features = features.first().map_or(0, |r| r.len());

        let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (i, &label) in labels.iter().enumerate() {
            by_class[usize::from(label.min(1))].push(i);
        }

        let mut master = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..params.n_trees).map(|_| master.gen()).collect();

        let trees: Vec<DecisionTree> = tree_seeds
            .into_par_iter()
            .map(|tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let sample = stratified_bootstrap(&by_class, &mut rng);
                DecisionTree::fit(features, labels, sample, params, &mut rng)
            })
            .collect();

        tracing::trace!(
            "Fitted {} trees on {} rows, mean depth {:.1}",
            trees.len(),
            features.len(),
            trees.iter().map(DecisionTree::depth).sum::<usize>() as f64
                / trees.len().max(1) as f64
        );

        RandomForest { trees, n_features }
    }

    /// Mean class-1 probability across trees
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        self.trees
            .iter()
            .map(|tree| tree.predict_proba(row))
            .sum::<f64>()
            / self.trees.len() as f64
    }

    /// Hard label: 1 when the class-1 probability is at least 0.5
    pub fn predict(&self, row: &[f64]) -> u8 {
        u8::from(self.predict_proba(row) >= 0.5)
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean decrease in impurity per feature, normalized to sum to 1
    ///
    /// All zeros when no tree made a split.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            let tree_sum: f64 = tree.importances.iter().sum();
            if tree_sum <= 0.0 {
                continue;
            }
            for (acc, &imp) in total.iter_mut().zip(&tree.importances) {
                *acc += imp / tree_sum;
            }
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for v in &mut total {
                *v /= sum;
            }
        }
        total
    }
}
