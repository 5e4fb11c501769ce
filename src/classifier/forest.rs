//! Random forest classifier
//!
//! Bagged CART trees with Gini impurity, implemented in pure Rust.
//! Each tree is grown to purity on a bootstrap sample, considering a random
//! subset of features at every split. The positive-class probability is the
//! mean of the per-tree leaf probabilities.
//!
//! Trees are fitted in parallel, but every tree gets its own seed drawn
//! up front from the master RNG, so the fitted forest only depends on the
//! data and the seed.

use indicatif::ProgressBar;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::features::NUM_FEATURES;
use super::{RiskModel, TrainError};

/// Forest hyperparameters
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// Maximum tree depth (`None` grows until leaves are pure)
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may split
    pub min_samples_split: usize,
    /// Candidate features per split
    pub max_features: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: None,
            min_samples_split: 2,
            // sqrt(13), rounded down
            max_features: 3,
            seed: 42,
        }
    }
}

/// A single tree node, stored in a flat arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probability: f64,
    },
}

/// CART decision tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn fit(
        rows: &[[f64; NUM_FEATURES]],
        labels: &[bool],
        sample: Vec<usize>,
        config: &ForestConfig,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut builder = TreeBuilder {
            rows,
            labels,
            config,
            nodes: Vec::new(),
        };
        builder.grow(sample, 0, rng);
        Self {
            nodes: builder.nodes,
        }
    }

    /// Positive-class probability of the leaf the row lands in
    pub fn predict(&self, row: &[f64; NUM_FEATURES]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Some(Node::Leaf { probability }) => return *probability,
                // Only reachable for a hand-edited artifact
                None => return 0.5,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Every child must sit after its parent and inside the arena, so
    /// traversal always terminates.
    fn is_well_formed(&self) -> bool {
        let len = self.nodes.len();
        len > 0
            && self.nodes.iter().enumerate().all(|(i, n)| match n {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    *feature < NUM_FEATURES
                        && (i + 1..len).contains(left)
                        && (i + 1..len).contains(right)
                }
                Node::Leaf { probability } => (0.0..=1.0).contains(probability),
            })
    }
}

struct TreeBuilder<'a> {
    rows: &'a [[f64; NUM_FEATURES]],
    labels: &'a [bool],
    config: &'a ForestConfig,
    nodes: Vec<Node>,
}

/// Best split found for a node
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

impl TreeBuilder<'_> {
    fn leaf(&mut self, positives: usize, total: usize) -> usize {
        let probability = if total == 0 {
            0.5
        } else {
            positives as f64 / total as f64
        };
        self.nodes.push(Node::Leaf { probability });
        self.nodes.len() - 1
    }

    /// Grow the subtree for `sample` and return its node index.
    fn grow(&mut self, sample: Vec<usize>, depth: usize, rng: &mut ChaCha8Rng) -> usize {
        let total = sample.len();
        let positives = sample.iter().filter(|&&i| self.labels[i]).count();

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if positives == 0
            || positives == total
            || total < self.config.min_samples_split
            || depth_reached
        {
            return self.leaf(positives, total);
        }

        let Some(split) = self.best_split(&sample, rng) else {
            return self.leaf(positives, total);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = sample
            .into_iter()
            .partition(|&i| self.rows[i][split.feature] <= split.threshold);

        // Reserve the slot so the parent precedes its children
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { probability: 0.0 });
        let left_idx = self.grow(left, depth + 1, rng);
        let right_idx = self.grow(right, depth + 1, rng);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_idx,
            right: right_idx,
        };
        idx
    }

    /// Search a random subset of features for the lowest weighted Gini.
    ///
    /// Like CART, the search continues past `max_features` until at least
    /// one valid split is found (constant features offer none).
    fn best_split(&self, sample: &[usize], rng: &mut ChaCha8Rng) -> Option<SplitCandidate> {
        let order = index::sample(rng, NUM_FEATURES, NUM_FEATURES);
        let total = sample.len();
        let total_pos = sample.iter().filter(|&&i| self.labels[i]).count();

        let mut best: Option<SplitCandidate> = None;
        let mut values: Vec<(f64, bool)> = Vec::with_capacity(total);

        for (visited, feature) in order.into_iter().enumerate() {
            if visited >= self.config.max_features && best.is_some() {
                break;
            }

            values.clear();
            values.extend(sample.iter().map(|&i| (self.rows[i][feature], self.labels[i])));
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_pos = 0;
            for k in 0..total - 1 {
                if values[k].1 {
                    left_pos += 1;
                }
                let (lo, hi) = (values[k].0, values[k + 1].0);
                if lo >= hi {
                    continue;
                }
                let left_n = k + 1;
                let right_n = total - left_n;
                let impurity = (left_n as f64 * gini(left_pos, left_n)
                    + right_n as f64 * gini(total_pos - left_pos, right_n))
                    / total as f64;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    let mid = lo + (hi - lo) / 2.0;
                    // Guard against the midpoint rounding up to `hi`
                    let threshold = if mid < hi { mid } else { lo };
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

/// Fitted random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest on `rows` with binary `labels`.
    pub fn fit(
        rows: &[[f64; NUM_FEATURES]],
        labels: &[bool],
        config: &ForestConfig,
        progress: Option<&ProgressBar>,
    ) -> Result<Self, TrainError> {
        if rows.is_empty() {
            return Err(TrainError::NoSamples);
        }
        if rows.len() != labels.len() {
            return Err(TrainError::LengthMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        if config.n_trees == 0 {
            return Err(TrainError::InvalidConfig("n_trees must be at least 1".into()));
        }
        if config.max_features == 0 || config.max_features > NUM_FEATURES {
            return Err(TrainError::InvalidConfig(format!(
                "max_features must be in 1..={NUM_FEATURES}, got {}",
                config.max_features
            )));
        }

        let mut master = ChaCha8Rng::seed_from_u64(config.seed);
        let seeds: Vec<u64> = (0..config.n_trees).map(|_| master.random()).collect();
        let n = rows.len();

        let trees = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                let tree = DecisionTree::fit(rows, labels, sample, config, &mut rng);
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                tree
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            trees = trees.len(),
            nodes = trees.iter().map(DecisionTree::node_count).sum::<usize>(),
            "Fitted random forest"
        );
        Ok(Self { trees })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Check that a deserialized forest can be evaluated safely.
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        if let Some(i) = self.trees.iter().position(|t| !t.is_well_formed()) {
            return Err(format!("tree {i} is malformed"));
        }
        Ok(())
    }
}

impl RiskModel for RandomForest {
    fn positive_probability(&self, row: &[f64; NUM_FEATURES]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f64
    }
}
