//! Soil/environment suitability random forest
//!
//! Loaded once from a JSON export of fitted decision trees. Each tree uses
//! the flat array layout of scikit-learn's `tree_` attribute:
//!
//! ```json
//! {
//!   "n_features": 7,
//!   "classes": ["rice", "maize", ...],
//!   "trees": [{
//!     "children_left":  [1, -1, -1],
//!     "children_right": [2, -1, -1],
//!     "feature":        [3, -2, -2],
//!     "threshold":      [24.5, -2.0, -2.0],
//!     "value":          [[10, 10], [9, 1], [1, 9]]
//!   }]
//! }
//! ```
//!
//! A node is a leaf when `children_left` is -1. Samples go left when
//! `x[feature] <= threshold`, with `x[feature]` first narrowed to `f32`
//! as scikit-learn does before walking the tree. Leaf `value` rows hold class counts (or
//! fractions) and are normalised per tree before averaging across trees.

use std::path::Path;

use serde::Deserialize;
use tmt_common::soil::FEATURE_COUNT;
use tmt_common::{Error, Result};
use tracing::info;

use super::SuitabilityClassifier;

const LEAF: i64 = -1;

#[derive(Debug, Clone, Deserialize)]
struct TreeExport {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ForestExport {
    n_features: usize,
    classes: Vec<String>,
    trees: Vec<TreeExport>,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Normalised class distribution
    Leaf(Vec<f64>),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_export(export: TreeExport, n_classes: usize, tree_index: usize) -> Result<Self> {
        let n = export.children_left.len();
        let invalid = |msg: String| Error::Model(format!("tree {}: {}", tree_index, msg));

        if n == 0 {
            return Err(invalid("no nodes".to_string()));
        }
        if export.children_right.len() != n
            || export.feature.len() != n
            || export.threshold.len() != n
            || export.value.len() != n
        {
            return Err(invalid("node arrays have different lengths".to_string()));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let left = export.children_left[i];
            let right = export.children_right[i];

            if left == LEAF {
                let counts = &export.value[i];
                if counts.len() != n_classes {
                    return Err(invalid(format!(
                        "leaf {} has {} class values, expected {}",
                        i,
                        counts.len(),
                        n_classes
                    )));
                }
                let total: f64 = counts.iter().sum();
                if !(total.is_finite() && total > 0.0) || counts.iter().any(|c| *c < 0.0) {
                    return Err(invalid(format!("leaf {} has invalid class values", i)));
                }
                nodes.push(Node::Leaf(counts.iter().map(|c| c / total).collect()));
                continue;
            }

            // Children must point forward so traversal always terminates
            let child = |c: i64| -> Result<usize> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > i && c < n)
                    .ok_or_else(|| invalid(format!("node {} has invalid child {}", i, c)))
            };
            let feature = usize::try_from(export.feature[i])
                .ok()
                .filter(|&f| f < FEATURE_COUNT)
                .ok_or_else(|| invalid(format!("node {} has invalid feature {}", i, export.feature[i])))?;

            nodes.push(Node::Split {
                feature,
                threshold: export.threshold[i],
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    fn leaf_for(&self, features: &[f64; FEATURE_COUNT]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf(dist) => return dist,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // Trees were fitted on float32 features
                    let value = features[*feature] as f32 as f64;
                    index = if value <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Random forest suitability classifier
#[derive(Debug, Clone)]
pub struct ForestSuitabilityClassifier {
    classes: Vec<String>,
    trees: Vec<Tree>,
}

impl ForestSuitabilityClassifier {
    /// Load a forest export from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Model(format!(
                "Failed to read suitability model {}: {}",
                path.display(),
                e
            ))
        })?;

        let forest = Self::from_json(&content)?;

        info!(
            path = %path.display(),
            trees = forest.trees.len(),
            classes = forest.classes.len(),
            "Loaded suitability model"
        );

        Ok(forest)
    }

    /// Parse and validate a forest export
    pub fn from_json(json: &str) -> Result<Self> {
        let export: ForestExport = serde_json::from_str(json)
            .map_err(|e| Error::Model(format!("Invalid suitability model: {}", e)))?;

        if export.n_features != FEATURE_COUNT {
            return Err(Error::Model(format!(
                "Suitability model expects {} features, readings have {}",
                export.n_features, FEATURE_COUNT
            )));
        }
        if export.classes.is_empty() {
            return Err(Error::Model("Suitability model has no classes".to_string()));
        }
        if export.trees.is_empty() {
            return Err(Error::Model("Suitability model has no trees".to_string()));
        }

        let n_classes = export.classes.len();
        let trees = export
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| Tree::from_export(tree, n_classes, i))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            classes: export.classes,
            trees,
        })
    }

    /// Class names in probability order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl SuitabilityClassifier for ForestSuitabilityClassifier {
    fn name(&self) -> &'static str {
        "random-forest"
    }

    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<Vec<f64>> {
        let mut probs = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in probs.iter_mut().zip(tree.leaf_for(features)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        probs.iter_mut().for_each(|p| *p /= n_trees);
        Ok(probs)
    }
}
