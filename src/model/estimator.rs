//! Estimators
//!
//! The final stage of an exported pipeline, operating on the encoded
//! feature vector.

use serde::{Deserialize, Serialize};

use super::ModelError;

fn unit_rate() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Ordinary / regularised linear regression
    Linear { coefficients: Vec<f64>, intercept: f64 },
    /// Gradient boosting or random forest over regression trees
    TreeEnsemble {
        aggregation: Aggregation,
        trees: Vec<Tree>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Aggregation {
    /// `base_score + learning_rate * sum(trees)`
    Sum {
        #[serde(default)]
        base_score: f64,
        #[serde(default = "unit_rate")]
        learning_rate: f64,
    },
    /// Average of tree outputs
    Mean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Go left when `x[feature] <= threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

/// Flat node array, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn validate(&self, tree_idx: usize, width: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Invalid(format!("tree {} is empty", tree_idx)));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split { feature, threshold, left, right } => {
                    if *feature >= width {
                        return Err(ModelError::Invalid(format!(
                            "tree {} node {} splits on feature {} but width is {}",
                            tree_idx, idx, feature, width
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(ModelError::Invalid(format!(
                            "tree {} node {} has a NaN threshold",
                            tree_idx, idx
                        )));
                    }
                    // children must point forward so evaluation always terminates
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(ModelError::Invalid(format!(
                                "tree {} node {} has invalid child {}",
                                tree_idx, idx, child
                            )));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ModelError::Invalid(format!(
                            "tree {} leaf {} is not finite",
                            tree_idx, idx
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

impl Estimator {
    pub(crate) fn validate(&self, width: usize) -> Result<(), ModelError> {
        match self {
            Estimator::Linear { coefficients, intercept } => {
                if coefficients.len() != width {
                    return Err(ModelError::Invalid(format!(
                        "linear model has {} coefficients but the preprocessor emits {} features",
                        coefficients.len(),
                        width
                    )));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ModelError::Invalid("non-finite linear coefficient".into()));
                }
            }
            Estimator::TreeEnsemble { aggregation, trees } => {
                if trees.is_empty() {
                    return Err(ModelError::Invalid("tree ensemble has no trees".into()));
                }
                if let Aggregation::Sum { base_score, learning_rate } = aggregation {
                    if !base_score.is_finite() || !learning_rate.is_finite() {
                        return Err(ModelError::Invalid(
                            "non-finite base score or learning rate".into(),
                        ));
                    }
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(i, width)?;
                }
            }
        }
        Ok(())
    }

    /// Callers must pass a vector of the validated width
    pub fn predict(&self, x: &[f64]) -> f64 {
        match self {
            Estimator::Linear { coefficients, intercept } => {
                intercept + coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>()
            }
            Estimator::TreeEnsemble { aggregation, trees } => {
                let total: f64 = trees.iter().map(|t| t.evaluate(x)).sum();
                match aggregation {
                    Aggregation::Sum { base_score, learning_rate } => {
                        base_score + learning_rate * total
                    }
                    Aggregation::Mean => total / trees.len() as f64,
                }
            }
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Estimator::Linear { coefficients, .. } => {
                format!("linear ({} coefficients)", coefficients.len())
            }
            Estimator::TreeEnsemble { aggregation, trees } => {
                let method = match aggregation {
                    Aggregation::Sum { .. } => "sum",
                    Aggregation::Mean => "mean",
                };
                format!("tree_ensemble ({}, {} trees)", method, trees.len())
            }
        }
    }
}
