use serde::{Deserialize, Serialize};

use super::{check_width, sigmoid, BindError, ModelOutput, ScoringError, ScoringModel};
use crate::approval::encoder::EncodedRow;
use crate::approval::schema::FeatureSchema;

/// Serialized gradient boosted ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsembleSpec {
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<TreeSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<TreeNodeSpec>,
}

/// Tree node as written by the exporter. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNodeSpec {
    Split {
        feature: String,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// Binary classifier summing leaf values across trees into a logit.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsembleModel {
    base_score: f64,
    width: usize,
    trees: Vec<Vec<Node>>,
}

impl TreeEnsembleModel {
    /// Resolve feature names against the schema and reject malformed trees.
    ///
    /// Children must point forward in the node list, which rules out cycles and keeps every
    /// walk bounded by the tree size.
    pub fn bind(spec: TreeEnsembleSpec, schema: &FeatureSchema) -> Result<Self, BindError> {
        let mut trees = Vec::with_capacity(spec.trees.len());

        for (tree_index, tree) in spec.trees.into_iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(BindError::InvalidTree {
                    tree: tree_index,
                    reason: "tree has no nodes".to_string(),
                });
            }

            let node_count = tree.nodes.len();
            let mut nodes = Vec::with_capacity(node_count);
            for (node_index, node) in tree.nodes.into_iter().enumerate() {
                let bound = match node {
                    TreeNodeSpec::Leaf(value) => Node::Leaf(value),
                    TreeNodeSpec::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        for child in [left, right] {
                            if child <= node_index || child >= node_count {
                                return Err(BindError::InvalidTree {
                                    tree: tree_index,
                                    reason: format!(
                                        "node {node_index} points to invalid child {child}"
                                    ),
                                });
                            }
                        }
                        let feature = schema
                            .position(&feature)
                            .ok_or(BindError::UnknownFeature(feature))?;
                        Node::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        }
                    }
                };
                nodes.push(bound);
            }
            trees.push(nodes);
        }

        Ok(Self {
            base_score: spec.base_score,
            width: schema.width(),
            trees,
        })
    }

    pub fn margin(&self, row: &EncodedRow) -> Result<f64, ScoringError> {
        check_width(self.width, row)?;
        let values = row.values();
        let mut margin = self.base_score;

        for nodes in &self.trees {
            let mut cursor = 0;
            loop {
                match nodes[cursor] {
                    Node::Leaf(value) => {
                        margin += value;
                        break;
                    }
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        cursor = if values[feature] <= threshold {
                            left
                        } else {
                            right
                        };
                    }
                }
            }
        }

        Ok(margin)
    }
}

impl ScoringModel for TreeEnsembleModel {
    fn predict_proba(&self, row: &EncodedRow) -> Result<ModelOutput, ScoringError> {
        let positive = sigmoid(self.margin(row)?);
        Ok(ModelOutput::Classes(vec![1.0 - positive, positive]))
    }
}
