//! Result data types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The six numeric metrics a node reports after evaluating a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Accuracy,
    Precision,
    Recall,
    F1Score,
    RocAuc,
    BiasGap,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Accuracy,
        Metric::Precision,
        Metric::Recall,
        Metric::F1Score,
        Metric::RocAuc,
        Metric::BiasGap,
    ];

    /// Field name on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::Precision => "precision",
            Metric::Recall => "recall",
            Metric::F1Score => "f1_score",
            Metric::RocAuc => "roc_auc",
            Metric::BiasGap => "bias_gap",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Accuracy => "Accuracy",
            Metric::Precision => "Precision",
            Metric::Recall => "Recall",
            Metric::F1Score => "F1 Score",
            Metric::RocAuc => "ROC AUC",
            Metric::BiasGap => "Bias Gap",
        }
    }

    /// Bias gaps are small, so they get one extra decimal when shown as a percentage.
    pub fn percent_decimals(self) -> usize {
        match self {
            Metric::BiasGap => 3,
            _ => 2,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-group accuracy for the protected attribute detected at a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessMetric {
    pub attribute: String,
    #[serde(default)]
    pub group_accuracy: BTreeMap<String, f64>,
}

/// Metrics reported by a node that evaluated the model.
///
/// Every field is optional: the server sends `null` for metrics it could not
/// compute (e.g. `bias_gap` with fewer than two groups).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recall: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f1_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roc_auc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_gap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fairness_metric: Option<FairnessMetric>,
}

impl EvaluatedMetrics {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Accuracy => self.accuracy,
            Metric::Precision => self.precision,
            Metric::Recall => self.recall,
            Metric::F1Score => self.f1_score,
            Metric::RocAuc => self.roc_auc,
            Metric::BiasGap => self.bias_gap,
        }
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::Accuracy => &mut self.accuracy,
            Metric::Precision => &mut self.precision,
            Metric::Recall => &mut self.recall,
            Metric::F1Score => &mut self.f1_score,
            Metric::RocAuc => &mut self.roc_auc,
            Metric::BiasGap => &mut self.bias_gap,
        };
        *slot = value;
    }

    /// Build a metric set with every numeric metric equal to `value`.
    pub fn uniform(value: f64) -> Self {
        let mut metrics = Self::default();
        for metric in Metric::ALL {
            metrics.set(metric, Some(value));
        }
        metrics
    }
}

/// Outcome of one node, discriminated by the `status` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NodeOutcome {
    Evaluated(EvaluatedMetrics),
    Skipped {
        #[serde(default)]
        reason: String,
    },
}

/// One participating node's entry in a federation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    pub node: String,
    #[serde(flatten)]
    pub outcome: NodeOutcome,
}

impl NodeResult {
    pub fn evaluated(node: impl Into<String>, metrics: EvaluatedMetrics) -> Self {
        Self {
            node: node.into(),
            outcome: NodeOutcome::Evaluated(metrics),
        }
    }

    pub fn skipped(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            outcome: NodeOutcome::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn metrics(&self) -> Option<&EvaluatedMetrics> {
        match &self.outcome {
            NodeOutcome::Evaluated(metrics) => Some(metrics),
            NodeOutcome::Skipped { .. } => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&str> {
        match &self.outcome {
            NodeOutcome::Evaluated(_) => None,
            NodeOutcome::Skipped { reason } => Some(reason),
        }
    }

    pub fn is_evaluated(&self) -> bool {
        matches!(self.outcome, NodeOutcome::Evaluated(_))
    }
}

/// Ordered per-node outcomes of one federation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FederationResult {
    pub nodes: Vec<NodeResult>,
}

impl FederationResult {
    pub fn new(nodes: Vec<NodeResult>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeResult> {
        self.nodes.iter()
    }

    /// Pretty JSON, as shown in the "raw response" view.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Fixed-size table keyed by [`Metric`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricTable<T: Copy> {
    values: [T; 6],
}

impl<T: Copy> MetricTable<T> {
    pub fn from_fn(mut f: impl FnMut(Metric) -> T) -> Self {
        Self {
            values: Metric::ALL.map(&mut f),
        }
    }

    pub fn get(&self, metric: Metric) -> T {
        self.values[metric.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, T)> + '_ {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}
