//! Summary statistics derived from a federation run.
//!
//! Everything here is pure: the same [`FederationResult`] and policy always
//! produce the same [`AggregateStats`].

use serde::{Deserialize, Serialize};

use crate::types::{
    EvaluatedMetrics, FederationResult, Metric, MetricTable, NodeOutcome, NodeResult,
};

/// How a node that omits a metric contributes to that metric's mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMetricPolicy {
    /// Count the node with a value of `0` (the long-standing dashboard behavior).
    #[default]
    TreatAsZero,
    /// Leave the node out of that metric's mean only.
    Exclude,
}

/// An evaluated node, split out of the run for detail rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedNode {
    pub node: String,
    pub metrics: EvaluatedMetrics,
}

/// A skipped node and the reason the server gave.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedNode {
    pub node: String,
    pub reason: String,
}

/// Unweighted per-metric means over evaluated nodes.
///
/// Under [`MissingMetricPolicy::TreatAsZero`] every mean is present. Under
/// [`MissingMetricPolicy::Exclude`] a mean is `None` when no evaluated node
/// reported that metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricAverages {
    means: MetricTable<Option<f64>>,
}

impl MetricAverages {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.means.get(metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        self.means.iter()
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.get(Metric::Accuracy)
    }

    pub fn precision(&self) -> Option<f64> {
        self.get(Metric::Precision)
    }

    pub fn recall(&self) -> Option<f64> {
        self.get(Metric::Recall)
    }

    pub fn f1_score(&self) -> Option<f64> {
        self.get(Metric::F1Score)
    }

    pub fn roc_auc(&self) -> Option<f64> {
        self.get(Metric::RocAuc)
    }

    pub fn bias_gap(&self) -> Option<f64> {
        self.get(Metric::BiasGap)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStats {
    pub total_nodes: usize,
    pub evaluated_count: usize,
    pub skipped_count: usize,
    /// `None` when no node was evaluated; only counts may be shown then.
    pub averages: Option<MetricAverages>,
    pub evaluated: Vec<EvaluatedNode>,
    pub skipped: Vec<SkippedNode>,
    pub policy: MissingMetricPolicy,
}

impl AggregateStats {
    pub fn has_averages(&self) -> bool {
        self.averages.is_some()
    }

    /// Largest bias gap among evaluated nodes that reported one.
    pub fn max_bias_gap(&self) -> Option<f64> {
        self.evaluated
            .iter()
            .filter_map(|n| n.metrics.bias_gap)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }
}

/// Partition a run and average each metric over its evaluated nodes.
pub fn aggregate(result: &FederationResult, policy: MissingMetricPolicy) -> AggregateStats {
    let mut evaluated = Vec::new();
    let mut skipped = Vec::new();

    for NodeResult { node, outcome } in result.iter() {
        match outcome {
            NodeOutcome::Evaluated(metrics) => evaluated.push(EvaluatedNode {
                node: node.clone(),
                metrics: metrics.clone(),
            }),
            NodeOutcome::Skipped { reason } => skipped.push(SkippedNode {
                node: node.clone(),
                reason: reason.clone(),
            }),
        }
    }

    let averages = if evaluated.is_empty() {
        None
    } else {
        Some(MetricAverages {
            means: MetricTable::from_fn(|metric| mean_of(&evaluated, metric, policy)),
        })
    };

    AggregateStats {
        total_nodes: result.len(),
        evaluated_count: evaluated.len(),
        skipped_count: skipped.len(),
        averages,
        evaluated,
        skipped,
        policy,
    }
}

// Caller guarantees `nodes` is non-empty.
fn mean_of(nodes: &[EvaluatedNode], metric: Metric, policy: MissingMetricPolicy) -> Option<f64> {
    match policy {
        MissingMetricPolicy::TreatAsZero => {
            let sum: f64 = nodes
                .iter()
                .map(|n| n.metrics.get(metric).unwrap_or(0.0))
                .sum();
            Some(sum / nodes.len() as f64)
        }
        MissingMetricPolicy::Exclude => {
            let (sum, count) = nodes
                .iter()
                .filter_map(|n| n.metrics.get(metric))
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            (count > 0).then(|| sum / count as f64)
        }
    }
}
