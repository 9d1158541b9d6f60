//! Sanity checks on run payloads.
//!
//! Issues are advisory: callers log them and keep rendering the payload.

use std::collections::HashSet;

use bh_core::{ensure_unit_rate, CoreError};

use crate::types::{FederationResult, Metric};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadIssue {
    #[error("node #{index} has an empty name")]
    EmptyNodeName { index: usize },

    #[error("node '{node}' appears more than once")]
    DuplicateNode { node: String },

    #[error("node '{node}': {source}")]
    BadMetric { node: String, source: CoreError },

    #[error("node '{node}': group '{group}' accuracy {value} is not a rate in 0..=1")]
    BadGroupAccuracy {
        node: String,
        group: String,
        value: f64,
    },
}

pub fn validate_payload(result: &FederationResult) -> Vec<PayloadIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (index, node) in result.iter().enumerate() {
        if node.node.trim().is_empty() {
            issues.push(PayloadIssue::EmptyNodeName { index });
        } else if !seen.insert(node.node.as_str()) {
            issues.push(PayloadIssue::DuplicateNode {
                node: node.node.clone(),
            });
        }

        let Some(metrics) = node.metrics() else {
            continue;
        };

        for metric in Metric::ALL {
            if let Some(value) = metrics.get(metric)
                && let Err(source) = ensure_unit_rate(value, metric.key())
            {
                issues.push(PayloadIssue::BadMetric {
                    node: node.node.clone(),
                    source,
                });
            }
        }

        if let Some(fairness) = &metrics.fairness_metric {
            for (group, &value) in &fairness.group_accuracy {
                if ensure_unit_rate(value, "group_accuracy").is_err() {
                    issues.push(PayloadIssue::BadGroupAccuracy {
                        node: node.node.clone(),
                        group: group.clone(),
                        value,
                    });
                }
            }
        }
    }

    issues
}
