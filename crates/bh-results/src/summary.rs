//! Human-readable summaries of aggregated runs.

use crate::aggregate::AggregateStats;

/// Plain-text executive summary of a run, in the wording used on reports.
pub fn executive_summary(stats: &AggregateStats) -> String {
    let Some(averages) = stats.averages else {
        return "No compatible datasets were evaluated.".to_string();
    };

    let avg_accuracy = averages
        .accuracy()
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "n/a".to_string());
    let max_bias = stats.max_bias_gap().unwrap_or(0.0);

    format!(
        "This report summarizes federated evaluation results.\n\
         \n\
         Evaluated Nodes: {}\n\
         Skipped Nodes: {}\n\
         Average Accuracy: {}\n\
         Maximum Bias Gap: {:.3}\n\
         \n\
         Higher bias gap may indicate fairness risk across sensitive groups.",
        stats.evaluated_count, stats.skipped_count, avg_accuracy, max_bias
    )
}

/// `(node, accuracy)` pairs for evaluated nodes that reported an accuracy.
pub fn accuracy_series(stats: &AggregateStats) -> Vec<(String, f64)> {
    stats
        .evaluated
        .iter()
        .filter_map(|n| n.metrics.accuracy.map(|acc| (n.node.clone(), acc)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, MissingMetricPolicy};
    use crate::types::{EvaluatedMetrics, FederationResult, NodeResult};

    #[test]
    fn nothing_evaluated_has_fixed_wording() {
        let result = FederationResult::new(vec![NodeResult::skipped("A", "no data")]);
        let stats = aggregate(&result, MissingMetricPolicy::TreatAsZero);
        assert_eq!(
            executive_summary(&stats),
            "No compatible datasets were evaluated."
        );
    }

    #[test]
    fn summary_reports_counts_accuracy_and_bias() {
        let mut a = EvaluatedMetrics::uniform(0.8);
        a.bias_gap = Some(0.1);
        let mut b = EvaluatedMetrics::uniform(0.6);
        b.bias_gap = Some(0.3);
        let result = FederationResult::new(vec![
            NodeResult::evaluated("A", a),
            NodeResult::evaluated("B", b),
            NodeResult::skipped("C", "insufficient data"),
        ]);
        let stats = aggregate(&result, MissingMetricPolicy::TreatAsZero);
        let text = executive_summary(&stats);
        assert!(text.contains("Evaluated Nodes: 2"));
        assert!(text.contains("Skipped Nodes: 1"));
        assert!(text.contains("Average Accuracy: 0.70"));
        assert!(text.contains("Maximum Bias Gap: 0.300"));
    }

    #[test]
    fn accuracy_series_skips_nodes_without_accuracy() {
        let mut b = EvaluatedMetrics::uniform(0.6);
        b.accuracy = None;
        let result = FederationResult::new(vec![
            NodeResult::evaluated("A", EvaluatedMetrics::uniform(0.8)),
            NodeResult::evaluated("B", b),
        ]);
        let stats = aggregate(&result, MissingMetricPolicy::TreatAsZero);
        assert_eq!(accuracy_series(&stats), vec![("A".to_string(), 0.8)]);
    }
}
