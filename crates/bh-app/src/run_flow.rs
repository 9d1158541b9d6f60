//! Run a federation for a model and derive the dashboard statistics.

use std::collections::BTreeMap;
use std::path::Path;

use bh_api::FederationApi;
use bh_core::ModelId;
use bh_results::{
    AggregateStats, FederationResult, MissingMetricPolicy, PayloadIssue, aggregate,
    executive_summary, parse_federation_result, validate_payload,
};
use bh_session::Session;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::notice::Notice;
use crate::request::{Completion, RequestSlot, RequestState, Ticket};

/// A completed run and everything derived from it.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub model_id: ModelId,
    pub result: FederationResult,
    pub stats: AggregateStats,
    pub issues: Vec<PayloadIssue>,
}

impl RunOutcome {
    pub fn new(model_id: ModelId, result: FederationResult, policy: MissingMetricPolicy) -> Self {
        let issues = validate_payload(&result);
        for issue in &issues {
            warn!("Run payload for {}: {}", model_id, issue);
        }
        let stats = aggregate(&result, policy);
        Self {
            model_id,
            result,
            stats,
            issues,
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot<'_> {
        DashboardSnapshot {
            model_id: self.model_id.as_str(),
            total_nodes: self.stats.total_nodes,
            evaluated_count: self.stats.evaluated_count,
            skipped_count: self.stats.skipped_count,
            missing_metrics: self.stats.policy,
            averages: self.stats.averages.map(|avg| {
                avg.iter()
                    .map(|(metric, value)| (metric.key(), value))
                    .collect()
            }),
            max_bias_gap: self.stats.max_bias_gap(),
            summary: executive_summary(&self.stats),
            nodes: &self.result,
        }
    }
}

/// Serializable view of a run, as printed by `dashboard --json`.
#[derive(Debug, Serialize)]
pub struct DashboardSnapshot<'a> {
    pub model_id: &'a str,
    pub total_nodes: usize,
    pub evaluated_count: usize,
    pub skipped_count: usize,
    pub missing_metrics: MissingMetricPolicy,
    /// Absent when no node was evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub averages: Option<BTreeMap<&'static str, Option<f64>>>,
    pub max_bias_gap: Option<f64>,
    pub summary: String,
    pub nodes: &'a FederationResult,
}

#[derive(Debug)]
pub struct RunJob {
    pub ticket: Ticket,
    pub model_id: ModelId,
}

impl RunJob {
    pub fn execute(self, api: &dyn FederationApi) -> Completion<FederationResult> {
        Completion {
            ticket: self.ticket,
            outcome: api.run_federation(&self.model_id),
        }
    }
}

#[derive(Debug, Default)]
pub struct RunFlow {
    /// Editable identifier; seeded from the session on mount.
    pub model_id_input: String,
    policy: MissingMetricPolicy,
    request: RequestSlot<RunOutcome>,
    requested: Option<ModelId>,
}

impl RunFlow {
    pub fn new(policy: MissingMetricPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn mount(session: &Session, policy: MissingMetricPolicy) -> Self {
        let mut flow = Self::new(policy);
        if let Some(id) = session.model_id() {
            flow.model_id_input = id.into_string();
        }
        flow
    }

    pub fn policy(&self) -> MissingMetricPolicy {
        self.policy
    }

    /// Switch the missing-metric policy, re-deriving any displayed stats.
    pub fn set_policy(&mut self, policy: MissingMetricPolicy) {
        if self.policy == policy {
            return;
        }
        self.policy = policy;
        if let Some(outcome) = self.request.value_mut() {
            outcome.stats = aggregate(&outcome.result, policy);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.request.is_loading()
    }

    pub fn state(&self) -> &RequestState<RunOutcome> {
        self.request.state()
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.request.value()
    }

    pub fn stats(&self) -> Option<&AggregateStats> {
        self.outcome().map(|o| &o.stats)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.request.error()
    }

    /// Abandon any in-flight request; its response will be ignored.
    pub fn cancel(&mut self) {
        self.request.reset();
        self.requested = None;
    }

    /// Validate the identifier and clear the previous result before issuing.
    pub fn begin(&mut self) -> AppResult<RunJob> {
        let Some(model_id) = ModelId::from_input(&self.model_id_input) else {
            return Err(AppError::Validation("Upload model first.".to_string()));
        };
        if self.is_loading() {
            return Err(AppError::Busy);
        }

        let ticket = self.request.begin();
        self.requested = Some(model_id.clone());
        info!("Run {} started for model {}", ticket, model_id);
        Ok(RunJob { ticket, model_id })
    }

    /// Apply a finished run. `None` means the response was stale.
    pub fn complete(&mut self, completion: Completion<FederationResult>) -> Option<Notice> {
        let Completion { ticket, outcome } = completion;
        if !self.request.is_current(ticket) {
            debug!("Dropping stale run response {}", ticket);
            return None;
        }
        let model_id = self.requested.take()?;

        let outcome = outcome
            .map(|result| RunOutcome::new(model_id, result, self.policy))
            .map_err(|err| err.to_string());

        match self.request.complete(ticket, outcome)? {
            RequestState::Succeeded(run) => {
                info!(
                    "Run {}: {} node(s), {} evaluated, {} skipped",
                    ticket, run.stats.total_nodes, run.stats.evaluated_count, run.stats.skipped_count
                );
                Some(Notice::success("Federation Completed Successfully!"))
            }
            RequestState::Failed(message) => {
                warn!("Run {} failed: {}", ticket, message);
                Some(Notice::error("Federation failed."))
            }
            RequestState::Idle | RequestState::Pending(_) => None,
        }
    }

    /// Run the whole federation request on the calling thread.
    pub fn submit(&mut self, api: &dyn FederationApi) -> Notice {
        match self.begin() {
            Ok(job) => {
                let completion = job.execute(api);
                self.complete(completion)
                    .unwrap_or_else(|| Notice::error("Run was superseded"))
            }
            Err(err) => Notice::error(err.to_string()),
        }
    }
}

/// Aggregate a saved run payload without contacting the server.
pub fn summarize_file(path: &Path, policy: MissingMetricPolicy) -> AppResult<AggregateStats> {
    let content = std::fs::read_to_string(path)?;
    let result = parse_federation_result(&content)?;
    for issue in validate_payload(&result) {
        warn!("{}: {}", path.display(), issue);
    }
    Ok(aggregate(&result, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bh_results::{EvaluatedMetrics, NodeResult};

    fn sample() -> FederationResult {
        let mut sparse = EvaluatedMetrics::uniform(0.6);
        sparse.recall = None;
        FederationResult::new(vec![
            NodeResult::evaluated("A", EvaluatedMetrics::uniform(0.8)),
            NodeResult::evaluated("B", sparse),
            NodeResult::skipped("C", "insufficient data"),
        ])
    }

    fn completed(flow: &mut RunFlow, result: FederationResult) {
        let job = flow.begin().unwrap();
        flow.complete(Completion {
            ticket: job.ticket,
            outcome: Ok(result),
        })
        .unwrap();
    }

    #[test]
    fn blank_input_blocks_submission() {
        let mut flow = RunFlow::new(MissingMetricPolicy::default());
        flow.model_id_input = "   ".to_string();
        let err = flow.begin().unwrap_err();
        assert_eq!(err.to_string(), "Upload model first.");
        assert!(!flow.is_loading());
    }

    #[test]
    fn policy_switch_recomputes_stats() {
        let mut flow = RunFlow::new(MissingMetricPolicy::TreatAsZero);
        flow.model_id_input = "m1".to_string();
        completed(&mut flow, sample());

        let recall = |flow: &RunFlow| flow.stats().unwrap().averages.unwrap().recall().unwrap();
        assert!((recall(&flow) - 0.4).abs() < 1e-12);

        flow.set_policy(MissingMetricPolicy::Exclude);
        assert!((recall(&flow) - 0.8).abs() < 1e-12);
        assert_eq!(flow.stats().unwrap().policy, MissingMetricPolicy::Exclude);
    }

    #[test]
    fn snapshot_omits_averages_without_evaluated_nodes() {
        let outcome = RunOutcome::new(
            ModelId::parse("m1").unwrap(),
            FederationResult::new(vec![NodeResult::skipped("A", "no data")]),
            MissingMetricPolicy::TreatAsZero,
        );
        let json = serde_json::to_value(outcome.snapshot()).unwrap();
        assert_eq!(json["skipped_count"], 1);
        assert!(json.get("averages").is_none());
        assert_eq!(json["summary"], "No compatible datasets were evaluated.");
    }

    #[test]
    fn snapshot_lists_metric_keys() {
        let outcome = RunOutcome::new(
            ModelId::parse("m1").unwrap(),
            sample(),
            MissingMetricPolicy::TreatAsZero,
        );
        let json = serde_json::to_value(outcome.snapshot()).unwrap();
        assert_eq!(json["model_id"], "m1");
        assert_eq!(json["missing_metrics"], "treat_as_zero");
        assert!((json["averages"]["accuracy"].as_f64().unwrap() - 0.7).abs() < 1e-12);
        assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
    }
}
