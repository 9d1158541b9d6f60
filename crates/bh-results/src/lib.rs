//! bh-results: federation run payloads and the statistics derived from them.

pub mod aggregate;
pub mod summary;
pub mod types;
pub mod validate;

pub use aggregate::{aggregate, AggregateStats, MetricAverages, MissingMetricPolicy};
pub use summary::{accuracy_series, executive_summary};
pub use types::*;
pub use validate::{validate_payload, PayloadIssue};

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse the JSON body returned by the run endpoint.
pub fn parse_federation_result(json: &str) -> ResultsResult<FederationResult> {
    Ok(serde_json::from_str(json)?)
}
