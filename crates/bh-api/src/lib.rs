//! bh-api: HTTP client for the federation server.
//!
//! The server is an external collaborator; this crate only encodes the
//! contract the front ends rely on (three endpoints, JSON or PDF bodies).

pub mod client;
pub mod config;
pub mod disposition;
pub mod error;
pub mod response;

pub use client::{FederationApi, HttpApiClient, ReportBlob};
pub use config::{ApiConfig, DEFAULT_BASE_URL};
pub use disposition::{default_report_filename, filename_from_content_disposition};
pub use error::{ApiError, ApiResult};
