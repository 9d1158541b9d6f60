//! Shared application service layer for Benchmark Health.
//!
//! This crate provides a unified interface for both CLI and GUI frontends,
//! centralizing the upload, run and report flows, their request lifecycle,
//! configuration, and user-facing notices.

pub mod config;
pub mod download;
pub mod error;
pub mod notice;
pub mod report_flow;
pub mod request;
pub mod routes;
pub mod run_flow;
pub mod upload_flow;
pub mod worker;

// Re-export key types for convenience
pub use config::{AppConfig, DEFAULT_CONFIG_FILE, load_config, load_config_or_default, save_config};
pub use download::{DirectorySink, DownloadSink};
pub use error::{AppError, AppResult};
pub use notice::{Notice, NoticeLevel, NoticeLog};
pub use report_flow::{ReportFlow, ReportJob, SavedReport};
pub use request::{Completion, RequestSlot, RequestState, Ticket};
pub use routes::Route;
pub use run_flow::{DashboardSnapshot, RunFlow, RunJob, RunOutcome, summarize_file};
pub use upload_flow::{SUPPORTED_MODEL_EXTENSIONS, SelectedFile, UploadFlow, UploadJob};
pub use worker::{RequestWorker, WorkerPoll};
