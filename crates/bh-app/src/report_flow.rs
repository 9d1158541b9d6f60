//! Fetch the PDF report for a model and hand it to a download sink.

use std::path::PathBuf;

use bh_api::{FederationApi, ReportBlob};
use bh_core::ModelId;
use bh_session::Session;
use tracing::{debug, info, warn};

use crate::download::DownloadSink;
use crate::error::{AppError, AppResult};
use crate::notice::Notice;
use crate::request::{Completion, RequestSlot, Ticket};

const DOWNLOAD_FAILED: &str = "Download failed.";

#[derive(Debug, Clone, PartialEq)]
pub struct SavedReport {
    pub file_name: String,
    pub path: PathBuf,
    pub size_bytes: usize,
}

#[derive(Debug)]
pub struct ReportJob {
    pub ticket: Ticket,
    pub model_id: ModelId,
}

impl ReportJob {
    pub fn execute(self, api: &dyn FederationApi) -> Completion<ReportBlob> {
        Completion {
            ticket: self.ticket,
            outcome: api.fetch_report(&self.model_id),
        }
    }
}

#[derive(Debug, Default)]
pub struct ReportFlow {
    pub model_id_input: String,
    request: RequestSlot<SavedReport>,
    requested: Option<ModelId>,
}

impl ReportFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(session: &Session) -> Self {
        Self {
            model_id_input: session.model_id().map(ModelId::into_string).unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.request.is_loading()
    }

    pub fn saved(&self) -> Option<&SavedReport> {
        self.request.value()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.request.error()
    }

    /// Abandon any in-flight request; its response will be ignored.
    pub fn cancel(&mut self) {
        self.request.reset();
        self.requested = None;
    }

    pub fn begin(&mut self) -> AppResult<ReportJob> {
        let Some(model_id) = ModelId::from_input(&self.model_id_input) else {
            return Err(AppError::Validation("No Model ID found".to_string()));
        };
        if self.is_loading() {
            return Err(AppError::Busy);
        }

        let ticket = self.request.begin();
        self.requested = Some(model_id.clone());
        info!("Report {} requested for model {}", ticket, model_id);
        Ok(ReportJob { ticket, model_id })
    }

    /// Save a fetched report through `sink`. `None` means the response was stale.
    pub fn complete(
        &mut self,
        completion: Completion<ReportBlob>,
        sink: &dyn DownloadSink,
    ) -> Option<Notice> {
        let Completion { ticket, outcome } = completion;
        if !self.request.is_current(ticket) {
            debug!("Dropping stale report response {}", ticket);
            return None;
        }
        let model_id = self.requested.take()?;

        let saved = outcome
            .map_err(AppError::from)
            .and_then(|blob| save_report(&blob, &model_id, sink));

        match saved {
            Ok(report) => {
                let notice = Notice::success(format!(
                    "Report downloaded: {} ({} bytes)",
                    report.file_name, report.size_bytes
                ));
                self.request.complete(ticket, Ok(report));
                Some(notice)
            }
            Err(err) => {
                warn!("Report {} failed: {}", ticket, err);
                self.request.complete(ticket, Err(err.to_string()));
                Some(Notice::error(DOWNLOAD_FAILED))
            }
        }
    }

    pub fn submit(&mut self, api: &dyn FederationApi, sink: &dyn DownloadSink) -> Notice {
        match self.begin() {
            Ok(job) => {
                let completion = job.execute(api);
                self.complete(completion, sink)
                    .unwrap_or_else(|| Notice::error("Download was superseded"))
            }
            Err(err) => Notice::error(err.to_string()),
        }
    }
}

fn save_report(
    blob: &ReportBlob,
    model_id: &ModelId,
    sink: &dyn DownloadSink,
) -> AppResult<SavedReport> {
    let file_name = blob.file_name_for(model_id);
    let path = sink
        .save(&blob.bytes, &file_name)
        .map_err(|e| AppError::Download(format!("{file_name}: {e}")))?;
    Ok(SavedReport {
        file_name,
        path,
        size_bytes: blob.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;
    use std::path::Path;

    #[derive(Default)]
    struct RecordingSink {
        saved: RefCell<Vec<(String, usize)>>,
    }

    impl DownloadSink for RecordingSink {
        fn save(&self, bytes: &[u8], file_name: &str) -> io::Result<PathBuf> {
            self.saved.borrow_mut().push((file_name.to_string(), bytes.len()));
            Ok(Path::new("/downloads").join(file_name))
        }
    }

    struct FailingSink;

    impl DownloadSink for FailingSink {
        fn save(&self, _bytes: &[u8], _file_name: &str) -> io::Result<PathBuf> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    fn blob(name: Option<&str>) -> ReportBlob {
        ReportBlob {
            bytes: vec![0x25; 10],
            suggested_filename: name.map(str::to_string),
            content_type: Some("application/pdf".to_string()),
        }
    }

    fn flow_for(id: &str) -> ReportFlow {
        ReportFlow {
            model_id_input: id.to_string(),
            ..ReportFlow::default()
        }
    }

    #[test]
    fn missing_id_is_validation_error() {
        let err = ReportFlow::new().begin().unwrap_err();
        assert_eq!(err.to_string(), "No Model ID found");
    }

    #[test]
    fn success_notice_names_file_and_size() {
        let mut flow = flow_for("m1");
        let sink = RecordingSink::default();
        let job = flow.begin().unwrap();
        let notice = flow
            .complete(
                Completion {
                    ticket: job.ticket,
                    outcome: Ok(blob(None)),
                },
                &sink,
            )
            .unwrap();

        assert!(!notice.is_error());
        assert_eq!(
            notice.message,
            "Report downloaded: federation_report_m1.pdf (10 bytes)"
        );
        assert_eq!(
            sink.saved.borrow().as_slice(),
            &[("federation_report_m1.pdf".to_string(), 10)]
        );
        assert_eq!(flow.saved().unwrap().size_bytes, 10);
    }

    #[test]
    fn sink_failure_is_generic_download_failure() {
        let mut flow = flow_for("m1");
        let job = flow.begin().unwrap();
        let notice = flow
            .complete(
                Completion {
                    ticket: job.ticket,
                    outcome: Ok(blob(Some("r.pdf"))),
                },
                &FailingSink,
            )
            .unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.message, "Download failed.");
        assert!(flow.last_error().unwrap().contains("r.pdf"));
        assert!(flow.saved().is_none());
    }
}
