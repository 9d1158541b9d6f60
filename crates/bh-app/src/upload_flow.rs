//! Upload a local model file and remember the identifier the server assigns.

use std::path::Path;

use bh_api::{ApiError, FederationApi};
use bh_core::ModelId;
use bh_session::Session;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::notice::Notice;
use crate::request::{Completion, RequestSlot, Ticket};

/// Extensions offered by the file picker. Others are still uploadable.
pub const SUPPORTED_MODEL_EXTENSIONS: [&str; 5] = ["pkl", "joblib", "h5", "pt", "pth"];

#[derive(Clone, PartialEq)]
pub struct SelectedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> AppResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| AppError::ModelFileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model.bin".to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }

    pub fn has_supported_extension(&self) -> bool {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                SUPPORTED_MODEL_EXTENSIONS
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(ext))
            })
    }
}

/// One upload request, detached from the flow so it can run on a worker.
#[derive(Debug)]
pub struct UploadJob {
    pub ticket: Ticket,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadJob {
    pub fn execute(self, api: &dyn FederationApi) -> Completion<ModelId> {
        Completion {
            ticket: self.ticket,
            outcome: api.upload_model(self.bytes, &self.file_name),
        }
    }
}

#[derive(Debug, Default)]
pub struct UploadFlow {
    selected: Option<SelectedFile>,
    request: RequestSlot<ModelId>,
    model_id: Option<ModelId>,
}

impl UploadFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show whatever identifier the session already holds.
    pub fn mount(session: &Session) -> Self {
        Self {
            model_id: session.model_id(),
            ..Self::default()
        }
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        if !file.has_supported_extension() {
            warn!("Selected file '{}' has an unexpected extension", file.file_name);
        }
        self.selected = Some(file);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Identifier from the last successful upload (or the session on mount).
    pub fn model_id(&self) -> Option<&ModelId> {
        self.model_id.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.request.is_loading()
    }

    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.is_loading()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.request.error()
    }

    pub fn cancel(&mut self) {
        self.request.reset();
    }

    /// Validate and issue a ticket. No request is made when this fails.
    pub fn begin(&mut self) -> AppResult<UploadJob> {
        let Some(file) = &self.selected else {
            return Err(AppError::Validation(
                "Please select a model file first".to_string(),
            ));
        };
        if self.is_loading() {
            return Err(AppError::Busy);
        }

        let job = UploadJob {
            ticket: self.request.begin(),
            file_name: file.file_name.clone(),
            bytes: file.bytes.clone(),
        };
        info!("Upload {} started for '{}'", job.ticket, job.file_name);
        Ok(job)
    }

    /// Apply a finished upload. `None` means the response was stale.
    pub fn complete(&mut self, completion: Completion<ModelId>, session: &Session) -> Option<Notice> {
        let Completion { ticket, outcome } = completion;
        let message = match &outcome {
            Ok(_) => String::new(),
            Err(err) => upload_failure_message(err),
        };
        let outcome = outcome.map_err(|_| message.clone());

        self.request.complete(ticket, outcome)?;

        match self.request.value() {
            Some(id) => {
                session.set_model_id(id);
                self.model_id = Some(id.clone());
                self.selected = None;
                info!("Upload {} stored model id {}", ticket, id);
                Some(Notice::success(format!(
                    "Model uploaded successfully! Model ID: {id}"
                )))
            }
            None => {
                warn!("Upload {} failed: {}", ticket, message);
                Some(Notice::error(message))
            }
        }
    }

    /// Run the whole upload on the calling thread.
    pub fn submit(&mut self, api: &dyn FederationApi, session: &Session) -> Notice {
        match self.begin() {
            Ok(job) => {
                let completion = job.execute(api);
                self.complete(completion, session)
                    .unwrap_or_else(|| Notice::error("Upload was superseded"))
            }
            Err(err) => Notice::error(err.to_string()),
        }
    }
}

fn upload_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::MissingModelId => err.to_string(),
        _ => err
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| "Upload failed. Please try again.".to_string()),
    }
}
