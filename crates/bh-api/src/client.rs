//! The three federation server operations.

use bh_core::ModelId;
use bh_results::FederationResult;
use reqwest::Url;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderName};
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::disposition::{default_report_filename, filename_from_content_disposition};
use crate::error::{ApiError, ApiResult};
use crate::response::{error_detail, extract_model_id};

/// Operations the front ends need from the federation server.
///
/// Every call is a single blocking request: no retry, no caching, no
/// deduplication. Callers that must stay responsive run calls on a worker.
pub trait FederationApi: Send + Sync {
    /// `POST /models/upload` with the file as multipart field `file`.
    fn upload_model(&self, file_bytes: Vec<u8>, file_name: &str) -> ApiResult<ModelId>;

    /// `POST /federation/run/{id}`.
    fn run_federation(&self, id: &ModelId) -> ApiResult<FederationResult>;

    /// `POST /federation/report/{id}`, returning the PDF body.
    fn fetch_report(&self, id: &ModelId) -> ApiResult<ReportBlob>;
}

/// Binary report body plus what the response headers said about it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBlob {
    pub bytes: Vec<u8>,
    pub suggested_filename: Option<String>,
    pub content_type: Option<String>,
}

impl ReportBlob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Header-supplied name, else `federation_report_<id>.pdf`.
    pub fn file_name_for(&self, id: &ModelId) -> String {
        self.suggested_filename
            .clone()
            .unwrap_or_else(|| default_report_filename(id))
    }
}

/// [`FederationApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: config.base_url.clone(),
                message: "URL cannot carry a path".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                message: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn post(&self, url: Url) -> ApiResult<Response> {
        debug!("POST {}", url);
        let response = self.client.post(url).send()?;
        check_status(response)
    }
}

fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    debug!("Response status {}", status);
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().unwrap_or_default();
    let detail = error_detail(&body);
    warn!(
        "Server returned {}{}",
        status,
        detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
    );
    Err(ApiError::Status {
        status: status.as_u16(),
        detail,
    })
}

impl FederationApi for HttpApiClient {
    fn upload_model(&self, file_bytes: Vec<u8>, file_name: &str) -> ApiResult<ModelId> {
        let url = self.endpoint(&["models", "upload"])?;
        info!("Uploading model {} ({} bytes)", file_name, file_bytes.len());

        let part = Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("file", part);

        debug!("POST {}", url);
        let response = check_status(self.client.post(url).multipart(form).send()?)?;
        let body = response.bytes()?;
        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| ApiError::MalformedBody(e.to_string()))?;

        let id = extract_model_id(&value).ok_or(ApiError::MissingModelId)?;
        info!("Model uploaded as {}", id);
        Ok(id)
    }

    fn run_federation(&self, id: &ModelId) -> ApiResult<FederationResult> {
        let url = self.endpoint(&["federation", "run", id.as_str()])?;
        info!("Running federation for model {}", id);

        let body = self.post(url)?.bytes()?;
        let result: FederationResult = serde_json::from_slice(&body)
            .map_err(|e| ApiError::MalformedBody(e.to_string()))?;

        info!("Federation returned {} node result(s)", result.len());
        Ok(result)
    }

    fn fetch_report(&self, id: &ModelId) -> ApiResult<ReportBlob> {
        let url = self.endpoint(&["federation", "report", id.as_str()])?;
        info!("Fetching report for model {}", id);

        let response = self.post(url)?;
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let suggested_filename =
            header(CONTENT_DISPOSITION).and_then(|v| filename_from_content_disposition(&v));
        let content_type = header(CONTENT_TYPE);
        let bytes = response.bytes()?.to_vec();

        info!("Report received ({} bytes)", bytes.len());
        Ok(ReportBlob {
            bytes,
            suggested_filename,
            content_type,
        })
    }
}
