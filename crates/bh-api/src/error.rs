//! Error types for the federation API client.

/// Failure of a single API call. No call is retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server returned {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    #[error("Upload succeeded but couldn't extract model ID")]
    MissingModelId,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

impl ApiError {
    /// Server-supplied detail message, if the server sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_includes_detail_when_present() {
        let with = ApiError::Status {
            status: 404,
            detail: Some("Model not found".to_string()),
        };
        assert_eq!(with.to_string(), "Server returned 404: Model not found");
        assert_eq!(with.detail(), Some("Model not found"));

        let without = ApiError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(without.to_string(), "Server returned 500");
        assert_eq!(without.detail(), None);
    }
}
