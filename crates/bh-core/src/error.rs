use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Model ID is empty")]
    EmptyModelId,

    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Rate out of range for {what}: {value} (expected 0..=1)")]
    RateOutOfRange { what: &'static str, value: f64 },
}
