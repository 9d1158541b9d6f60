use core::fmt;
use core::str::FromStr;

use crate::{CoreError, CoreResult};

/// Opaque identifier the server assigns to an uploaded model.
///
/// - never empty: "no model selected" is `Option<ModelId>::None`
/// - surrounding whitespace is trimmed on parse
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct ModelId(String);

impl ModelId {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyModelId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parse user input where blank means "nothing selected".
    pub fn from_input(raw: &str) -> Option<Self> {
        Self::parse(raw).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelId({})", self.0)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ModelId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModelId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.0
    }
}

impl AsRef<str> for ModelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
