use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::RenderSettings;
use crate::error::ConfigurationError;
use crate::highlight::{LanguageTag, SourceDocument};

/// Code, language and settings captured together so a render can be
/// reproduced later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Bundle {
    pub code: String,
    #[serde(default = "LanguageTag::plain")]
    pub language: LanguageTag,
    #[serde(default)]
    pub settings: RenderSettings,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: u64,
}

impl Bundle {
    /// Capture a document and settings, stamped with the current time.
    pub fn capture(document: &SourceDocument, settings: &RenderSettings) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        Self {
            code: document.code.clone(),
            language: document.language.clone(),
            settings: settings.clone(),
            timestamp,
        }
    }

    pub fn document(&self) -> SourceDocument {
        SourceDocument::new(self.code.clone(), self.language.clone())
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidBundle`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigurationError> {
        serde_json::to_string_pretty(self).map_err(|err| ConfigurationError::InvalidBundle(err.to_string()))
    }

    /// Read a bundle written by [`Bundle::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidBundle`] for malformed JSON,
    /// unknown keys or out-of-domain values.
    pub fn from_json(text: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(text).map_err(|err| ConfigurationError::InvalidBundle(err.to_string()))
    }
}
