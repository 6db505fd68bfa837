//! Error types for the rendering pipeline.
//!
//! Configuration and encoding errors are fatal and surfaced to the caller.
//! Resource errors are recovered inside the export engine and reported as
//! warnings on the artifact. Malformed input (bad highlight ranges,
//! unterminated strings) never produces an error at all.

use thiserror::Error;

use crate::highlight::TokenKind;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Invalid or unknown configuration. Never silently defaulted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Theme name is not in the registry
    #[error("unknown theme `{name}`")]
    UnknownTheme { name: String },

    /// Export format name is not one of png, jpeg, webp, avif, svg
    #[error("unknown export format `{format}` (expected png, jpeg, webp, avif or svg)")]
    UnknownFormat { format: String },

    /// Theme registered without a color for every token kind
    #[error("theme `{theme}` has no color for token kind `{kind}`")]
    IncompleteTheme { theme: String, kind: TokenKind },

    /// Two themes registered under the same name
    #[error("theme `{name}` is already registered")]
    DuplicateTheme { name: String },

    /// A settings field holds a value outside its domain
    #[error("invalid value for `{field}`: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    /// A serialized bundle or settings file could not be read
    #[error("invalid bundle: {0}")]
    InvalidBundle(String),
}

/// A font or image could not be made available before the deadline.
///
/// The render still completes: text falls back to the default font stack
/// and the affected image layer is omitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("font family `{family}` is not installed, using fallback stack")]
    FontUnavailable { family: String },

    #[error("font loading exceeded {timeout_ms}ms, using fallback stack")]
    FontTimeout { timeout_ms: u64 },

    #[error("failed to fetch image `{url}`: {reason}")]
    ImageFetch { url: String, reason: String },

    #[error("failed to decode image `{url}`: {reason}")]
    ImageDecode { url: String, reason: String },

    #[error("image `{url}` did not load within {timeout_ms}ms")]
    ImageTimeout { url: String, timeout_ms: u64 },
}

/// The requested output format could not be produced.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// The encoder is not compiled into this build
    #[error("{format} export is unavailable: {reason}")]
    Unsupported { format: &'static str, reason: String },

    /// The encoder ran and failed
    #[error("{format} encoding failed: {source}")]
    Encoder {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },

    /// The composed frame could not be turned into pixels
    #[error("rasterization failed: {0}")]
    Rasterize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_theme_message_names_theme() {
        let err = Error::from(ConfigurationError::UnknownTheme {
            name: "not-a-theme".to_string(),
        });
        assert_eq!(err.to_string(), "unknown theme `not-a-theme`");
    }

    #[test]
    fn test_incomplete_theme_message_names_kind() {
        let err = ConfigurationError::IncompleteTheme {
            theme: "fixture".to_string(),
            kind: TokenKind::Number,
        };
        assert_eq!(err.to_string(), "theme `fixture` has no color for token kind `number`");
    }

    #[test]
    fn test_unsupported_format_message_names_format() {
        let err = EncodingError::Unsupported {
            format: "avif",
            reason: "built without the `avif` feature".to_string(),
        };
        assert!(err.to_string().starts_with("avif export is unavailable"));
    }
}
