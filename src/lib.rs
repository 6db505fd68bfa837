// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. export::ExportFormat)
    clippy::module_name_repetitions
)]

//! # Codeframe
//!
//! Turn source code into presentation-quality images.
//!
//! A render runs through four stages:
//! - **Tokenize**: split code into classified tokens for its language
//! - **Theme**: resolve a named palette for every token kind
//! - **Compose**: lay out the window, chrome, background and decorations
//!   into a [`layout::Frame`]
//! - **Export**: rasterize and encode the frame as PNG, JPEG, WebP, AVIF or
//!   serialize it as SVG
//!
//! Everything up to the frame is pure and synchronous. Only export waits on
//! fonts and images, and every such wait is bounded.
//!
//! ## Modules
//!
//! - [`highlight`]: Language tags and the tokenizer
//! - [`theme`]: Colors, themes and the theme registry
//! - [`settings`]: Render settings, backgrounds, highlight ranges, bundles
//! - [`layout`]: Frame composition
//! - [`export`]: Asset loading, SVG serialization, rasterizing and encoding
//! - [`config`]: Saved command line defaults
//! - [`perf`]: Stage timing and the render debug log

pub mod config;
pub mod error;
pub mod export;
pub mod highlight;
pub mod layout;
pub mod perf;
pub mod settings;
pub mod theme;

use error::Result;
use highlight::SourceDocument;
use layout::{Frame, TextMetrics};
use settings::RenderSettings;
use theme::ThemeRegistry;

/// Run the synchronous half of the pipeline: validate, resolve the theme,
/// tokenize and compose.
///
/// # Errors
///
/// Returns a [`error::ConfigurationError`] for invalid settings or an
/// unknown theme name.
pub fn render_frame(
    document: &SourceDocument,
    settings: &RenderSettings,
    registry: &ThemeRegistry,
    metrics: &dyn TextMetrics,
) -> Result<Frame> {
    settings.validate()?;
    let theme = theme::resolve_theme(registry, &settings.theme)?;
    let tokens = document.tokenize();
    tracing::debug!(
        language = document.language.as_str(),
        tokens = tokens.len(),
        theme = %settings.theme,
        "composing frame"
    );
    Ok(layout::compose(&tokens, theme, settings, &settings.highlights, metrics))
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ConfigurationError, EncodingError, Error, ResourceError, Result};
    pub use crate::export::{ExportArtifact, ExportFormat, Exporter, ExporterConfig};
    pub use crate::highlight::{LanguageTag, SourceDocument, Token, TokenKind, tokenize};
    pub use crate::layout::{Frame, MonospaceMetrics, TextMetrics, compose};
    pub use crate::render_frame;
    pub use crate::settings::{Background, Bundle, HighlightKind, HighlightRange, RenderSettings};
    pub use crate::theme::{Color, Theme, ThemeRegistry, resolve_theme};
}
