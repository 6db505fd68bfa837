//! Export engine: frames to PNG, JPEG, WebP, AVIF or SVG.
//!
//! [`Exporter::export`] is the only asynchronous stage of the pipeline. It
//! waits for fonts and images (each wait bounded by
//! [`ExporterConfig::asset_timeout`]), serializes the frame to SVG and, for
//! raster formats, rasterizes and encodes it. Exports share nothing
//! mutable except the URL-keyed image cache, so several formats of one
//! frame can be exported concurrently.

mod assets;
mod encode;
mod raster;
mod svg;

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

pub use assets::{EmbeddedImage, FALLBACK_MONOSPACE, FontLibrary, ImageCache, ImageLoader, font_stack};
pub use encode::{JPEG_FALLBACK_FILL, JPEG_QUALITY, encode, flatten};
pub use raster::{pixel_size, rasterize};
pub use svg::{SvgOptions, UI_FONT_STACK, render_svg};

use crate::error::{ConfigurationError, EncodingError, Result, ResourceError};
use crate::layout::{FontMetrics, Frame};

/// Default bound on every font or image wait.
pub const ASSET_TIMEOUT: Duration = Duration::from_secs(3);

pub const MAX_SCALE: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Webp,
    Avif,
    Svg,
}

impl ExportFormat {
    pub const ALL: [Self; 5] = [Self::Png, Self::Jpeg, Self::Webp, Self::Avif, Self::Svg];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Svg => "svg",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Avif => "image/avif",
            Self::Svg => "image/svg+xml",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            other => other.as_str(),
        }
    }

    pub const fn is_raster(self) -> bool {
        !matches!(self, Self::Svg)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            "avif" => Ok(Self::Avif),
            "svg" => Ok(Self::Svg),
            _ => Err(ConfigurationError::UnknownFormat { format: s.to_string() }),
        }
    }
}

/// One finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    /// Logical (unscaled) width
    pub width: u32,
    /// Logical (unscaled) height
    pub height: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Resources that were unavailable; the artifact rendered without them
    pub warnings: Vec<ResourceError>,
}

impl ExportArtifact {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), BASE64.encode(&self.bytes))
    }
}

#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub asset_timeout: Duration,
    /// Load installed system fonts (turn off for hermetic tests)
    pub system_fonts: bool,
    pub font_dirs: Vec<PathBuf>,
    /// Directory relative image paths resolve against
    pub base_dir: Option<PathBuf>,
    pub image_cache_size: usize,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            asset_timeout: ASSET_TIMEOUT,
            system_fonts: true,
            font_dirs: Vec::new(),
            base_dir: None,
            image_cache_size: 32,
        }
    }
}

#[derive(Debug)]
pub struct Exporter {
    config: ExporterConfig,
    fonts: FontLibrary,
    images: ImageLoader,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ExporterConfig::default())
    }
}

impl Exporter {
    pub fn new(config: ExporterConfig) -> Self {
        Self {
            fonts: FontLibrary::new(config.system_fonts, config.font_dirs.clone()),
            images: ImageLoader::new(config.image_cache_size, config.base_dir.clone()),
            config,
        }
    }

    pub const fn config(&self) -> &ExporterConfig {
        &self.config
    }

    pub const fn image_cache(&self) -> &ImageCache {
        self.images.cache()
    }

    /// Advance widths of `family` from the export font database, so a frame
    /// composed with them lines up with the rasterized text. `None` when
    /// the family is not installed.
    pub async fn font_metrics(&self, family: &str) -> Option<FontMetrics> {
        let fonts = self.fonts.prepare(family, self.config.asset_timeout).await;
        FontMetrics::from_database(&fonts.database, family)
    }

    /// Export a frame in `format` at device pixel ratio `scale`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSetting`] for a scale outside
    /// `(0, 4]` and an [`crate::error::EncodingError`] when the format
    /// cannot be produced. Missing fonts and images are warnings on the
    /// artifact, not errors.
    pub async fn export(&self, frame: &Frame, format: ExportFormat, scale: f32) -> Result<ExportArtifact> {
        let _scope = crate::perf::scope("export");
        validate_scale(scale)?;
        tracing::debug!(%format, scale, "export started");

        let timeout = self.config.asset_timeout;
        let (fonts, images) = tokio::join!(
            self.fonts.prepare(&frame.font_family, timeout),
            self.prepare_images(frame)
        );
        let (images, image_warnings) = images;
        let mut warnings = fonts.warnings;
        warnings.extend(image_warnings);

        let markup = render_svg(
            frame,
            &SvgOptions {
                code_font: &fonts.code_stack,
                ui_font: UI_FONT_STACK,
                images: &images,
                checkerboard: false,
            },
        );

        let width = frame.size.width.ceil() as u32;
        let height = frame.size.height.ceil() as u32;
        let (bytes, pixel_width, pixel_height) = if format.is_raster() {
            let database = Arc::clone(&fonts.database);
            let encoded = tokio::task::spawn_blocking(move || {
                let fallback = database.family_name(&resvg::usvg::fontdb::Family::Monospace).to_string();
                let pixels = rasterize(&markup, database, &fallback, scale)?;
                let (w, h) = pixels.dimensions();
                encode(&pixels, format).map(|bytes| (bytes, w, h))
            })
            .await
            .map_err(|err| EncodingError::Rasterize(err.to_string()))?;
            encoded?
        } else {
            (markup.into_bytes(), width, height)
        };

        crate::perf::log_event(
            "export.done",
            format!(
                "format={format} bytes={} pixels={pixel_width}x{pixel_height} warnings={}",
                bytes.len(),
                warnings.len()
            ),
        );
        Ok(ExportArtifact {
            format,
            bytes,
            width,
            height,
            pixel_width,
            pixel_height,
            warnings,
        })
    }

    /// Export several formats of one frame concurrently.
    pub async fn export_all(
        &self,
        frame: &Frame,
        formats: &[ExportFormat],
        scale: f32,
    ) -> Vec<Result<ExportArtifact>> {
        futures::future::join_all(formats.iter().map(|format| self.export(frame, *format, scale))).await
    }

    /// Load every image the frame references, concurrently.
    async fn prepare_images(&self, frame: &Frame) -> (HashMap<String, String>, Vec<ResourceError>) {
        let timeout = self.config.asset_timeout;
        let urls = frame.image_urls();
        let loaded = futures::future::join_all(urls.iter().map(|url| self.images.load(url, timeout))).await;

        let mut images = HashMap::new();
        let mut warnings = Vec::new();
        for (url, result) in urls.into_iter().zip(loaded) {
            match result {
                Ok(image) => {
                    images.insert(url.to_string(), image.data_uri.clone());
                }
                Err(err) => {
                    tracing::warn!(%err, "omitting image layer");
                    warnings.push(err);
                }
            }
        }
        (images, warnings)
    }
}

fn validate_scale(scale: f32) -> std::result::Result<(), ConfigurationError> {
    if scale.is_finite() && scale > 0.0 && scale <= MAX_SCALE {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidSetting {
            field: "scale",
            reason: format!("{scale} is outside (0, {MAX_SCALE}]"),
        })
    }
}
