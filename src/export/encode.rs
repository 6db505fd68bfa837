//! Pixel buffers to encoded image bytes.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};

use super::ExportFormat;
use crate::error::EncodingError;
use crate::theme::Color;

/// Solid fill placed under transparent pixels before JPEG encoding.
pub const JPEG_FALLBACK_FILL: Color = Color::WHITE;

pub const JPEG_QUALITY: u8 = 92;

#[cfg(feature = "avif")]
const AVIF_SPEED: u8 = 8;
#[cfg(feature = "avif")]
const AVIF_QUALITY: u8 = 80;

/// Encode straight-alpha RGBA pixels.
///
/// # Errors
///
/// Returns [`EncodingError::Encoder`] when the codec fails and
/// [`EncodingError::Unsupported`] for formats this build cannot produce.
pub fn encode(image: &RgbaImage, format: ExportFormat) -> Result<Vec<u8>, EncodingError> {
    let _scope = crate::perf::scope("export.encode");
    let (width, height) = image.dimensions();
    let mut out = Vec::new();
    let encoder_error = |source| EncodingError::Encoder {
        format: format.as_str(),
        source,
    };
    match format {
        ExportFormat::Png => PngEncoder::new(&mut out)
            .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(encoder_error)?,
        ExportFormat::Jpeg => {
            let flat = flatten(image, JPEG_FALLBACK_FILL);
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
                .write_image(flat.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(encoder_error)?;
        }
        ExportFormat::Webp => WebPEncoder::new_lossless(&mut out)
            .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(encoder_error)?,
        ExportFormat::Avif => encode_avif(image, &mut out)?,
        ExportFormat::Svg => {
            return Err(EncodingError::Unsupported {
                format: "svg",
                reason: "vector output is serialized, not encoded from pixels".to_string(),
            });
        }
    }
    Ok(out)
}

#[cfg(feature = "avif")]
fn encode_avif(image: &RgbaImage, out: &mut Vec<u8>) -> Result<(), EncodingError> {
    let (width, height) = image.dimensions();
    image::codecs::avif::AvifEncoder::new_with_speed_quality(out, AVIF_SPEED, AVIF_QUALITY)
        .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|source| EncodingError::Encoder { format: "avif", source })
}

#[cfg(not(feature = "avif"))]
fn encode_avif(_image: &RgbaImage, _out: &mut Vec<u8>) -> Result<(), EncodingError> {
    Err(EncodingError::Unsupported {
        format: "avif",
        reason: "built without the `avif` feature".to_string(),
    })
}

/// Composite straight-alpha pixels over an opaque fill.
pub fn flatten(image: &RgbaImage, fill: Color) -> RgbImage {
    let blend = |channel: u8, under: u8, alpha: u16| {
        let value = u16::from(channel) * alpha + u16::from(under) * (255 - alpha);
        ((value + 127) / 255) as u8
    };
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = u16::from(a);
        image::Rgb([
            blend(r, fill.r, alpha),
            blend(g, fill.g, alpha),
            blend(b, fill.b, alpha),
        ])
    })
}
