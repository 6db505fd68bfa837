//! SVG to pixels with resvg.

use std::sync::Arc;

use image::RgbaImage;
use resvg::usvg::{self, fontdb};

use crate::error::EncodingError;

/// Physical pixel size of a logical size at `scale`.
pub fn pixel_size(width: f32, height: f32, scale: f32) -> (u32, u32) {
    let to_px = |v: f32| ((v * scale).ceil() as u32).max(1);
    (to_px(width), to_px(height))
}

/// Rasterize SVG markup at `scale`, returning straight (not premultiplied)
/// RGBA pixels.
///
/// # Errors
///
/// Returns [`EncodingError::Rasterize`] if the markup does not parse or the
/// pixmap cannot be allocated.
pub fn rasterize(
    svg: &str,
    fonts: Arc<fontdb::Database>,
    fallback_family: &str,
    scale: f32,
) -> Result<RgbaImage, EncodingError> {
    let _scope = crate::perf::scope("export.rasterize");
    let options = usvg::Options {
        fontdb: fonts,
        font_family: fallback_family.to_string(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg, &options).map_err(|err| EncodingError::Rasterize(err.to_string()))?;
    let size = tree.size();
    let (width, height) = pixel_size(size.width(), size.height(), scale);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| EncodingError::Rasterize(format!("failed to create pixmap {width}x{height}")))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| EncodingError::Rasterize("pixmap size does not match its data".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="5" viewBox="0 0 10 5"><rect width="10" height="5" fill="#ff0000" fill-opacity="0.5"/></svg>"##;

    #[test]
    fn test_pixel_size_rounds_up() {
        assert_eq!(pixel_size(100.5, 20.0, 2.0), (201, 40));
        assert_eq!(pixel_size(10.0, 10.0, 0.01), (1, 1));
    }

    #[test]
    fn test_rasterize_scales_and_demultiplies() {
        let image = rasterize(SQUARE, Arc::new(fontdb::Database::new()), "monospace", 2.0).unwrap();
        assert_eq!(image.dimensions(), (20, 10));
        let pixel = image.get_pixel(5, 5);
        assert_eq!(pixel[0], 255);
        assert!((127..=128).contains(&pixel[3]));
    }

    #[test]
    fn test_invalid_markup_is_rasterize_error() {
        let err = rasterize("<svg", Arc::new(fontdb::Database::new()), "monospace", 1.0).unwrap_err();
        assert!(matches!(err, EncodingError::Rasterize(_)));
    }
}
