//! Text measurement used to size the frame before any font is rasterized.

use std::collections::HashMap;

use resvg::usvg::fontdb;
use unicode_width::UnicodeWidthChar;

/// Advance ratio of a typical monospace face (em fraction per cell).
pub const MONOSPACE_ADVANCE: f32 = 0.6;

/// Horizontal advance widths for layout.
pub trait TextMetrics {
    /// Advance of one character at `font_size`, in pixels.
    fn advance(&self, ch: char, font_size: f32) -> f32;

    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|ch| self.advance(ch, font_size)).sum()
    }
}

/// Fixed-cell metrics: every character occupies its terminal cell width.
///
/// Deterministic and font-independent, so it is the default for
/// composition and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    advance_ratio: f32,
}

impl MonospaceMetrics {
    pub const fn new(advance_ratio: f32) -> Self {
        Self { advance_ratio }
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(MONOSPACE_ADVANCE)
    }
}

impl TextMetrics for MonospaceMetrics {
    fn advance(&self, ch: char, font_size: f32) -> f32 {
        let cells = ch.width().unwrap_or(0) as f32;
        cells * self.advance_ratio * font_size
    }
}

/// Advances read from an installed face.
///
/// Latin text is measured from the face's `hmtx` table; anything else
/// falls back to cell widths scaled by the face's own digit advance.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    family: String,
    advances: HashMap<char, f32>,
    fallback: MonospaceMetrics,
}

impl FontMetrics {
    /// Measure `family` from a font database. `None` when the family is
    /// not installed or its face cannot be parsed.
    pub fn from_database(db: &fontdb::Database, family: &str) -> Option<Self> {
        let families = [fontdb::Family::Name(family)];
        let query = fontdb::Query {
            families: &families,
            ..fontdb::Query::default()
        };
        let id = db.query(&query)?;
        db.with_face_data(id, |data, index| Self::from_face_data(family, data, index))
            .flatten()
    }

    /// Measure a raw TrueType/OpenType face.
    pub fn from_face_data(family: &str, data: &[u8], index: u32) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, index).ok()?;
        let units_per_em = f32::from(face.units_per_em());
        if units_per_em <= 0.0 {
            return None;
        }
        let advance_of = |ch: char| {
            face.glyph_index(ch)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
                .map(|units| f32::from(units) / units_per_em)
        };
        let advances: HashMap<char, f32> = (' '..='\u{ff}')
            .filter_map(|ch| advance_of(ch).map(|em| (ch, em)))
            .collect();
        let digit = advances.get(&'0').copied().unwrap_or(MONOSPACE_ADVANCE);
        Some(Self {
            family: family.to_string(),
            advances,
            fallback: MonospaceMetrics::new(digit),
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }
}

impl TextMetrics for FontMetrics {
    fn advance(&self, ch: char, font_size: f32) -> f32 {
        match self.advances.get(&ch) {
            Some(em) => em * font_size,
            None => self.fallback.advance(ch, font_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_width_counts_cells() {
        let metrics = MonospaceMetrics::default();
        assert!((metrics.text_width("abcd", 10.0) - 24.0).abs() < 1e-4);
        // Wide CJK characters take two cells.
        assert!((metrics.text_width("漢", 10.0) - 12.0).abs() < 1e-4);
        assert_eq!(metrics.advance('\u{200b}', 10.0), 0.0);
    }

    #[test]
    fn test_missing_family_has_no_metrics() {
        let db = fontdb::Database::new();
        assert!(FontMetrics::from_database(&db, "Definitely Not A Font").is_none());
    }

    #[test]
    fn test_garbage_face_data_is_rejected() {
        assert!(FontMetrics::from_face_data("junk", &[0, 1, 2, 3], 0).is_none());
    }
}
