//! Render settings: the typed configuration bundle read by the pipeline.
//!
//! Every field is enumerated and typed. Deserialization rejects unknown
//! keys so a typo in a settings file is reported instead of ignored, and
//! every field has a default so partial documents are accepted.

mod background;
mod bundle;
mod highlight;

use serde::{Deserialize, Serialize};

pub use background::{
    Background, DEFAULT_GRADIENT_ANGLE, GradientStop, Pattern, ResolvedGradient,
    apply_gradient_angle, parse_gradient,
};
pub use bundle::Bundle;
pub use highlight::{HighlightKind, HighlightRange, first_match};

use crate::error::ConfigurationError;
use crate::theme::Color;

/// Explicit size in pixels, or `auto` to size from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "DimensionRepr", into = "DimensionRepr")]
pub enum Dimension {
    #[default]
    Auto,
    Fixed(u32),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DimensionRepr {
    Pixels(u32),
    Keyword(String),
}

impl TryFrom<DimensionRepr> for Dimension {
    type Error = String;

    fn try_from(value: DimensionRepr) -> Result<Self, Self::Error> {
        match value {
            DimensionRepr::Pixels(0) => Err("size must be a positive integer".to_string()),
            DimensionRepr::Pixels(px) => Ok(Self::Fixed(px)),
            DimensionRepr::Keyword(word) if word.eq_ignore_ascii_case("auto") => Ok(Self::Auto),
            DimensionRepr::Keyword(word) => Err(format!("expected `auto` or pixels, got `{word}`")),
        }
    }
}

impl From<Dimension> for DimensionRepr {
    fn from(value: Dimension) -> Self {
        match value {
            Dimension::Auto => Self::Keyword("auto".to_string()),
            Dimension::Fixed(px) => Self::Pixels(px),
        }
    }
}

/// Left or right placement for header chrome and gutter numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Window-control dots: macOS colors or a single muted tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLightStyle {
    #[default]
    Color,
    Mono,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionPosition {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl CaptionPosition {
    /// Top and left captions precede the window in stacking order.
    pub const fn precedes_window(self) -> bool {
        matches!(self, Self::Top | Self::Left)
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionStyle {
    #[default]
    Normal,
    Italic,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkMode {
    #[default]
    None,
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
    Double,
}

/// CSS-style post filters applied to the whole frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ImageFilters {
    /// 0 (none) to 1 (full)
    pub grayscale: f32,
    /// 0 (none) to 1 (full)
    pub sepia: f32,
    /// Gaussian blur radius in pixels
    pub blur: f32,
    /// 1 is unchanged
    pub brightness: f32,
    /// 1 is unchanged
    pub contrast: f32,
    /// 1 is unchanged
    pub saturate: f32,
    /// Degrees
    pub hue_rotate: f32,
    /// 0 (none) to 1 (full)
    pub invert: f32,
}

impl Default for ImageFilters {
    fn default() -> Self {
        Self {
            grayscale: 0.0,
            sepia: 0.0,
            blur: 0.0,
            brightness: 1.0,
            contrast: 1.0,
            saturate: 1.0,
            hue_rotate: 0.0,
            invert: 0.0,
        }
    }
}

impl ImageFilters {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Clamp every value into the range its filter function accepts.
    /// Non-finite values fall back to the unchanged value.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let identity = Self::default();
        let within = |value: f32, fallback: f32, min: f32, max: f32| {
            if value.is_finite() { value.clamp(min, max) } else { fallback }
        };
        Self {
            grayscale: within(self.grayscale, identity.grayscale, 0.0, 1.0),
            sepia: within(self.sepia, identity.sepia, 0.0, 1.0),
            blur: within(self.blur, identity.blur, 0.0, f32::MAX),
            brightness: within(self.brightness, identity.brightness, 0.0, f32::MAX),
            contrast: within(self.contrast, identity.contrast, 0.0, f32::MAX),
            saturate: within(self.saturate, identity.saturate, 0.0, f32::MAX),
            hue_rotate: if self.hue_rotate.is_finite() {
                self.hue_rotate.rem_euclid(360.0)
            } else {
                identity.hue_rotate
            },
            invert: within(self.invert, identity.invert, 0.0, 1.0),
        }
    }
}

/// The full configuration for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RenderSettings {
    pub theme: String,

    // Typography
    pub font_family: String,
    pub font_size: f32,
    pub word_wrap: bool,

    // Geometry
    pub width: Dimension,
    pub height: Dimension,
    pub padding: f32,
    pub border_radius: f32,
    /// Outer canvas corners; defaults to `border_radius`
    pub frame_radius: Option<f32>,
    /// Code window corners; defaults to `border_radius`
    pub code_radius: Option<f32>,

    // Background
    pub background: Background,
    pub pattern: Pattern,
    pub pattern_color: Option<Color>,
    pub pattern_opacity: f32,
    pub pattern_size: f32,

    // Chrome
    pub show_header: bool,
    pub traffic_lights: bool,
    pub traffic_light_style: TrafficLightStyle,
    pub header_alignment: Side,
    pub file_name: Option<String>,
    pub file_name_opacity: f32,
    pub file_name_weight: u16,
    pub file_name_size: f32,
    pub project_name: Option<String>,
    pub line_numbers: bool,
    pub line_number_alignment: Side,
    pub line_number_opacity: f32,
    pub line_number_start: usize,

    // Caption
    pub caption: Option<String>,
    pub caption_position: CaptionPosition,
    pub caption_style: CaptionStyle,
    pub caption_opacity: f32,

    // Label
    pub label: Option<String>,
    pub label_alignment: Alignment,
    pub label_opacity: f32,
    pub label_color: Option<Color>,
    pub label_font_size: f32,

    // Watermark
    pub watermark: WatermarkMode,
    pub watermark_text: Option<String>,
    pub watermark_color: Option<Color>,
    pub watermark_font_size: f32,
    pub watermark_font_weight: u16,
    pub watermark_image_url: Option<String>,
    pub watermark_image_width: f32,
    pub watermark_image_height: f32,
    /// Horizontal position as a percentage of canvas width
    pub watermark_x: f32,
    /// Vertical position as a percentage of canvas height
    pub watermark_y: f32,
    pub watermark_rotation: f32,
    pub watermark_opacity: f32,

    // Border
    pub border_style: BorderStyle,
    pub border_width: f32,
    pub border_offset: f32,
    pub border_color: Option<Color>,
    pub border_opacity: f32,

    pub filters: ImageFilters,

    pub highlights: Vec<HighlightRange>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            theme: "dracula".to_string(),
            font_family: "JetBrains Mono".to_string(),
            font_size: 14.0,
            word_wrap: false,
            width: Dimension::Auto,
            height: Dimension::Auto,
            padding: 32.0,
            border_radius: 12.0,
            frame_radius: None,
            code_radius: None,
            background: Background::default(),
            pattern: Pattern::None,
            pattern_color: None,
            pattern_opacity: 0.2,
            pattern_size: 16.0,
            show_header: true,
            traffic_lights: true,
            traffic_light_style: TrafficLightStyle::Color,
            header_alignment: Side::Left,
            file_name: None,
            file_name_opacity: 0.7,
            file_name_weight: 500,
            file_name_size: 13.0,
            project_name: None,
            line_numbers: false,
            line_number_alignment: Side::Right,
            line_number_opacity: 0.5,
            line_number_start: 1,
            caption: None,
            caption_position: CaptionPosition::Bottom,
            caption_style: CaptionStyle::Normal,
            caption_opacity: 0.8,
            label: None,
            label_alignment: Alignment::Center,
            label_opacity: 0.8,
            label_color: None,
            label_font_size: 12.0,
            watermark: WatermarkMode::None,
            watermark_text: None,
            watermark_color: None,
            watermark_font_size: 24.0,
            watermark_font_weight: 700,
            watermark_image_url: None,
            watermark_image_width: 64.0,
            watermark_image_height: 64.0,
            watermark_x: 90.0,
            watermark_y: 90.0,
            watermark_rotation: 0.0,
            watermark_opacity: 0.3,
            border_style: BorderStyle::None,
            border_width: 2.0,
            border_offset: 0.0,
            border_color: None,
            border_opacity: 1.0,
            filters: ImageFilters::default(),
            highlights: Vec::new(),
        }
    }
}

impl RenderSettings {
    /// Radius of the outer canvas corners.
    pub fn effective_frame_radius(&self) -> f32 {
        self.frame_radius.unwrap_or(self.border_radius)
    }

    /// Radius of the code window corners.
    pub fn effective_code_radius(&self) -> f32 {
        self.code_radius.unwrap_or(self.border_radius)
    }

    /// Parse a JSON or JSON5 settings document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidBundle`] naming the offending
    /// key or value.
    pub fn from_json5(text: &str) -> Result<Self, ConfigurationError> {
        json5::from_str(text).map_err(|err| ConfigurationError::InvalidBundle(err.to_string()))
    }

    /// Check values that cannot be rendered meaningfully.
    ///
    /// Cosmetic values (opacities, offsets) are clamped during layout
    /// instead; only values that make the frame undefined are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSetting`] naming the field.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_range("fontSize", self.font_size, 1.0, 200.0)?;
        check_range("padding", self.padding, 0.0, 400.0)?;
        check_range("borderRadius", self.border_radius, 0.0, 400.0)?;
        if let Some(radius) = self.frame_radius {
            check_range("frameRadius", radius, 0.0, 400.0)?;
        }
        if let Some(radius) = self.code_radius {
            check_range("codeRadius", radius, 0.0, 400.0)?;
        }
        check_range("borderWidth", self.border_width, 0.0, 100.0)?;
        check_range("fileNameSize", self.file_name_size, 1.0, 200.0)?;
        check_range("labelFontSize", self.label_font_size, 1.0, 200.0)?;
        check_range("watermarkFontSize", self.watermark_font_size, 1.0, 400.0)?;
        check_range("patternSize", self.pattern_size, 2.0, 400.0)?;
        if self.font_family.trim().is_empty() {
            return Err(ConfigurationError::InvalidSetting {
                field: "fontFamily",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigurationError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidSetting {
            field,
            reason: format!("{value} is outside {min}..={max}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_filters_clamp_out_of_range_values() {
        let filters = ImageFilters {
            grayscale: -1.0,
            sepia: 3.0,
            blur: -4.0,
            brightness: f32::NAN,
            hue_rotate: -90.0,
            invert: -0.5,
            ..ImageFilters::default()
        }
        .sanitized();
        assert_eq!(filters.grayscale, 0.0);
        assert_eq!(filters.sepia, 1.0);
        assert_eq!(filters.blur, 0.0);
        assert_eq!(filters.brightness, 1.0);
        assert_eq!(filters.hue_rotate, 270.0);
        assert_eq!(filters.invert, 0.0);

        let negative_only = ImageFilters {
            grayscale: -1.0,
            invert: -2.0,
            ..ImageFilters::default()
        };
        assert!(negative_only.sanitized().is_identity());
    }

    #[test]
    fn test_default_settings_validate() {
        assert!(RenderSettings::default().validate().is_ok());
    }

    #[test]
    fn test_specific_radii_default_to_global() {
        let mut settings = RenderSettings {
            border_radius: 10.0,
            ..RenderSettings::default()
        };
        assert_eq!(settings.effective_frame_radius(), 10.0);
        assert_eq!(settings.effective_code_radius(), 10.0);
        settings.code_radius = Some(4.0);
        assert_eq!(settings.effective_frame_radius(), 10.0);
        assert_eq!(settings.effective_code_radius(), 4.0);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = serde_json::from_str::<RenderSettings>(r#"{"fontSzie": 12}"#).unwrap_err();
        assert!(err.to_string().contains("fontSzie"), "{err}");
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let settings: RenderSettings =
            serde_json::from_str(r#"{"theme": "nord", "width": 640}"#).unwrap();
        assert_eq!(settings.theme, "nord");
        assert_eq!(settings.width, Dimension::Fixed(640));
        assert_eq!(settings.height, Dimension::Auto);
        assert_eq!(settings.font_size, 14.0);
    }

    #[test]
    fn test_dimension_accepts_auto_and_rejects_zero() {
        assert_eq!(serde_json::from_str::<Dimension>("\"auto\"").unwrap(), Dimension::Auto);
        assert_eq!(serde_json::from_str::<Dimension>("320").unwrap(), Dimension::Fixed(320));
        assert!(serde_json::from_str::<Dimension>("0").is_err());
        assert!(serde_json::from_str::<Dimension>("\"wide\"").is_err());
        assert_eq!(serde_json::to_string(&Dimension::Auto).unwrap(), "\"auto\"");
    }

    #[test]
    fn test_json5_settings_with_comments() {
        let text = r#"{
            // hand-written settings
            theme: 'monokai',
            background: { type: 'gradient', value: 'linear-gradient(#000, #fff)', angle: 90 },
            highlights: [{ id: 'a', startLine: 3, endLine: 1, type: 'add' }],
        }"#;
        let settings = RenderSettings::from_json5(text).unwrap();
        assert_eq!(settings.theme, "monokai");
        assert_eq!(settings.highlights[0].end_line(), 3);
    }

    #[test]
    fn test_validate_names_offending_field() {
        let settings = RenderSettings {
            font_size: 0.0,
            ..RenderSettings::default()
        };
        match settings.validate() {
            Err(ConfigurationError::InvalidSetting { field, .. }) => assert_eq!(field, "fontSize"),
            other => panic!("unexpected {other:?}"),
        }
        let settings = RenderSettings {
            padding: f32::NAN,
            ..RenderSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_caption_stacking_order() {
        assert!(CaptionPosition::Top.precedes_window());
        assert!(CaptionPosition::Left.precedes_window());
        assert!(!CaptionPosition::Bottom.precedes_window());
        assert!(!CaptionPosition::Right.precedes_window());
    }
}
