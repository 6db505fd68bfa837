//! The composed frame: a layered, data-only visual tree.
//!
//! Layers are stored in paint order. Nothing here touches pixels; the
//! export engine serializes a frame to SVG and rasterizes that.

use super::geometry::{Point, Rect, Size};
use crate::highlight::TokenKind;
use crate::settings::{BorderStyle, ImageFilters, Pattern, ResolvedGradient};
use crate::theme::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Logical canvas size
    pub size: Size,
    /// Requested code font family
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub layers: Vec<Layer>,
    pub filters: ImageFilters,
}

impl Frame {
    pub fn background(&self) -> Option<&BackgroundLayer> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Background(background) => Some(background),
            _ => None,
        })
    }

    pub fn window(&self) -> Option<&WindowLayer> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Window(window) => Some(window),
            _ => None,
        })
    }

    /// URLs of every image the frame references.
    pub fn image_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self
            .layers
            .iter()
            .filter_map(|layer| match layer {
                Layer::Background(BackgroundLayer {
                    fill: Fill::Image { url },
                    ..
                })
                | Layer::Watermark(WatermarkLayer {
                    content: WatermarkContent::Image { url, .. },
                    ..
                }) => Some(url.as_str()),
                _ => None,
            })
            .collect();
        urls.dedup();
        urls
    }

    /// Whether every pixel of the base fill is opaque.
    pub fn has_opaque_background(&self) -> bool {
        self.background().is_some_and(|background| match &background.fill {
            Fill::Solid(color) => color.a == 255 && background.radius <= 0.0,
            Fill::Gradient(gradient) => {
                background.radius <= 0.0 && gradient.stops.iter().all(|stop| stop.color.a == 255)
            }
            Fill::Transparent | Fill::Image { .. } => false,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Background(BackgroundLayer),
    Pattern(PatternLayer),
    Border(BorderLayer),
    Window(WindowLayer),
    Caption(TextRun),
    Label(TextRun),
    Watermark(WatermarkLayer),
}

impl Layer {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Background(_) => "background",
            Self::Pattern(_) => "pattern",
            Self::Border(_) => "border",
            Self::Window(_) => "window",
            Self::Caption(_) => "caption",
            Self::Label(_) => "label",
            Self::Watermark(_) => "watermark",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    /// No fill; previews show a checkerboard, exports leave alpha at zero.
    Transparent,
    Solid(Color),
    Gradient(ResolvedGradient),
    /// Stretched to cover the canvas
    Image { url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundLayer {
    pub rect: Rect,
    pub radius: f32,
    pub fill: Fill,
}

/// Repeating tile overlay drawn over the base background.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternLayer {
    pub rect: Rect,
    pub radius: f32,
    pub pattern: Pattern,
    pub color: Color,
    /// Tile edge length
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorderLayer {
    pub rect: Rect,
    pub radius: f32,
    pub style: BorderStyle,
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// A single positioned line of text. `position.y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub position: Point,
    pub anchor: TextAnchor,
    pub color: Color,
    pub font_size: f32,
    pub weight: u16,
    pub italic: bool,
    /// Use the code font instead of the UI sans-serif stack
    pub monospace: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficLight {
    pub center: Point,
    pub radius: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub rect: Rect,
    pub lights: Vec<TrafficLight>,
    pub file_name: Option<TextRun>,
    pub project_name: Option<TextRun>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub kind: TokenKind,
    pub color: Color,
}

/// One visual row of code. Wrapped continuation rows have no number.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeRow {
    /// 1-based source line this row belongs to
    pub line: usize,
    pub rect: Rect,
    pub baseline: f32,
    pub text_x: f32,
    pub number: Option<TextRun>,
    pub tint: Option<Color>,
    pub spans: Vec<Span>,
}

impl CodeRow {
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowLayer {
    pub rect: Rect,
    pub radius: f32,
    pub background: Color,
    pub header: Option<Header>,
    /// Clip region for code rows
    pub body: Rect,
    pub rows: Vec<CodeRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkContent {
    Text(TextRun),
    Image { url: String, rect: Rect },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkLayer {
    pub content: WatermarkContent,
    /// Rotation pivot
    pub center: Point,
    /// Degrees clockwise
    pub rotation: f32,
    pub opacity: f32,
}
