//! Canvas geometry: sizes, rectangles, dimension clamps and placement.

use crate::settings::Dimension;

pub const MIN_WIDTH: f32 = 200.0;
pub const MAX_WIDTH: f32 = 800.0;
pub const MIN_HEIGHT: f32 = 100.0;
pub const MAX_HEIGHT: f32 = 800.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grow (or shrink, for negative `amount`) on every side.
    #[must_use]
    pub fn inflate(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            (self.width + amount * 2.0).max(0.0),
            (self.height + amount * 2.0).max(0.0),
        )
    }
}

/// Explicit width in pixels, clamped to the supported range.
pub fn clamp_width(px: u32) -> f32 {
    (px as f32).clamp(MIN_WIDTH, MAX_WIDTH)
}

/// Explicit height in pixels, clamped to the supported range.
pub fn clamp_height(px: u32) -> f32 {
    (px as f32).clamp(MIN_HEIGHT, MAX_HEIGHT)
}

/// Resolve a width setting against the intrinsic content width.
pub fn resolve_width(dimension: Dimension, intrinsic: f32) -> f32 {
    match dimension {
        Dimension::Auto => intrinsic,
        Dimension::Fixed(px) => clamp_width(px),
    }
}

/// Resolve a height setting against the intrinsic content height.
pub fn resolve_height(dimension: Dimension, intrinsic: f32) -> f32 {
    match dimension {
        Dimension::Auto => intrinsic,
        Dimension::Fixed(px) => clamp_height(px),
    }
}

/// Position of a frame inside a viewport.
///
/// The frame is always centered: every committed resize recomputes the
/// origin from the viewport center, so the position never drifts.
///
/// ```
/// use codeframe::layout::{Placement, Size};
///
/// let mut placement = Placement::new(Size::new(1000.0, 800.0), Size::new(400.0, 200.0));
/// placement.commit_resize(Size::new(600.0, 300.0));
/// assert_eq!(placement.center(), placement.viewport_center());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    viewport: Size,
    frame: Rect,
}

impl Placement {
    pub fn new(viewport: Size, frame: Size) -> Self {
        let mut placement = Self {
            viewport,
            frame: Rect::default(),
        };
        placement.commit_resize(frame);
        placement
    }

    pub const fn frame(&self) -> Rect {
        self.frame
    }

    pub fn center(&self) -> Point {
        self.frame.center()
    }

    pub fn viewport_center(&self) -> Point {
        Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0)
    }

    /// Apply a new frame size and recenter it.
    pub fn commit_resize(&mut self, size: Size) {
        let center = self.viewport_center();
        self.frame = Rect::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        );
    }

    /// The viewport itself changed size; keep the frame centered in it.
    pub fn resize_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.commit_resize(Size::new(self.frame.width, self.frame.height));
    }
}
