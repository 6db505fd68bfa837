//! Frame to SVG markup.
//!
//! This serializer is the only place a frame becomes drawing commands.
//! SVG export writes its output directly and raster formats rasterize it
//! with resvg, so every format shares one layout.
//!
//! Font names are single-quoted inside double-quoted attributes; resvg
//! rejects unescaped double quotes in `font-family` values.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::layout::{
    BackgroundLayer, BorderLayer, CodeRow, Fill, Frame, Header, Layer, PatternLayer, Rect, TextAnchor,
    TextRun, WatermarkContent, WatermarkLayer, WindowLayer,
};
use crate::settings::{BorderStyle, ImageFilters, Pattern, ResolvedGradient};
use crate::theme::Color;

/// Sans-serif stack for captions, labels and header titles.
pub const UI_FONT_STACK: &str =
    "Inter, 'Segoe UI', 'Helvetica Neue', Helvetica, Arial, 'DejaVu Sans', sans-serif";

const CHECKER_CELL: f32 = 8.0;

#[derive(Debug, Clone, Copy)]
pub struct SvgOptions<'a> {
    /// CSS font-family list for code text
    pub code_font: &'a str,
    pub ui_font: &'a str,
    /// Image URL to embeddable `data:` URI; unresolved images are omitted
    pub images: &'a HashMap<String, String>,
    /// Draw a checkerboard under transparent backgrounds (previews only)
    pub checkerboard: bool,
}

/// Serialize a frame.
pub fn render_svg(frame: &Frame, options: &SvgOptions<'_>) -> String {
    let _scope = crate::perf::scope("export.svg");
    let mut svg = SvgBuilder::new(options);
    for layer in &frame.layers {
        match layer {
            Layer::Background(background) => svg.background(background),
            Layer::Pattern(pattern) => svg.pattern(pattern),
            Layer::Window(window) => svg.window(window, frame.font_size),
            Layer::Border(border) => svg.border(border),
            Layer::Caption(run) | Layer::Label(run) => svg.text_run(run),
            Layer::Watermark(watermark) => svg.watermark(watermark),
        }
    }
    svg.finish(frame)
}

struct SvgBuilder<'a> {
    options: &'a SvgOptions<'a>,
    defs: String,
    body: String,
    next_id: usize,
}

impl<'a> SvgBuilder<'a> {
    fn new(options: &'a SvgOptions<'a>) -> Self {
        Self {
            options,
            defs: String::new(),
            body: String::new(),
            next_id: 0,
        }
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn finish(self, frame: &Frame) -> String {
        let (w, h) = (num(frame.size.width), num(frame.size.height));
        let mut out = String::with_capacity(self.defs.len() + self.body.len() + 512);
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        out.push_str("<defs>");
        out.push_str(&self.defs);
        let filter = filter_chain(&frame.filters);
        if let Some(filter) = &filter {
            let _ = write!(
                out,
                r#"<filter id="frame-filter" filterUnits="userSpaceOnUse" x="0" y="0" width="{w}" height="{h}" color-interpolation-filters="sRGB">{filter}</filter>"#
            );
        }
        out.push_str("</defs>");
        if filter.is_some() {
            out.push_str(r#"<g filter="url(#frame-filter)">"#);
            out.push_str(&self.body);
            out.push_str("</g>");
        } else {
            out.push_str(&self.body);
        }
        out.push_str("</svg>");
        out
    }

    fn rounded_rect(&mut self, rect: &Rect, radius: f32, extra: &str) {
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}"{extra}/>"#,
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height),
            num(clamp_radius(rect, radius)),
        );
    }

    fn background(&mut self, layer: &BackgroundLayer) {
        match &layer.fill {
            Fill::Transparent => {
                if self.options.checkerboard {
                    let id = self.id("checker");
                    let cell = num(CHECKER_CELL);
                    let tile = num(CHECKER_CELL * 2.0);
                    let _ = write!(
                        self.defs,
                        r##"<pattern id="{id}" patternUnits="userSpaceOnUse" width="{tile}" height="{tile}"><rect width="{tile}" height="{tile}" fill="#ffffff"/><rect width="{cell}" height="{cell}" fill="#cccccc"/><rect x="{cell}" y="{cell}" width="{cell}" height="{cell}" fill="#cccccc"/></pattern>"##
                    );
                    self.rounded_rect(&layer.rect, layer.radius, &format!(r#" fill="url(#{id})""#));
                }
            }
            Fill::Solid(color) => {
                self.rounded_rect(&layer.rect, layer.radius, &paint("fill", *color));
            }
            Fill::Gradient(gradient) => {
                let id = self.id("background-gradient");
                self.defs.push_str(&linear_gradient(&id, gradient, &layer.rect));
                self.rounded_rect(&layer.rect, layer.radius, &format!(r#" fill="url(#{id})""#));
            }
            Fill::Image { url } => {
                let Some(data) = self.options.images.get(url).cloned() else {
                    return;
                };
                let clip = self.clip_path(&layer.rect, layer.radius);
                let _ = write!(
                    self.body,
                    r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid slice" clip-path="url(#{clip})" xlink:href="{}"/>"#,
                    num(layer.rect.x),
                    num(layer.rect.y),
                    num(layer.rect.width),
                    num(layer.rect.height),
                    escape(&data),
                );
            }
        }
    }

    fn clip_path(&mut self, rect: &Rect, radius: f32) -> String {
        let id = self.id("clip");
        let _ = write!(
            self.defs,
            r#"<clipPath id="{id}"><rect x="{}" y="{}" width="{}" height="{}" rx="{}"/></clipPath>"#,
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height),
            num(clamp_radius(rect, radius)),
        );
        id
    }

    fn pattern(&mut self, layer: &PatternLayer) {
        let Some(tile) = pattern_tile(layer.pattern, layer.size, layer.color) else {
            return;
        };
        let id = self.id("overlay");
        let size = num(layer.size);
        let _ = write!(
            self.defs,
            r#"<pattern id="{id}" patternUnits="userSpaceOnUse" width="{size}" height="{size}">{tile}</pattern>"#
        );
        self.rounded_rect(&layer.rect, layer.radius, &format!(r#" fill="url(#{id})""#));
    }

    fn window(&mut self, window: &WindowLayer, font_size: f32) {
        let clip = self.clip_path(&window.rect, window.radius);
        let _ = write!(self.body, r#"<g clip-path="url(#{clip})">"#);
        self.rounded_rect(&window.rect, window.radius, &paint("fill", window.background));
        if let Some(header) = &window.header {
            self.header(header);
        }
        let body_clip = self.clip_path(&window.body, 0.0);
        let _ = write!(self.body, r#"<g clip-path="url(#{body_clip})">"#);
        for row in &window.rows {
            self.code_row(row, font_size);
        }
        self.body.push_str("</g></g>");
    }

    fn header(&mut self, header: &Header) {
        for light in &header.lights {
            let _ = write!(
                self.body,
                r#"<circle cx="{}" cy="{}" r="{}"{}/>"#,
                num(light.center.x),
                num(light.center.y),
                num(light.radius),
                paint("fill", light.color),
            );
        }
        for run in header.file_name.iter().chain(header.project_name.iter()) {
            self.text_run(run);
        }
    }

    fn code_row(&mut self, row: &CodeRow, font_size: f32) {
        if let Some(tint) = row.tint {
            self.rounded_rect(&row.rect, 0.0, &paint("fill", tint));
        }
        if let Some(number) = &row.number {
            self.text_run(number);
        }
        if row.spans.iter().all(|span| span.text.is_empty()) {
            return;
        }
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" xml:space="preserve">"#,
            num(row.text_x),
            num(row.baseline),
            escape(self.options.code_font),
            num(font_size),
        );
        for span in &row.spans {
            let _ = write!(
                self.body,
                "<tspan{}>{}</tspan>",
                paint("fill", span.color),
                escape(&span.text)
            );
        }
        self.body.push_str("</text>");
    }

    fn text_run(&mut self, run: &TextRun) {
        let anchor = match run.anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };
        let family = if run.monospace { self.options.code_font } else { self.options.ui_font };
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" text-anchor="{anchor}" font-family="{}" font-size="{}" font-weight="{}"{}{} xml:space="preserve">{}</text>"#,
            num(run.position.x),
            num(run.position.y),
            escape(family),
            num(run.font_size),
            run.weight,
            if run.italic { r#" font-style="italic""# } else { "" },
            paint("fill", run.color),
            escape(&run.text),
        );
    }

    fn border(&mut self, border: &BorderLayer) {
        let stroke = paint("stroke", border.color);
        let width = border.width;
        match border.style {
            BorderStyle::None => {}
            BorderStyle::Solid => {
                let attrs = format!(r#" fill="none"{stroke} stroke-width="{}""#, num(width));
                self.rounded_rect(&border.rect, border.radius, &attrs);
            }
            BorderStyle::Dashed => {
                let attrs = format!(
                    r#" fill="none"{stroke} stroke-width="{}" stroke-dasharray="{} {}""#,
                    num(width),
                    num(width * 3.0),
                    num(width * 2.0),
                );
                self.rounded_rect(&border.rect, border.radius, &attrs);
            }
            BorderStyle::Dotted => {
                let attrs = format!(
                    r#" fill="none"{stroke} stroke-width="{}" stroke-linecap="round" stroke-dasharray="0.01 {}""#,
                    num(width),
                    num(width * 2.0),
                );
                self.rounded_rect(&border.rect, border.radius, &attrs);
            }
            BorderStyle::Double => {
                let line = width / 3.0;
                let attrs = format!(r#" fill="none"{stroke} stroke-width="{}""#, num(line));
                self.rounded_rect(&border.rect.inflate(line), border.radius + line, &attrs);
                self.rounded_rect(&border.rect.inflate(-line), (border.radius - line).max(0.0), &attrs);
            }
        }
    }

    fn watermark(&mut self, watermark: &WatermarkLayer) {
        let _ = write!(
            self.body,
            r#"<g opacity="{}" transform="rotate({} {} {})">"#,
            num(watermark.opacity),
            num(watermark.rotation),
            num(watermark.center.x),
            num(watermark.center.y),
        );
        match &watermark.content {
            WatermarkContent::Text(run) => self.text_run(run),
            WatermarkContent::Image { url, rect } => {
                if let Some(data) = self.options.images.get(url).cloned() {
                    let _ = write!(
                        self.body,
                        r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid meet" xlink:href="{}"/>"#,
                        num(rect.x),
                        num(rect.y),
                        num(rect.width),
                        num(rect.height),
                        escape(&data),
                    );
                }
            }
        }
        self.body.push_str("</g>");
    }
}

/// Compact number formatting: at most two decimals, no trailing zeros.
fn num(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

fn clamp_radius(rect: &Rect, radius: f32) -> f32 {
    radius.clamp(0.0, rect.width.min(rect.height) / 2.0)
}

/// ` fill="#rrggbb"` plus an opacity attribute when not opaque.
fn paint(attr: &str, color: Color) -> String {
    if color.a == 255 {
        format!(r#" {attr}="{}""#, color.to_rgb_hex())
    } else {
        format!(
            r#" {attr}="{}" {attr}-opacity="{}""#,
            color.to_rgb_hex(),
            num(color.opacity())
        )
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            // XML 1.0 forbids most C0 controls even as references.
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

/// CSS-angle gradient in user space across `rect`.
///
/// The gradient line passes through the center at `angle` (0 points up,
/// clockwise) and is long enough that the corners hit the end colors.
fn linear_gradient(id: &str, gradient: &ResolvedGradient, rect: &Rect) -> String {
    let radians = gradient.angle.to_radians();
    let (dx, dy) = (radians.sin(), -radians.cos());
    let half = (rect.width * dx.abs() + rect.height * dy.abs()) / 2.0;
    let center = rect.center();
    let mut out = format!(
        r#"<linearGradient id="{id}" gradientUnits="userSpaceOnUse" x1="{}" y1="{}" x2="{}" y2="{}">"#,
        num(center.x - dx * half),
        num(center.y - dy * half),
        num(center.x + dx * half),
        num(center.y + dy * half),
    );
    for stop in &gradient.stops {
        let _ = write!(
            out,
            r#"<stop offset="{}" stop-color="{}" stop-opacity="{}"/>"#,
            num(stop.offset),
            stop.color.to_rgb_hex(),
            num(stop.color.opacity()),
        );
    }
    out.push_str("</linearGradient>");
    out
}

fn pattern_tile(pattern: Pattern, size: f32, color: Color) -> Option<String> {
    let s = size;
    let stroke = format!(r#" fill="none"{} stroke-width="1""#, paint("stroke", color));
    let tile = match pattern {
        Pattern::None => return None,
        Pattern::Dots => format!(
            r#"<circle cx="{}" cy="{}" r="{}"{}/>"#,
            num(s / 2.0),
            num(s / 2.0),
            num((s * 0.08).max(0.75)),
            paint("fill", color)
        ),
        Pattern::Grid => format!(r#"<path d="M {} 0 L 0 0 0 {}"{stroke}/>"#, num(s), num(s)),
        Pattern::Lines => format!(r#"<path d="M 0 {} H {}"{stroke}/>"#, num(s / 2.0), num(s)),
        Pattern::Diagonal => format!(
            r#"<path d="M 0 {s0} L {s0} 0 M -1 1 L 1 -1 M {a} {b} L {b} {a}"{stroke}/>"#,
            s0 = num(s),
            a = num(s - 1.0),
            b = num(s + 1.0),
        ),
        Pattern::Cross => format!(
            r#"<path d="M {m} {lo} V {hi} M {lo} {m} H {hi}"{stroke}/>"#,
            m = num(s / 2.0),
            lo = num(s * 0.3),
            hi = num(s * 0.7),
        ),
    };
    Some(tile)
}

/// Filter primitives equivalent to the CSS filter functions, in the
/// order grayscale, sepia, saturate, hue-rotate, invert, brightness,
/// contrast, blur.
fn filter_chain(filters: &ImageFilters) -> Option<String> {
    if filters.is_identity() {
        return None;
    }
    let mut out = String::new();
    let unit = |v: f32| v.clamp(0.0, 1.0);

    if filters.grayscale > 0.0 {
        let _ = write!(
            out,
            r#"<feColorMatrix type="saturate" values="{}"/>"#,
            num(1.0 - unit(filters.grayscale))
        );
    }
    if filters.sepia > 0.0 {
        let k = 1.0 - unit(filters.sepia);
        let m = [
            0.393 + 0.607 * k,
            0.769 - 0.769 * k,
            0.189 - 0.189 * k,
            0.349 - 0.349 * k,
            0.686 + 0.314 * k,
            0.168 - 0.168 * k,
            0.272 - 0.272 * k,
            0.534 - 0.534 * k,
            0.131 + 0.869 * k,
        ];
        let _ = write!(
            out,
            r#"<feColorMatrix type="matrix" values="{} {} {} 0 0 {} {} {} 0 0 {} {} {} 0 0 0 0 0 1 0"/>"#,
            m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7], m[8]
        );
    }
    if (filters.saturate - 1.0).abs() > f32::EPSILON {
        let _ = write!(
            out,
            r#"<feColorMatrix type="saturate" values="{}"/>"#,
            num(filters.saturate.max(0.0))
        );
    }
    if filters.hue_rotate != 0.0 {
        let _ = write!(
            out,
            r#"<feColorMatrix type="hueRotate" values="{}"/>"#,
            num(filters.hue_rotate)
        );
    }
    if filters.invert > 0.0 {
        let i = unit(filters.invert);
        let table = format!(r#"type="table" tableValues="{} {}""#, num(i), num(1.0 - i));
        let _ = write!(
            out,
            "<feComponentTransfer><feFuncR {table}/><feFuncG {table}/><feFuncB {table}/></feComponentTransfer>"
        );
    }
    if (filters.brightness - 1.0).abs() > f32::EPSILON {
        let linear = format!(r#"type="linear" slope="{}" intercept="0""#, num(filters.brightness.max(0.0)));
        let _ = write!(
            out,
            "<feComponentTransfer><feFuncR {linear}/><feFuncG {linear}/><feFuncB {linear}/></feComponentTransfer>"
        );
    }
    if (filters.contrast - 1.0).abs() > f32::EPSILON {
        let c = filters.contrast.max(0.0);
        let linear = format!(r#"type="linear" slope="{}" intercept="{}""#, num(c), num(0.5 - 0.5 * c));
        let _ = write!(
            out,
            "<feComponentTransfer><feFuncR {linear}/><feFuncG {linear}/><feFuncB {linear}/></feComponentTransfer>"
        );
    }
    if filters.blur > 0.0 {
        let _ = write!(out, r#"<feGaussianBlur stdDeviation="{}"/>"#, num(filters.blur));
    }
    // An empty <filter> makes renderers drop the filtered group entirely.
    (!out.is_empty()).then_some(out)
}
