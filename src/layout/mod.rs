//! Layout composition: tokens, theme and settings in, [`Frame`] out.
//!
//! Composition is synchronous and pure. The same inputs always produce an
//! equal frame, which is what makes settings bundles reproducible and
//! lets SVG and raster exports share one layout.

mod chrome;
mod frame;
mod geometry;
mod metrics;

pub use chrome::{HEADER_HEIGHT, LIGHT_RADIUS, LIGHT_SPACING};
pub use frame::{
    BackgroundLayer, BorderLayer, CodeRow, Fill, Frame, Header, Layer, PatternLayer, Span,
    TextAnchor, TextRun, TrafficLight, WatermarkContent, WatermarkLayer, WindowLayer,
};
pub use geometry::{
    MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH, Placement, Point, Rect, Size, clamp_height,
    clamp_width, resolve_height, resolve_width,
};
pub use metrics::{FontMetrics, MONOSPACE_ADVANCE, MonospaceMetrics, TextMetrics};

use crate::highlight::{Token, TokenKind};
use crate::settings::{
    Background, CaptionPosition, CaptionStyle, Dimension, HighlightRange, Pattern, RenderSettings,
    Side, apply_gradient_angle, first_match, parse_gradient,
};
use crate::theme::{Color, Theme};

pub const LINE_HEIGHT_RATIO: f32 = 1.5;
pub const CODE_PADDING: f32 = 16.0;
pub const CAPTION_GAP: f32 = 12.0;
pub const GUTTER_GAP: f32 = 16.0;
pub const TAB_WIDTH: usize = 4;
const MIN_WINDOW_WIDTH: f32 = 120.0;
const LABEL_BAND_RATIO: f32 = 2.4;
const CAPTION_LINE_RATIO: f32 = 1.4;

type Segment = (String, TokenKind);

/// One visual row before positioning.
#[derive(Debug, Clone, PartialEq)]
struct VisualRow {
    line: usize,
    continuation: bool,
    segments: Vec<Segment>,
}

/// Compose a frame.
///
/// Highlight ranges tint whole rows behind the text; the first range in
/// list order that covers a line wins. Explicit sizes are clamped, `auto`
/// sizes come from the content.
pub fn compose(
    tokens: &[Token],
    theme: &Theme,
    settings: &RenderSettings,
    highlights: &[HighlightRange],
    metrics: &dyn TextMetrics,
) -> Frame {
    let _scope = crate::perf::scope("layout.compose");

    let font_size = finite_in(settings.font_size, 14.0, 1.0, 200.0);
    let padding = finite_in(settings.padding, 32.0, 0.0, 400.0);
    let line_height = font_size * LINE_HEIGHT_RATIO;
    let lines = split_lines(tokens);

    let gutter_width = if settings.line_numbers {
        let last = settings
            .line_number_start
            .saturating_add(lines.len().saturating_sub(1));
        digits(last) as f32 * metrics.advance('0', font_size) + GUTTER_GAP
    } else {
        0.0
    };
    let natural_text_width = lines
        .iter()
        .map(|line| segments_width(line, metrics, font_size))
        .fold(0.0_f32, f32::max);

    let header_height = if settings.show_header { chrome::HEADER_HEIGHT } else { 0.0 };
    let caption = settings
        .caption
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());
    let caption_height = font_size * CAPTION_LINE_RATIO;
    let caption_width = caption.map_or(0.0, |text| metrics.text_width(text, font_size));
    let horizontal_caption = caption.is_some() && settings.caption_position.is_horizontal();
    let vertical_caption = caption.is_some() && !settings.caption_position.is_horizontal();
    let caption_side = if horizontal_caption { caption_width + CAPTION_GAP } else { 0.0 };
    let caption_stack = if vertical_caption { caption_height + CAPTION_GAP } else { 0.0 };
    let label_band = if settings.label.as_deref().is_some_and(|text| !text.trim().is_empty()) {
        settings.label_font_size * LABEL_BAND_RATIO
    } else {
        0.0
    };

    // Width
    let intrinsic_window_width = (CODE_PADDING * 2.0 + gutter_width + natural_text_width)
        .max(chrome::header_min_width(settings, metrics))
        .max(MIN_WINDOW_WIDTH);
    let intrinsic_block_width = if vertical_caption {
        intrinsic_window_width.max(caption_width)
    } else {
        intrinsic_window_width + caption_side
    };
    let canvas_width = resolve_width(settings.width, intrinsic_block_width + padding * 2.0);
    let window_width = match settings.width {
        Dimension::Auto => intrinsic_window_width,
        Dimension::Fixed(_) => (canvas_width - padding * 2.0 - caption_side).max(CODE_PADDING * 2.0),
    };

    // Rows
    let wrap_width = match settings.width {
        Dimension::Fixed(_) if settings.word_wrap => {
            Some(window_width - CODE_PADDING * 2.0 - gutter_width)
        }
        _ => None,
    };
    let rows = visual_rows(lines, wrap_width, metrics, font_size);

    // Height
    let intrinsic_window_height = header_height + rows.len() as f32 * line_height + CODE_PADDING * 2.0;
    let intrinsic_block_height = if horizontal_caption {
        intrinsic_window_height.max(caption_height)
    } else {
        intrinsic_window_height + caption_stack
    };
    let canvas_height = resolve_height(
        settings.height,
        intrinsic_block_height + padding * 2.0 + label_band,
    );
    let window_height = match settings.height {
        Dimension::Auto => intrinsic_window_height,
        Dimension::Fixed(_) => (canvas_height - padding * 2.0 - caption_stack - label_band).max(header_height),
    };

    let canvas = Size::new(canvas_width, canvas_height);
    let content_area = Rect::new(0.0, 0.0, canvas_width, canvas_height - label_band);
    let (window_rect, caption_run) = place_window(
        content_area,
        Size::new(window_width, window_height),
        caption.map(|text| (text, caption_width, caption_height)),
        settings,
        font_size,
    );

    // Background
    let frame_radius = finite_in(settings.effective_frame_radius(), 0.0, 0.0, 400.0);
    let fill = background_fill(&settings.background, theme);
    let ink = chrome::ink_for(&fill, theme);
    let mut layers = vec![Layer::Background(BackgroundLayer {
        rect: Rect::from_size(canvas),
        radius: frame_radius,
        fill,
    })];
    if settings.pattern != Pattern::None {
        layers.push(Layer::Pattern(PatternLayer {
            rect: Rect::from_size(canvas),
            radius: frame_radius,
            pattern: settings.pattern,
            color: settings
                .pattern_color
                .unwrap_or(ink)
                .with_opacity(chrome::opacity(settings.pattern_opacity)),
            size: finite_in(settings.pattern_size, 16.0, 2.0, 400.0),
        }));
    }

    // Window
    let code_radius = finite_in(settings.effective_code_radius(), 0.0, 0.0, 400.0);
    let header = settings.show_header.then(|| {
        chrome::header(
            Rect::new(window_rect.x, window_rect.y, window_rect.width, header_height),
            settings,
            theme,
        )
    });
    let body = Rect::new(
        window_rect.x,
        window_rect.y + header_height,
        window_rect.width,
        (window_rect.height - header_height).max(0.0),
    );
    let code_rows = position_rows(
        &rows,
        RowGeometry {
            body,
            font_size,
            line_height,
            gutter_width,
        },
        theme,
        settings,
        highlights,
    );
    layers.push(Layer::Window(WindowLayer {
        rect: window_rect,
        radius: code_radius,
        background: theme.background,
        header,
        body,
        rows: code_rows,
    }));

    if let Some(border) = chrome::border(window_rect, code_radius, settings, theme) {
        layers.push(Layer::Border(border));
    }
    if let Some(mut run) = caption_run {
        run.color = ink.with_opacity(chrome::opacity(settings.caption_opacity));
        layers.push(Layer::Caption(run));
    }
    if let Some(label) = chrome::label(canvas, label_band, padding, settings, ink) {
        layers.push(Layer::Label(label));
    }
    if let Some(watermark) = chrome::watermark(canvas, settings, ink) {
        layers.push(Layer::Watermark(watermark));
    }

    tracing::debug!(
        width = canvas.width,
        height = canvas.height,
        rows = rows.len(),
        layers = layers.len(),
        "composed frame"
    );

    Frame {
        size: canvas,
        font_family: settings.font_family.clone(),
        font_size,
        line_height,
        layers,
        filters: settings.filters.sanitized(),
    }
}

fn finite_in(value: f32, fallback: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() { value.clamp(min, max) } else { fallback }
}

fn digits(mut n: usize) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

fn background_fill(background: &Background, theme: &Theme) -> Fill {
    match background {
        Background::Transparent => Fill::Transparent,
        Background::Solid { color } => Fill::Solid(*color),
        Background::Gradient { value, angle } => {
            let descriptor = apply_gradient_angle(value, *angle);
            parse_gradient(&descriptor).map_or_else(
                || {
                    tracing::debug!(%descriptor, "unusable gradient, using theme background");
                    Fill::Solid(theme.background)
                },
                Fill::Gradient,
            )
        }
        Background::Image { url } if url.trim().is_empty() => Fill::Solid(theme.background),
        Background::Image { url } => Fill::Image { url: url.trim().to_string() },
    }
}

/// Center the window (and caption) in the content area. Top and left
/// captions are placed before the window, bottom and right after it.
fn place_window(
    area: Rect,
    window: Size,
    caption: Option<(&str, f32, f32)>,
    settings: &RenderSettings,
    font_size: f32,
) -> (Rect, Option<TextRun>) {
    let Some((text, caption_width, caption_height)) = caption else {
        let origin = centered(area, window);
        return (Rect::new(origin.x, origin.y, window.width, window.height), None);
    };

    let position = settings.caption_position;
    let block = if position.is_horizontal() {
        Size::new(
            window.width + caption_width + CAPTION_GAP,
            window.height.max(caption_height),
        )
    } else {
        Size::new(
            window.width.max(caption_width),
            window.height + caption_height + CAPTION_GAP,
        )
    };
    let origin = centered(area, block);

    let (window_rect, caption_x, caption_top, anchor) = match position {
        CaptionPosition::Top | CaptionPosition::Bottom => {
            let window_x = origin.x + (block.width - window.width) / 2.0;
            let (window_y, caption_top) = if position.precedes_window() {
                (origin.y + caption_height + CAPTION_GAP, origin.y)
            } else {
                (origin.y, origin.y + window.height + CAPTION_GAP)
            };
            (
                Rect::new(window_x, window_y, window.width, window.height),
                origin.x + block.width / 2.0,
                caption_top,
                TextAnchor::Middle,
            )
        }
        CaptionPosition::Left | CaptionPosition::Right => {
            let window_y = origin.y + (block.height - window.height) / 2.0;
            let caption_top = origin.y + (block.height - caption_height) / 2.0;
            if position.precedes_window() {
                (
                    Rect::new(origin.x + caption_width + CAPTION_GAP, window_y, window.width, window.height),
                    origin.x,
                    caption_top,
                    TextAnchor::Start,
                )
            } else {
                (
                    Rect::new(origin.x, window_y, window.width, window.height),
                    origin.x + window.width + CAPTION_GAP,
                    caption_top,
                    TextAnchor::Start,
                )
            }
        }
    };

    let run = TextRun {
        text: text.to_string(),
        position: Point::new(caption_x, chrome::centered_baseline(caption_top, caption_height, font_size)),
        anchor,
        color: Color::WHITE,
        font_size,
        weight: if settings.caption_style == CaptionStyle::Bold { 700 } else { 400 },
        italic: settings.caption_style == CaptionStyle::Italic,
        monospace: false,
    };
    (window_rect, Some(run))
}

fn centered(area: Rect, size: Size) -> Point {
    let center = area.center();
    Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0)
}

/// Split the token stream into source lines, expanding tabs and dropping
/// carriage returns. A trailing newline does not produce an extra row.
fn split_lines(tokens: &[Token]) -> Vec<Vec<Segment>> {
    let mut lines: Vec<Vec<Segment>> = vec![Vec::new()];
    let mut column = 0usize;
    for token in tokens {
        for (i, piece) in token.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Vec::new());
                column = 0;
            }
            let mut text = String::with_capacity(piece.len());
            for ch in piece.chars() {
                match ch {
                    '\r' => {}
                    '\t' => {
                        let spaces = TAB_WIDTH - column % TAB_WIDTH;
                        text.extend(std::iter::repeat_n(' ', spaces));
                        column += spaces;
                    }
                    _ => {
                        text.push(ch);
                        column += unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
                    }
                }
            }
            if let Some(line) = lines.last_mut()
                && !text.is_empty()
            {
                push_segment(line, text, token.kind);
            }
        }
    }
    if lines.len() > 1 && lines.last().is_some_and(Vec::is_empty) {
        lines.pop();
    }
    lines
}

fn push_segment(segments: &mut Vec<Segment>, text: String, kind: TokenKind) {
    match segments.last_mut() {
        Some((last, last_kind)) if *last_kind == kind => last.push_str(&text),
        _ => segments.push((text, kind)),
    }
}

fn segments_width(segments: &[Segment], metrics: &dyn TextMetrics, font_size: f32) -> f32 {
    segments
        .iter()
        .map(|(text, _)| metrics.text_width(text, font_size))
        .sum()
}

fn visual_rows(
    lines: Vec<Vec<Segment>>,
    wrap_width: Option<f32>,
    metrics: &dyn TextMetrics,
    font_size: f32,
) -> Vec<VisualRow> {
    let mut rows = Vec::with_capacity(lines.len());
    for (index, line) in lines.into_iter().enumerate() {
        let pieces = match wrap_width {
            Some(width) if width > 0.0 => wrap_segments(&line, width, metrics, font_size),
            _ => vec![line],
        };
        for (piece_index, segments) in pieces.into_iter().enumerate() {
            rows.push(VisualRow {
                line: index + 1,
                continuation: piece_index > 0,
                segments,
            });
        }
    }
    rows
}

/// Break one line into rows no wider than `max_width`, preferring to break
/// after whitespace. A single character wider than the row still gets a
/// row of its own.
fn wrap_segments(
    line: &[Segment],
    max_width: f32,
    metrics: &dyn TextMetrics,
    font_size: f32,
) -> Vec<Vec<Segment>> {
    let chars: Vec<(char, TokenKind)> = line
        .iter()
        .flat_map(|(text, kind)| text.chars().map(move |ch| (ch, *kind)))
        .collect();
    let advance = |i: usize| metrics.advance(chars[i].0, font_size);

    let mut rows = Vec::new();
    let mut start = 0;
    let mut width = 0.0;
    let mut last_space: Option<usize> = None;
    let mut i = 0;
    while i < chars.len() {
        let step = advance(i);
        if width + step > max_width && i > start {
            let cut = last_space.map_or(i, |space| space + 1);
            rows.push(merge_chars(&chars[start..cut]));
            start = cut;
            width = (start..i).map(advance).sum();
            last_space = None;
            continue;
        }
        if chars[i].0.is_whitespace() {
            last_space = Some(i);
        }
        width += step;
        i += 1;
    }
    rows.push(merge_chars(&chars[start..]));
    rows
}

fn merge_chars(chars: &[(char, TokenKind)]) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (ch, kind) in chars {
        push_segment(&mut segments, ch.to_string(), *kind);
    }
    segments
}

struct RowGeometry {
    body: Rect,
    font_size: f32,
    line_height: f32,
    gutter_width: f32,
}

fn position_rows(
    rows: &[VisualRow],
    geometry: RowGeometry,
    theme: &Theme,
    settings: &RenderSettings,
    highlights: &[HighlightRange],
) -> Vec<CodeRow> {
    let RowGeometry {
        body,
        font_size,
        line_height,
        gutter_width,
    } = geometry;
    let dark = theme.is_dark();
    let number_color = theme.foreground.with_opacity(chrome::opacity(settings.line_number_opacity));
    let text_x = body.x + CODE_PADDING + gutter_width;

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let top = body.y + CODE_PADDING + index as f32 * line_height;
            let baseline = chrome::centered_baseline(top, line_height, font_size);
            let number = (settings.line_numbers && !row.continuation).then(|| {
                let (x, anchor) = match settings.line_number_alignment {
                    Side::Left => (body.x + CODE_PADDING, TextAnchor::Start),
                    Side::Right => (text_x - GUTTER_GAP, TextAnchor::End),
                };
                TextRun {
                    text: settings
                        .line_number_start
                        .saturating_add(row.line.saturating_sub(1))
                        .to_string(),
                    position: Point::new(x, baseline),
                    anchor,
                    color: number_color,
                    font_size,
                    weight: 400,
                    italic: false,
                    monospace: true,
                }
            });
            CodeRow {
                line: row.line,
                rect: Rect::new(body.x, top, body.width, line_height),
                baseline,
                text_x,
                number,
                tint: tint_for(highlights, row.line, dark),
                spans: row
                    .segments
                    .iter()
                    .map(|(text, kind)| Span {
                        text: text.clone(),
                        kind: *kind,
                        color: theme.color(*kind),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Tint of the first range covering `line`. Ranges clamp their bounds on
/// construction, so an inverted range never reaches this point.
fn tint_for(highlights: &[HighlightRange], line: usize, dark: bool) -> Option<Color> {
    first_match(highlights, line).map(|range| range.tint(dark))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{LanguageTag, tokenize};
    use crate::settings::{HighlightKind, WatermarkMode};
    use crate::theme::ThemeRegistry;
    use proptest::prelude::*;

    fn theme() -> Theme {
        ThemeRegistry::builtin().resolve("dracula").unwrap().clone()
    }

    fn compose_code(code: &str, settings: &RenderSettings) -> Frame {
        let tokens = tokenize(code, &LanguageTag::new("rust"));
        compose(&tokens, &theme(), settings, &settings.highlights, &MonospaceMetrics::default())
    }

    #[test]
    fn test_auto_size_derives_from_content() {
        let settings = RenderSettings::default();
        let short = compose_code("let a = 1;", &settings);
        let long = compose_code(&"let a = 1;\n".repeat(10), &settings);
        assert_eq!(short.size.width, long.size.width);
        assert!(long.size.height > short.size.height);
        let window = short.window().unwrap();
        assert!((window.rect.x - settings.padding).abs() < 1e-3);
        assert!((window.rect.y - settings.padding).abs() < 1e-3);
    }

    #[test]
    fn test_explicit_size_is_clamped() {
        let settings = RenderSettings {
            width: Dimension::Fixed(10_000),
            height: Dimension::Fixed(20),
            ..RenderSettings::default()
        };
        let frame = compose_code("fn main() {}", &settings);
        assert_eq!(frame.size, Size::new(MAX_WIDTH, MIN_HEIGHT));
    }

    #[test]
    fn test_trailing_newline_adds_no_row() {
        let frame = compose_code("a\nb\n", &RenderSettings::default());
        assert_eq!(frame.window().unwrap().rows.len(), 2);
        let frame = compose_code("", &RenderSettings::default());
        assert_eq!(frame.window().unwrap().rows.len(), 1);
    }

    #[test]
    fn test_huge_line_number_start_saturates() {
        let settings = RenderSettings {
            line_numbers: true,
            line_number_start: usize::MAX,
            ..RenderSettings::default()
        };
        let frame = compose_code("a\nb", &settings);
        let rows = &frame.window().unwrap().rows;
        let numbers: Vec<_> = rows
            .iter()
            .map(|row| row.number.as_ref().unwrap().text.clone())
            .collect();
        assert_eq!(numbers, vec![usize::MAX.to_string(), usize::MAX.to_string()]);
    }

    #[test]
    fn test_out_of_range_filters_are_clamped_into_the_frame() {
        let settings = RenderSettings {
            filters: crate::settings::ImageFilters {
                grayscale: -1.0,
                ..crate::settings::ImageFilters::default()
            },
            ..RenderSettings::default()
        };
        let frame = compose_code("x", &settings);
        assert!(frame.filters.is_identity());
    }

    #[test]
    fn test_tabs_expand_to_next_stop() {
        let lines = split_lines(&[Token::new("a\tb\n\tc", TokenKind::Plain)]);
        assert_eq!(lines[0], vec![("a   b".to_string(), TokenKind::Plain)]);
        assert_eq!(lines[1], vec![("    c".to_string(), TokenKind::Plain)]);
    }

    #[test]
    fn test_overlapping_highlights_first_wins() {
        let settings = RenderSettings {
            highlights: vec![
                HighlightRange::new("green", 2, 4, HighlightKind::Neutral).with_color(Color::parse("green").unwrap()),
                HighlightRange::new("red", 3, 5, HighlightKind::Neutral).with_color(Color::parse("red").unwrap()),
            ],
            ..RenderSettings::default()
        };
        let frame = compose_code("1\n2\n3\n4\n5\n6", &settings);
        let rows = &frame.window().unwrap().rows;
        let green = Color::parse("green").unwrap().with_opacity(0.25);
        let red = Color::parse("red").unwrap().with_opacity(0.25);
        assert_eq!(rows[0].tint, None);
        assert_eq!(rows[2].tint, Some(green));
        assert_eq!(rows[3].tint, Some(green));
        assert_eq!(rows[4].tint, Some(red));
        assert_eq!(rows[5].tint, None);
    }

    #[test]
    fn test_highlight_keeps_token_colors() {
        let plain = compose_code("let x = 1;", &RenderSettings::default());
        let tinted = compose_code(
            "let x = 1;",
            &RenderSettings {
                highlights: vec![HighlightRange::new("h", 1, 1, HighlightKind::Add)],
                ..RenderSettings::default()
            },
        );
        let plain_row = &plain.window().unwrap().rows[0];
        let tinted_row = &tinted.window().unwrap().rows[0];
        assert_eq!(plain_row.spans, tinted_row.spans);
        assert!(tinted_row.tint.is_some());
    }

    #[test]
    fn test_word_wrap_needs_explicit_width() {
        let code = "let value = some_function(argument_one, argument_two, argument_three);";
        let auto = compose_code(
            code,
            &RenderSettings {
                word_wrap: true,
                ..RenderSettings::default()
            },
        );
        assert_eq!(auto.window().unwrap().rows.len(), 1);

        let fixed = compose_code(
            code,
            &RenderSettings {
                word_wrap: true,
                line_numbers: true,
                width: Dimension::Fixed(300),
                ..RenderSettings::default()
            },
        );
        let rows = &fixed.window().unwrap().rows;
        assert!(rows.len() > 1);
        assert!(rows[0].number.is_some());
        assert!(rows[1..].iter().all(|row| row.number.is_none() && row.line == 1));
        let text: String = rows.iter().map(CodeRow::text).collect();
        assert_eq!(text, code);
    }

    #[test]
    fn test_caption_stacking_order() {
        let top = compose_code(
            "x",
            &RenderSettings {
                caption: Some("caption".to_string()),
                caption_position: CaptionPosition::Top,
                ..RenderSettings::default()
            },
        );
        let names: Vec<_> = top.layers.iter().map(Layer::name).collect();
        assert!(names.contains(&"caption"));
        let caption_y = top
            .layers
            .iter()
            .find_map(|layer| match layer {
                Layer::Caption(run) => Some(run.position.y),
                _ => None,
            })
            .unwrap();
        assert!(caption_y < top.window().unwrap().rect.y);

        let right = compose_code(
            "x",
            &RenderSettings {
                caption: Some("caption".to_string()),
                caption_position: CaptionPosition::Right,
                ..RenderSettings::default()
            },
        );
        let caption_x = right
            .layers
            .iter()
            .find_map(|layer| match layer {
                Layer::Caption(run) => Some(run.position.x),
                _ => None,
            })
            .unwrap();
        assert!(caption_x > right.window().unwrap().rect.right());
    }

    #[test]
    fn test_gradient_angle_is_applied() {
        let settings = RenderSettings {
            background: Background::Gradient {
                value: "linear-gradient(135deg, #000 0%, #fff 100%)".to_string(),
                angle: Some(270.0),
            },
            ..RenderSettings::default()
        };
        let frame = compose_code("x", &settings);
        match &frame.background().unwrap().fill {
            Fill::Gradient(gradient) => assert_eq!(gradient.angle, 270.0),
            other => panic!("unexpected fill {other:?}"),
        }
    }

    #[test]
    fn test_pattern_overlays_base_background() {
        let frame = compose_code(
            "x",
            &RenderSettings {
                pattern: Pattern::Dots,
                watermark: WatermarkMode::Text,
                watermark_text: Some("wm".to_string()),
                ..RenderSettings::default()
            },
        );
        let names: Vec<_> = frame.layers.iter().map(Layer::name).collect();
        assert_eq!(names, vec!["background", "pattern", "window", "watermark"]);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let settings = RenderSettings {
            line_numbers: true,
            caption: Some("hi".to_string()),
            label: Some("label".to_string()),
            ..RenderSettings::default()
        };
        assert_eq!(compose_code("fn a() {}\n", &settings), compose_code("fn a() {}\n", &settings));
    }

    proptest! {
        #[test]
        fn explicit_sizes_always_within_bounds(w in 1u32..5000, h in 1u32..5000, lines in 0usize..60) {
            let settings = RenderSettings {
                width: Dimension::Fixed(w),
                height: Dimension::Fixed(h),
                ..RenderSettings::default()
            };
            let frame = compose_code(&"let x = 1;\n".repeat(lines), &settings);
            prop_assert!((MIN_WIDTH..=MAX_WIDTH).contains(&frame.size.width));
            prop_assert!((MIN_HEIGHT..=MAX_HEIGHT).contains(&frame.size.height));
        }

        #[test]
        fn wrapping_preserves_text(text in "[a-z ]{0,120}", width in 10.0f32..400.0) {
            let metrics = MonospaceMetrics::default();
            let line = vec![(text.clone(), TokenKind::Plain)];
            let rows = wrap_segments(&line, width, &metrics, 14.0);
            let joined: String = rows.iter().flatten().map(|(t, _)| t.as_str()).collect();
            prop_assert_eq!(joined, text);
            for row in &rows {
                let chars: usize = row.iter().map(|(t, _)| t.chars().count()).sum();
                prop_assert!(chars <= 1 || segments_width(row, &metrics, 14.0) <= width + 1e-3);
            }
        }
    }
}
