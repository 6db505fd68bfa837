//! Window chrome and decorations around the code body.

use super::frame::{
    BorderLayer, Fill, Header, TextAnchor, TextRun, TrafficLight, WatermarkContent, WatermarkLayer,
};
use super::geometry::{Point, Rect, Size};
use super::metrics::TextMetrics;
use crate::settings::{Alignment, BorderStyle, RenderSettings, Side, TrafficLightStyle, WatermarkMode};
use crate::theme::{Color, Theme};

pub const HEADER_HEIGHT: f32 = 40.0;
pub const HEADER_INSET: f32 = 16.0;
pub const LIGHT_RADIUS: f32 = 6.0;
pub const LIGHT_SPACING: f32 = 20.0;
const TITLE_GAP: f32 = 12.0;

const MAC_LIGHTS: [Color; 3] = [Color::hex(0xff5f56), Color::hex(0xffbd2e), Color::hex(0x27c93f)];

/// Baseline that vertically centers text of `font_size` in a band.
pub fn centered_baseline(top: f32, height: f32, font_size: f32) -> f32 {
    top + height / 2.0 + font_size * 0.35
}

pub fn opacity(value: f32) -> f32 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 1.0 }
}

/// Text color that reads against the canvas fill.
pub fn ink_for(fill: &Fill, theme: &Theme) -> Color {
    let contrast = |color: Color| if color.is_dark() { Color::WHITE } else { Color::BLACK };
    match fill {
        Fill::Solid(color) if !color.is_transparent() => contrast(*color),
        Fill::Gradient(gradient) => gradient
            .stops
            .first()
            .map_or(theme.foreground, |stop| contrast(stop.color)),
        Fill::Image { .. } => Color::WHITE,
        Fill::Solid(_) | Fill::Transparent => theme.foreground,
    }
}

fn non_empty(text: Option<&String>) -> Option<&str> {
    text.map(|text| text.trim()).filter(|text| !text.is_empty())
}

fn lights_width(settings: &RenderSettings) -> f32 {
    if settings.traffic_lights {
        LIGHT_SPACING * 2.0 + LIGHT_RADIUS * 2.0
    } else {
        0.0
    }
}

/// Narrowest window that fits the header without overlap.
pub fn header_min_width(settings: &RenderSettings, metrics: &dyn TextMetrics) -> f32 {
    if !settings.show_header {
        return 0.0;
    }
    let size = settings.file_name_size;
    let titles: f32 = [non_empty(settings.file_name.as_ref()), non_empty(settings.project_name.as_ref())]
        .into_iter()
        .flatten()
        .map(|text| metrics.text_width(text, size) + TITLE_GAP)
        .sum();
    HEADER_INSET * 2.0 + lights_width(settings) + titles
}

/// Header chrome. Left alignment puts the lights and file name at the left
/// edge with the project name at the far right; right alignment mirrors it.
pub fn header(rect: Rect, settings: &RenderSettings, theme: &Theme) -> Header {
    let cy = rect.y + rect.height / 2.0;
    let colors = match settings.traffic_light_style {
        TrafficLightStyle::Color => MAC_LIGHTS,
        TrafficLightStyle::Mono => [theme.foreground.with_opacity(0.25); 3],
    };
    let lights_w = lights_width(settings);
    let title_offset = if settings.traffic_lights { lights_w + TITLE_GAP } else { 0.0 };

    let (lights, file_x, file_anchor, project_x, project_anchor) = match settings.header_alignment {
        Side::Left => {
            let lights = colors
                .iter()
                .enumerate()
                .map(|(i, color)| TrafficLight {
                    center: Point::new(rect.x + HEADER_INSET + LIGHT_RADIUS + i as f32 * LIGHT_SPACING, cy),
                    radius: LIGHT_RADIUS,
                    color: *color,
                })
                .collect::<Vec<_>>();
            (
                lights,
                rect.x + HEADER_INSET + title_offset,
                TextAnchor::Start,
                rect.right() - HEADER_INSET,
                TextAnchor::End,
            )
        }
        Side::Right => {
            let lights = colors
                .iter()
                .enumerate()
                .map(|(i, color)| TrafficLight {
                    center: Point::new(rect.right() - HEADER_INSET - LIGHT_RADIUS - i as f32 * LIGHT_SPACING, cy),
                    radius: LIGHT_RADIUS,
                    color: *color,
                })
                .collect::<Vec<_>>();
            (
                lights,
                rect.right() - HEADER_INSET - title_offset,
                TextAnchor::End,
                rect.x + HEADER_INSET,
                TextAnchor::Start,
            )
        }
    };

    let title_opacity = opacity(settings.file_name_opacity);
    let baseline = centered_baseline(rect.y, rect.height, settings.file_name_size);
    let file_name = non_empty(settings.file_name.as_ref()).map(|text| TextRun {
        text: text.to_string(),
        position: Point::new(file_x, baseline),
        anchor: file_anchor,
        color: theme.foreground.with_opacity(title_opacity),
        font_size: settings.file_name_size,
        weight: settings.file_name_weight,
        italic: false,
        monospace: false,
    });
    let project_name = non_empty(settings.project_name.as_ref()).map(|text| TextRun {
        text: text.to_string(),
        position: Point::new(project_x, baseline),
        anchor: project_anchor,
        color: theme.foreground.with_opacity(title_opacity * 0.7),
        font_size: settings.file_name_size,
        weight: 400,
        italic: false,
        monospace: false,
    });

    Header {
        rect,
        lights: if settings.traffic_lights { lights } else { Vec::new() },
        file_name,
        project_name,
    }
}

/// Outline around the window, grown outward by the offset.
pub fn border(window: Rect, window_radius: f32, settings: &RenderSettings, theme: &Theme) -> Option<BorderLayer> {
    let width = settings.border_width;
    if settings.border_style == BorderStyle::None || !width.is_finite() || width <= 0.0 {
        return None;
    }
    let offset = if settings.border_offset.is_finite() { settings.border_offset } else { 0.0 };
    let grow = offset + width / 2.0;
    Some(BorderLayer {
        rect: window.inflate(grow),
        radius: (window_radius + grow).max(0.0),
        style: settings.border_style,
        width,
        color: settings
            .border_color
            .unwrap_or(theme.foreground)
            .with_opacity(opacity(settings.border_opacity)),
    })
}

/// Label text centered vertically in the bottom band.
pub fn label(canvas: Size, band: f32, padding: f32, settings: &RenderSettings, ink: Color) -> Option<TextRun> {
    let text = non_empty(settings.label.as_ref())?;
    let (x, anchor) = match settings.label_alignment {
        Alignment::Left => (padding, TextAnchor::Start),
        Alignment::Center => (canvas.width / 2.0, TextAnchor::Middle),
        Alignment::Right => (canvas.width - padding, TextAnchor::End),
    };
    Some(TextRun {
        text: text.to_string(),
        position: Point::new(x, centered_baseline(canvas.height - band, band, settings.label_font_size)),
        anchor,
        color: settings.label_color.unwrap_or(ink).with_opacity(opacity(settings.label_opacity)),
        font_size: settings.label_font_size,
        weight: 400,
        italic: false,
        monospace: false,
    })
}

/// Text or image mark placed by percentage of the canvas.
pub fn watermark(canvas: Size, settings: &RenderSettings, ink: Color) -> Option<WatermarkLayer> {
    let percent = |value: f32| if value.is_finite() { value.clamp(0.0, 100.0) / 100.0 } else { 0.5 };
    let center = Point::new(
        canvas.width * percent(settings.watermark_x),
        canvas.height * percent(settings.watermark_y),
    );
    let content = match settings.watermark {
        WatermarkMode::None => return None,
        WatermarkMode::Text => {
            let text = non_empty(settings.watermark_text.as_ref())?;
            WatermarkContent::Text(TextRun {
                text: text.to_string(),
                position: Point::new(center.x, center.y + settings.watermark_font_size * 0.35),
                anchor: TextAnchor::Middle,
                color: settings.watermark_color.unwrap_or(ink),
                font_size: settings.watermark_font_size,
                weight: settings.watermark_font_weight,
                italic: false,
                monospace: false,
            })
        }
        WatermarkMode::Image => {
            let url = non_empty(settings.watermark_image_url.as_ref())?;
            let width = settings.watermark_image_width.max(1.0);
            let height = settings.watermark_image_height.max(1.0);
            WatermarkContent::Image {
                url: url.to_string(),
                rect: Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height),
            }
        }
    };
    Some(WatermarkLayer {
        content,
        center,
        rotation: if settings.watermark_rotation.is_finite() {
            settings.watermark_rotation
        } else {
            0.0
        },
        opacity: opacity(settings.watermark_opacity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeRegistry;

    fn dracula() -> Theme {
        ThemeRegistry::builtin().resolve("dracula").unwrap().clone()
    }

    #[test]
    fn test_left_header_puts_project_at_far_right() {
        let settings = RenderSettings {
            file_name: Some("main.rs".to_string()),
            project_name: Some("codeframe".to_string()),
            ..RenderSettings::default()
        };
        let header = header(Rect::new(0.0, 0.0, 400.0, HEADER_HEIGHT), &settings, &dracula());
        assert_eq!(header.lights.len(), 3);
        assert_eq!(header.lights[0].center.x, HEADER_INSET + LIGHT_RADIUS);
        let file = header.file_name.unwrap();
        let project = header.project_name.unwrap();
        assert_eq!(file.anchor, TextAnchor::Start);
        assert!(file.position.x > header.lights[2].center.x);
        assert_eq!(project.anchor, TextAnchor::End);
        assert_eq!(project.position.x, 400.0 - HEADER_INSET);
    }

    #[test]
    fn test_right_header_mirrors_left() {
        let settings = RenderSettings {
            header_alignment: Side::Right,
            file_name: Some("main.rs".to_string()),
            project_name: Some("codeframe".to_string()),
            ..RenderSettings::default()
        };
        let header = header(Rect::new(0.0, 0.0, 400.0, HEADER_HEIGHT), &settings, &dracula());
        assert_eq!(header.lights[0].center.x, 400.0 - HEADER_INSET - LIGHT_RADIUS);
        let file = header.file_name.unwrap();
        assert_eq!(file.anchor, TextAnchor::End);
        assert!(file.position.x < header.lights[2].center.x);
        assert_eq!(header.project_name.unwrap().position.x, HEADER_INSET);
    }

    #[test]
    fn test_mono_lights_share_one_color() {
        let settings = RenderSettings {
            traffic_light_style: TrafficLightStyle::Mono,
            ..RenderSettings::default()
        };
        let header = header(Rect::new(0.0, 0.0, 300.0, HEADER_HEIGHT), &settings, &dracula());
        assert!(header.lights.windows(2).all(|pair| pair[0].color == pair[1].color));
    }

    #[test]
    fn test_border_grows_by_offset() {
        let settings = RenderSettings {
            border_style: BorderStyle::Dashed,
            border_width: 2.0,
            border_offset: 4.0,
            ..RenderSettings::default()
        };
        let layer = border(Rect::new(10.0, 10.0, 100.0, 50.0), 8.0, &settings, &dracula()).unwrap();
        assert_eq!(layer.rect, Rect::new(5.0, 5.0, 110.0, 60.0));
        assert_eq!(layer.radius, 13.0);
        assert!(border(Rect::default(), 0.0, &RenderSettings::default(), &dracula()).is_none());
    }

    #[test]
    fn test_watermark_position_is_percentage_of_canvas() {
        let settings = RenderSettings {
            watermark: WatermarkMode::Image,
            watermark_image_url: Some("logo.png".to_string()),
            watermark_x: 25.0,
            watermark_y: 150.0,
            ..RenderSettings::default()
        };
        let layer = watermark(Size::new(400.0, 200.0), &settings, Color::WHITE).unwrap();
        assert_eq!(layer.center, Point::new(100.0, 200.0));
        let text_without_content = RenderSettings {
            watermark: WatermarkMode::Text,
            watermark_text: Some("   ".to_string()),
            ..RenderSettings::default()
        };
        assert!(watermark(Size::new(1.0, 1.0), &text_without_content, Color::WHITE).is_none());
    }

    #[test]
    fn test_ink_contrasts_with_fill() {
        let theme = dracula();
        assert_eq!(ink_for(&Fill::Solid(Color::WHITE), &theme), Color::BLACK);
        assert_eq!(ink_for(&Fill::Solid(Color::BLACK), &theme), Color::WHITE);
        assert_eq!(ink_for(&Fill::Transparent, &theme), theme.foreground);
    }
}
