//! Background fills, overlay patterns and CSS linear-gradient handling.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::theme::Color;

/// Angle inserted when a gradient descriptor carries none.
pub const DEFAULT_GRADIENT_ANGLE: f32 = 180.0;

static ANGLE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(?:-?\d+(?:\.\d+)?(?:deg|grad|rad|turn)|to(?:\s+(?:top|bottom|left|right)){1,2})$")
        .expect("angle token pattern is valid")
});

static LINEAR_GRADIENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:repeating-)?linear-gradient\s*\(").expect("gradient pattern is valid")
});

/// Base fill of the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", deny_unknown_fields)]
pub enum Background {
    Transparent,
    Solid {
        color: Color,
    },
    /// A CSS `linear-gradient(...)` descriptor with an optional angle
    /// override in degrees.
    Gradient {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        angle: Option<f32>,
    },
    Image {
        url: String,
    },
}

impl Default for Background {
    fn default() -> Self {
        Self::Gradient {
            value: "linear-gradient(135deg, #667eea 0%, #764ba2 100%)".to_string(),
            angle: None,
        }
    }
}

/// Overlay drawn on top of the base background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    #[default]
    None,
    Dots,
    Grid,
    Lines,
    Diagonal,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: Color,
    /// 0..=1 along the gradient line
    pub offset: f32,
}

/// A gradient reduced to an angle and explicit stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGradient {
    /// CSS degrees: 0 points up, 90 points right
    pub angle: f32,
    pub stops: Vec<GradientStop>,
}

/// Set the angle of a linear-gradient descriptor.
///
/// With `Some(angle)` the descriptor's leading angle or `to <side>` token
/// is replaced, or one is inserted if absent. With `None` an existing
/// token is kept and a missing one becomes [`DEFAULT_GRADIENT_ANGLE`].
/// The rest of the descriptor is left byte-for-byte unchanged. Strings
/// that are not linear gradients are returned as-is.
pub fn apply_gradient_angle(descriptor: &str, angle: Option<f32>) -> String {
    let Some(open) = LINEAR_GRADIENT.find(descriptor).map(|m| m.end()) else {
        return descriptor.to_string();
    };
    let first_end = top_level_comma(descriptor, open).unwrap_or_else(|| {
        descriptor.rfind(')').filter(|&close| close >= open).unwrap_or(descriptor.len())
    });
    let first = &descriptor[open..first_end];
    let trimmed = first.trim();

    if ANGLE_TOKEN.is_match(trimmed) {
        let Some(angle) = angle else {
            return descriptor.to_string();
        };
        let start = open + (first.len() - first.trim_start().len());
        let end = start + trimmed.len();
        format!(
            "{}{}{}",
            &descriptor[..start],
            format_angle(angle),
            &descriptor[end..]
        )
    } else {
        let angle = angle.unwrap_or(DEFAULT_GRADIENT_ANGLE);
        format!(
            "{}{}, {}",
            &descriptor[..open],
            format_angle(angle),
            descriptor[open..].trim_start()
        )
    }
}

/// Parse a linear-gradient descriptor into an angle and stops.
///
/// Stops that fail to parse are dropped. Returns `None` when fewer than
/// one usable stop remains or the string is not a linear gradient.
pub fn parse_gradient(descriptor: &str) -> Option<ResolvedGradient> {
    let open = LINEAR_GRADIENT.find(descriptor)?.end();
    let close = descriptor.rfind(')').filter(|&close| close >= open)?;
    let args = split_top_level(&descriptor[open..close]);

    let mut angle = DEFAULT_GRADIENT_ANGLE;
    let mut stop_args = args.as_slice();
    if let Some(first) = args.first()
        && ANGLE_TOKEN.is_match(first)
    {
        angle = parse_angle(first)?;
        stop_args = &args[1..];
    }

    let mut stops: Vec<(Color, Option<f32>)> = Vec::new();
    for arg in stop_args {
        match parse_stop(arg) {
            Some(stop) => stops.push(stop),
            None => tracing::debug!(stop = %arg, "dropping unparseable gradient stop"),
        }
    }
    if stops.is_empty() {
        return None;
    }

    // Missing offsets are spread evenly between their neighbours.
    let last = stops.len().saturating_sub(1).max(1) as f32;
    let stops = stops
        .iter()
        .enumerate()
        .map(|(i, (color, offset))| GradientStop {
            color: *color,
            offset: offset.unwrap_or(i as f32 / last).clamp(0.0, 1.0),
        })
        .collect();

    Some(ResolvedGradient {
        angle: angle.rem_euclid(360.0),
        stops,
    })
}

fn format_angle(angle: f32) -> String {
    let normalized = if angle.is_finite() {
        angle.rem_euclid(360.0)
    } else {
        DEFAULT_GRADIENT_ANGLE
    };
    format!("{normalized}deg")
}

fn parse_angle(token: &str) -> Option<f32> {
    let lower = token.to_ascii_lowercase();
    if let Some(sides) = lower.strip_prefix("to") {
        let sides: Vec<&str> = sides.split_whitespace().collect();
        let has = |side: &str| sides.contains(&side);
        let angle = match (has("top"), has("right"), has("bottom"), has("left")) {
            (true, true, _, _) => 45.0,
            (_, true, true, _) => 135.0,
            (_, _, true, true) => 225.0,
            (true, _, _, true) => 315.0,
            (true, _, _, _) => 0.0,
            (_, true, _, _) => 90.0,
            (_, _, true, _) => 180.0,
            (_, _, _, true) => 270.0,
            _ => return None,
        };
        return Some(angle);
    }
    let split = lower.find(|c: char| c.is_ascii_alphabetic())?;
    let (value, unit) = lower.split_at(split);
    let value: f32 = value.parse().ok()?;
    let degrees = match unit {
        "deg" => value,
        "grad" => value * 0.9,
        "rad" => value.to_degrees(),
        "turn" => value * 360.0,
        _ => return None,
    };
    Some(degrees)
}

/// `#fff`, `#fff 20%`, `rgba(0, 0, 0, 0.5) 40%`
fn parse_stop(arg: &str) -> Option<(Color, Option<f32>)> {
    let arg = arg.trim();
    let (color, offset) = match arg.rfind(|c: char| c.is_whitespace()) {
        Some(split) if !arg.ends_with(')') => {
            let (color, offset) = arg.split_at(split);
            let pct: f32 = offset.trim().strip_suffix('%')?.parse().ok()?;
            (color.trim(), Some(pct / 100.0))
        }
        _ => (arg, None),
    };
    Color::parse(color).ok().map(|color| (color, offset))
}

fn top_level_comma(s: &str, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in s[from..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' if depth == 0 => return None,
            ')' => depth -= 1,
            ',' if depth == 0 => return Some(from + i),
            _ => {}
        }
    }
    None
}

fn split_top_level(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_override_replaces_existing_token() {
        assert_eq!(
            apply_gradient_angle("linear-gradient(135deg, #000 0%, #fff 100%)", Some(270.0)),
            "linear-gradient(270deg, #000 0%, #fff 100%)"
        );
        assert_eq!(
            apply_gradient_angle("linear-gradient(to right, red, blue)", Some(45.0)),
            "linear-gradient(45deg, red, blue)"
        );
    }

    #[test]
    fn test_angle_inserted_when_absent() {
        assert_eq!(
            apply_gradient_angle("linear-gradient(#000, #fff)", Some(90.0)),
            "linear-gradient(90deg, #000, #fff)"
        );
        assert_eq!(
            apply_gradient_angle("linear-gradient(rgba(0, 0, 0, 0.5), #fff)", None),
            "linear-gradient(180deg, rgba(0, 0, 0, 0.5), #fff)"
        );
    }

    #[test]
    fn test_existing_angle_kept_without_override() {
        let descriptor = "linear-gradient(to bottom right, #111, #222)";
        assert_eq!(apply_gradient_angle(descriptor, None), descriptor);
    }

    #[test]
    fn test_angle_is_normalized() {
        assert_eq!(
            apply_gradient_angle("linear-gradient(0deg, #000, #fff)", Some(-90.0)),
            "linear-gradient(270deg, #000, #fff)"
        );
        assert_eq!(
            apply_gradient_angle("linear-gradient(0deg, #000, #fff)", Some(450.0)),
            "linear-gradient(90deg, #000, #fff)"
        );
    }

    #[test]
    fn test_non_gradient_untouched() {
        assert_eq!(apply_gradient_angle("#123456", Some(90.0)), "#123456");
    }

    #[test]
    fn test_parse_gradient_stops_and_angle() {
        let gradient = parse_gradient("linear-gradient(135deg, #000 0%, rgba(255, 255, 255, 0.5) 100%)").unwrap();
        assert_eq!(gradient.angle, 135.0);
        assert_eq!(gradient.stops.len(), 2);
        assert_eq!(gradient.stops[0].color, Color::BLACK);
        assert_eq!(gradient.stops[1].offset, 1.0);
        assert_eq!(gradient.stops[1].color.a, 128);
    }

    #[test]
    fn test_parse_gradient_spreads_missing_offsets() {
        let gradient = parse_gradient("linear-gradient(to right, red, green, blue)").unwrap();
        assert_eq!(gradient.angle, 90.0);
        let offsets: Vec<f32> = gradient.stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_parse_gradient_drops_bad_stops() {
        let gradient = parse_gradient("linear-gradient(90deg, nonsense, #fff)").unwrap();
        assert_eq!(gradient.stops.len(), 1);
        assert!(parse_gradient("linear-gradient(90deg, nonsense)").is_none());
        assert!(parse_gradient("radial-gradient(#000, #fff)").is_none());
    }

    #[test]
    fn test_corner_directions() {
        assert_eq!(parse_angle("to top right"), Some(45.0));
        assert_eq!(parse_angle("to left"), Some(270.0));
        assert_eq!(parse_angle("0.5turn"), Some(180.0));
    }

    #[test]
    fn test_background_serde_tagging() {
        let bg: Background =
            serde_json::from_str(r##"{"type": "solid", "color": "#ff0000"}"##).unwrap();
        assert_eq!(bg, Background::Solid { color: Color::rgb(255, 0, 0) });
        let json = serde_json::to_string(&Background::Transparent).unwrap();
        assert_eq!(json, r#"{"type":"transparent"}"#);
        assert!(serde_json::from_str::<Background>(r#"{"type": "video"}"#).is_err());
    }
}
