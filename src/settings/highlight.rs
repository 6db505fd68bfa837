use serde::{Deserialize, Serialize};

use crate::theme::Color;

/// Alpha applied to opaque highlight colors so text stays legible.
const TINT_OPACITY: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightKind {
    Add,
    Remove,
    Change,
    #[default]
    Neutral,
}

impl HighlightKind {
    /// Tint used when a range carries no explicit color.
    pub fn default_tint(self, dark_theme: bool) -> Color {
        match self {
            Self::Add => Color::rgba(46, 160, 67, 64),
            Self::Remove => Color::rgba(248, 81, 73, 64),
            Self::Change => Color::rgba(210, 153, 34, 64),
            Self::Neutral if dark_theme => Color::rgba(255, 255, 255, 26),
            Self::Neutral => Color::rgba(0, 0, 0, 20),
        }
    }
}

/// An inclusive, 1-based range of source lines to tint.
///
/// Construction clamps the bounds so `1 <= start_line <= end_line`
/// always holds, whether built in code or deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawHighlightRange", rename_all = "camelCase")]
pub struct HighlightRange {
    pub id: String,
    start_line: usize,
    end_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(rename = "type")]
    pub kind: HighlightKind,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawHighlightRange {
    #[serde(default)]
    id: String,
    start_line: usize,
    end_line: usize,
    #[serde(default)]
    color: Option<Color>,
    #[serde(default, rename = "type")]
    kind: HighlightKind,
}

impl From<RawHighlightRange> for HighlightRange {
    fn from(raw: RawHighlightRange) -> Self {
        Self {
            color: raw.color,
            ..Self::new(raw.id, raw.start_line, raw.end_line, raw.kind)
        }
    }
}

impl HighlightRange {
    pub fn new(id: impl Into<String>, start_line: usize, end_line: usize, kind: HighlightKind) -> Self {
        let start_line = start_line.max(1);
        Self {
            id: id.into(),
            start_line,
            end_line: end_line.max(start_line),
            color: None,
            kind,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub const fn start_line(&self) -> usize {
        self.start_line
    }

    pub const fn end_line(&self) -> usize {
        self.end_line
    }

    pub const fn contains(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    /// The fill painted behind matching rows.
    pub fn tint(&self, dark_theme: bool) -> Color {
        match self.color {
            Some(color) if color.a == 255 => color.with_opacity(TINT_OPACITY),
            Some(color) => color,
            None => self.kind.default_tint(dark_theme),
        }
    }
}

/// First range (in list order) that covers `line`.
pub fn first_match(ranges: &[HighlightRange], line: usize) -> Option<&HighlightRange> {
    ranges.iter().find(|range| range.contains(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_bounds() {
        let range = HighlightRange::new("a", 0, 0, HighlightKind::Add);
        assert_eq!((range.start_line(), range.end_line()), (1, 1));
        let range = HighlightRange::new("b", 7, 3, HighlightKind::Add);
        assert_eq!((range.start_line(), range.end_line()), (7, 7));
    }

    #[test]
    fn test_deserialize_clamps_bounds() {
        let range: HighlightRange =
            serde_json::from_str(r#"{"startLine": 0, "endLine": 0, "type": "remove"}"#).unwrap();
        assert_eq!((range.start_line(), range.end_line()), (1, 1));
        assert_eq!(range.kind, HighlightKind::Remove);
        assert!(
            serde_json::from_str::<HighlightRange>(r#"{"startLine": 1, "endLine": 2, "colour": "red"}"#)
                .is_err()
        );
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let ranges = vec![
            HighlightRange::new("green", 2, 4, HighlightKind::Add),
            HighlightRange::new("red", 3, 5, HighlightKind::Remove),
        ];
        assert_eq!(first_match(&ranges, 3).map(|r| r.id.as_str()), Some("green"));
        assert_eq!(first_match(&ranges, 5).map(|r| r.id.as_str()), Some("red"));
        assert!(first_match(&ranges, 1).is_none());
    }

    #[test]
    fn test_tint_softens_opaque_colors() {
        let range = HighlightRange::new("x", 1, 1, HighlightKind::Neutral).with_color(Color::rgb(0, 128, 0));
        assert_eq!(range.tint(true), Color::rgba(0, 128, 0, 64));
        let range = range.with_color(Color::rgba(0, 128, 0, 10));
        assert_eq!(range.tint(true).a, 10);
    }

    #[test]
    fn test_serialize_uses_type_key() {
        let json = serde_json::to_string(&HighlightRange::new("x", 2, 3, HighlightKind::Change)).unwrap();
        assert_eq!(json, r#"{"id":"x","startLine":2,"endLine":3,"type":"change"}"#);
    }
}
