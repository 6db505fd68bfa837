//! Themes converted from syntect's bundled `.tmTheme` set.

use syntect::highlighting::{Highlighter, ThemeSet};
use syntect::parsing::Scope;

use super::{Color, Theme};
use crate::highlight::TokenKind;

/// Scope used to sample each token kind's color.
const KIND_SCOPES: [(TokenKind, &str); 7] = [
    (TokenKind::Keyword, "keyword.control"),
    (TokenKind::String, "string.quoted"),
    (TokenKind::Comment, "comment.line"),
    (TokenKind::Number, "constant.numeric"),
    (TokenKind::Identifier, "entity.name.function"),
    (TokenKind::Punctuation, "punctuation.separator"),
    (TokenKind::Plain, "source"),
];

pub(super) fn syntect_themes() -> Vec<Theme> {
    let _scope = crate::perf::scope("theme.syntect.load_defaults");
    let set = ThemeSet::load_defaults();
    set.themes
        .iter()
        .map(|(name, theme)| convert(&slug(name), theme))
        .collect()
}

fn convert(name: &str, theme: &syntect::highlighting::Theme) -> Theme {
    let highlighter = Highlighter::new(theme);
    let foreground = theme.settings.foreground.map_or(Color::WHITE, from_syntect);
    let background = theme.settings.background.map_or(Color::BLACK, from_syntect);
    let root = Scope::new("source").ok();

    let palette = KIND_SCOPES.iter().map(|(kind, scope)| {
        let stack: Vec<Scope> = root
            .into_iter()
            .chain(Scope::new(scope).ok())
            .collect();
        let color = from_syntect(highlighter.style_for_stack(&stack).foreground);
        (*kind, color)
    });

    Theme::new(name, background, foreground, palette)
}

const fn from_syntect(color: syntect::highlighting::Color) -> Color {
    Color::rgba(color.r, color.g, color.b, color.a)
}

/// `Solarized (dark)` -> `solarized-dark`, `base16-ocean.dark` -> `base16-ocean-dark`.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}
