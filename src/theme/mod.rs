//! Theme registry and token color resolution.
//!
//! Themes are registered by name in an explicit [`ThemeRegistry`] that is
//! built once and passed by reference. Registration checks that every
//! [`TokenKind`] has a color, so resolution never meets an unmapped token.
//! Looking up an unregistered name is an error, never a silent default.

mod builtin;
mod color;
mod imported;

use std::collections::BTreeMap;

pub use color::{Color, ColorError};

use crate::error::ConfigurationError;
use crate::highlight::{Token, TokenKind};

/// A named palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub background: Color,
    pub foreground: Color,
    palette: BTreeMap<TokenKind, Color>,
}

impl Theme {
    pub fn new(
        name: impl Into<String>,
        background: Color,
        foreground: Color,
        palette: impl IntoIterator<Item = (TokenKind, Color)>,
    ) -> Self {
        Self {
            name: name.into(),
            background,
            foreground,
            palette: palette.into_iter().collect(),
        }
    }

    /// Color for a token kind. Registered themes cover every kind.
    pub fn color(&self, kind: TokenKind) -> Color {
        self.palette.get(&kind).copied().unwrap_or(self.foreground)
    }

    pub fn is_dark(&self) -> bool {
        self.background.is_dark()
    }

    fn missing_kind(&self) -> Option<TokenKind> {
        TokenKind::ALL
            .into_iter()
            .find(|kind| !self.palette.contains_key(kind))
    }
}

/// Immutable-after-construction lookup table of themes.
#[derive(Debug, Clone, Default)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, Theme>,
}

impl ThemeRegistry {
    /// An empty registry, for tests and custom theme sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in palettes.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for theme in builtin::themes() {
            if let Err(err) = registry.register(theme) {
                tracing::error!(%err, "skipping built-in theme");
            }
        }
        registry
    }

    /// Built-in palettes plus the themes bundled with syntect.
    ///
    /// Bundled themes whose names collide with a built-in are skipped.
    pub fn with_syntect_defaults() -> Self {
        let mut registry = Self::builtin();
        for theme in imported::syntect_themes() {
            if let Err(err) = registry.register(theme) {
                tracing::debug!(%err, "skipping bundled syntect theme");
            }
        }
        registry
    }

    /// Add a theme, validating that it colors every token kind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::IncompleteTheme`] when a kind is
    /// unmapped and [`ConfigurationError::DuplicateTheme`] when the name is
    /// taken.
    pub fn register(&mut self, mut theme: Theme) -> Result<(), ConfigurationError> {
        theme.name = normalize_name(&theme.name);
        if let Some(kind) = theme.missing_kind() {
            return Err(ConfigurationError::IncompleteTheme {
                theme: theme.name,
                kind,
            });
        }
        if self.themes.contains_key(&theme.name) {
            return Err(ConfigurationError::DuplicateTheme { name: theme.name });
        }
        self.themes.insert(theme.name.clone(), theme);
        Ok(())
    }

    /// Look up a theme by name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownTheme`] for unregistered names.
    pub fn resolve(&self, name: &str) -> Result<&Theme, ConfigurationError> {
        self.themes
            .get(&normalize_name(name))
            .ok_or_else(|| ConfigurationError::UnknownTheme {
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// Resolve a theme name against a registry.
///
/// # Errors
///
/// Returns [`ConfigurationError::UnknownTheme`] for unregistered names.
pub fn resolve_theme<'a>(
    registry: &'a ThemeRegistry,
    name: &str,
) -> Result<&'a Theme, ConfigurationError> {
    registry.resolve(name)
}

/// Color a token with a theme.
pub fn color_for(token: &Token, theme: &Theme) -> Color {
    theme.color(token.kind)
}

fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str, kinds: &[TokenKind]) -> Theme {
        Theme::new(
            name,
            Color::BLACK,
            Color::WHITE,
            kinds.iter().map(|kind| (*kind, Color::hex(0x123456))),
        )
    }

    #[test]
    fn test_builtin_themes_all_register() {
        let registry = ThemeRegistry::builtin();
        assert_eq!(registry.len(), builtin::themes().len());
        assert!(registry.resolve("dracula").is_ok());
        assert!(registry.resolve("GitHub-Light").is_ok());
    }

    #[test]
    fn test_every_registered_theme_colors_every_kind() {
        let registry = ThemeRegistry::with_syntect_defaults();
        for name in registry.names() {
            let theme = registry.resolve(name).unwrap();
            assert!(theme.missing_kind().is_none(), "{name}");
            for kind in TokenKind::ALL {
                let token = Token::new("x", kind);
                assert_eq!(color_for(&token, theme), theme.palette[&kind]);
            }
        }
    }

    #[test]
    fn test_unknown_theme_is_configuration_error() {
        let registry = ThemeRegistry::builtin();
        let err = resolve_theme(&registry, "not-a-theme").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownTheme {
                name: "not-a-theme".to_string()
            }
        );
    }

    #[test]
    fn test_register_rejects_incomplete_theme() {
        let mut registry = ThemeRegistry::new();
        let err = registry
            .register(fixture("partial", &[TokenKind::Keyword, TokenKind::String]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::IncompleteTheme {
                theme: "partial".to_string(),
                kind: TokenKind::Comment
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_fixture_without_touching_builtins() {
        let mut registry = ThemeRegistry::new();
        registry.register(fixture("Fixture", &TokenKind::ALL)).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["fixture"]);
        assert!(ThemeRegistry::builtin().resolve("fixture").is_err());
    }

    #[test]
    fn test_register_rejects_duplicate_names() {
        let mut registry = ThemeRegistry::new();
        registry.register(fixture("twin", &TokenKind::ALL)).unwrap();
        let err = registry.register(fixture("TWIN", &TokenKind::ALL)).unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateTheme { name: "twin".to_string() });
    }

    #[test]
    fn test_syntect_defaults_extend_builtins() {
        let registry = ThemeRegistry::with_syntect_defaults();
        assert!(registry.len() > ThemeRegistry::builtin().len());
        assert!(registry.resolve("base16-ocean-dark").is_ok());
        assert!(registry.resolve("inspiredgithub").is_ok());
    }
}
