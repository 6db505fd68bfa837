//! Saved command line defaults.
//!
//! Defaults live in a global file and an optional `.codeframerc` in the
//! working directory. Both hold plain flag tokens, one or more per line;
//! command line flags win over the local file, which wins over the global.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::export::ExportFormat;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFlags {
    pub theme: Option<String>,
    pub formats: Vec<ExportFormat>,
    pub scale: Option<f32>,
    pub asset_timeout_ms: Option<u64>,
    pub perf: bool,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: options from `other` win, switches add up.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            theme: other.theme.clone().or_else(|| self.theme.clone()),
            formats: if other.formats.is_empty() {
                self.formats.clone()
            } else {
                other.formats.clone()
            },
            scale: other.scale.or(self.scale),
            asset_timeout_ms: other.asset_timeout_ms.or(self.asset_timeout_ms),
            perf: self.perf || other.perf,
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("codeframe").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("codeframe")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("codeframe").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("codeframe").join("config");
        }
    }

    PathBuf::from(".codeframerc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".codeframerc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# codeframe defaults (saved with --save)".to_string()];
    if let Some(theme) = &flags.theme {
        lines.push(format!("--theme {theme}"));
    }
    for format in &flags.formats {
        lines.push(format!("--format {format}"));
    }
    if let Some(scale) = flags.scale {
        lines.push(format!("--scale {scale}"));
    }
    if let Some(ms) = flags.asset_timeout_ms {
        lines.push(format!("--asset-timeout-ms {ms}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the flags this module persists out of an argument list. Unknown
/// tokens and unparsable values are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        if name == "--perf" {
            flags.perf = true;
            i += 1;
            continue;
        }
        if !matches!(
            name,
            "--theme" | "--format" | "--scale" | "--asset-timeout-ms" | "--render-debug-log"
        ) {
            i += 1;
            continue;
        }
        let value = match inline {
            Some(value) => Some(value),
            None => {
                i += 1;
                tokens.get(i).map(String::as_str)
            }
        };
        if let Some(value) = value {
            apply_flag(&mut flags, name, value);
        }
        i += 1;
    }
    flags
}

fn apply_flag(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--theme" => flags.theme = Some(value.to_string()),
        "--format" => {
            if let Ok(format) = value.parse() {
                flags.formats.push(format);
            }
        }
        "--scale" => flags.scale = value.parse().ok().or(flags.scale),
        "--asset-timeout-ms" => flags.asset_timeout_ms = value.parse().ok().or(flags.asset_timeout_ms),
        "--render-debug-log" => flags.render_debug_log = Some(PathBuf::from(value)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "codeframe",
            "--theme",
            "nord",
            "--format=webp",
            "--format",
            "jpg",
            "--scale",
            "2",
            "--asset-timeout-ms=500",
            "--render-debug-log=render.log",
            "--perf",
            "main.rs",
        ]));
        assert_eq!(flags.theme.as_deref(), Some("nord"));
        assert_eq!(flags.formats, vec![ExportFormat::Webp, ExportFormat::Jpeg]);
        assert_eq!(flags.scale, Some(2.0));
        assert_eq!(flags.asset_timeout_ms, Some(500));
        assert!(flags.perf);
        assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
    }

    #[test]
    fn test_parse_flag_tokens_skips_bad_values() {
        let flags = parse_flag_tokens(&tokens(&["--format", "tiff", "--scale", "big", "--width", "400"]));
        assert!(flags.formats.is_empty());
        assert_eq!(flags.scale, None);
    }

    #[test]
    fn test_trailing_flag_without_value_is_ignored() {
        let flags = parse_flag_tokens(&tokens(&["--perf", "--theme"]));
        assert!(flags.perf);
        assert_eq!(flags.theme, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            perf: true,
            theme: Some("nord".to_string()),
            formats: vec![ExportFormat::Png],
            scale: Some(2.0),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            theme: Some("dracula".to_string()),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.perf);
        assert_eq!(merged.theme.as_deref(), Some("dracula"));
        assert_eq!(merged.formats, vec![ExportFormat::Png]);
        assert_eq!(merged.scale, Some(2.0));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".codeframerc");
        let flags = ConfigFlags {
            theme: Some("github-light".to_string()),
            formats: vec![ExportFormat::Svg, ExportFormat::Avif],
            scale: Some(1.5),
            asset_timeout_ms: Some(1200),
            perf: true,
            render_debug_log: Some(PathBuf::from("render.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
