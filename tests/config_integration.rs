use std::path::PathBuf;

use codeframe::config::{load_config_flags, parse_flag_tokens, ConfigFlags};
use codeframe::export::ExportFormat;

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".codeframerc");
    let content = r#"
# comment
--perf

--theme solarized-light

--format png --format=svg
--render-debug-log=render.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.perf);
    assert_eq!(flags.theme.as_deref(), Some("solarized-light"));
    assert_eq!(flags.formats, vec![ExportFormat::Png, ExportFormat::Svg]);
    assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".codeframerc");
    let content = "--perf\n--theme nord\n--scale 2\n--render-debug-log file.log\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "codeframe".to_string(),
        "--theme".to_string(),
        "dracula".to_string(),
        "--format".to_string(),
        "webp".to_string(),
        "main.rs".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.perf, "file flags should remain enabled");
    assert_eq!(effective.formats, vec![ExportFormat::Webp], "cli flags should be applied");
    assert_eq!(effective.theme.as_deref(), Some("dracula"), "cli should override theme");
    assert_eq!(effective.scale, Some(2.0));
    assert_eq!(
        effective.render_debug_log,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_local_file_overrides_global_file() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("config");
    let local = dir.path().join(".codeframerc");
    std::fs::write(&global, "--theme nord\n--asset-timeout-ms 5000\n").unwrap();
    std::fs::write(&local, "--theme one-dark\n").unwrap();

    let merged = load_config_flags(&global)
        .unwrap()
        .union(&load_config_flags(&local).unwrap());
    assert_eq!(merged.theme.as_deref(), Some("one-dark"));
    assert_eq!(merged.asset_timeout_ms, Some(5000));
}

#[test]
fn test_missing_config_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}
