//! Codeframe - render source code as presentation-quality images.
//!
//! # Usage
//!
//! ```bash
//! codeframe src/main.rs
//! codeframe --theme nord --format png --format svg --scale 2 src/main.rs
//! cat snippet.py | codeframe --language python -o snippet.webp -
//! codeframe --bundle shared.json --format jpeg
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use codeframe::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use codeframe::export::{ExportFormat, Exporter, ExporterConfig};
use codeframe::highlight::{LanguageTag, SourceDocument, languages};
use codeframe::layout::{MonospaceMetrics, TextMetrics};
use codeframe::settings::{Bundle, Dimension, RenderSettings};
use codeframe::theme::ThemeRegistry;
use codeframe::{perf, render_frame};

/// Render source code as an image
#[derive(Parser, Debug)]
#[command(name = "codeframe", version, about, long_about = None)]
struct Cli {
    /// Source file to render, or `-` for stdin
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Language tag (defaults to the file extension)
    #[arg(short, long)]
    language: Option<String>,

    /// Theme name (see --list-themes)
    #[arg(short, long)]
    theme: Option<String>,

    /// Render settings file (JSON5)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Render a shared bundle instead of FILE. Saved default themes do not
    /// apply to bundles; only an explicit --theme does.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["file", "settings", "language"])]
    bundle: Option<PathBuf>,

    /// Also write the code and settings as a shareable bundle
    #[arg(long, value_name = "PATH")]
    save_bundle: Option<PathBuf>,

    /// Output format; repeat to export several at once
    #[arg(short, long = "format", value_name = "FORMAT")]
    formats: Vec<ExportFormat>,

    /// Device pixel ratio for raster formats, in (0, 4]
    #[arg(long)]
    scale: Option<f32>,

    /// Canvas width in pixels (clamped to 200..=800)
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels (clamped to 100..=800)
    #[arg(long)]
    height: Option<u32>,

    /// Output path; with several formats the extension is replaced per format
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Bound on every font and image wait, in milliseconds
    #[arg(long, value_name = "MS")]
    asset_timeout_ms: Option<u64>,

    /// Extra directory to load fonts from
    #[arg(long = "font-dir", value_name = "DIR")]
    font_dirs: Vec<PathBuf>,

    /// List theme names and exit
    #[arg(long)]
    list_themes: bool,

    /// List language tags and exit
    #[arg(long)]
    list_languages: bool,

    /// Enable stage timing output
    #[arg(long)]
    perf: bool,

    /// Write detailed render/export debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let mut cli_flags = parse_flag_tokens(&raw_args);
    // Short forms (`-t`, `-f`) are only seen by clap.
    if cli.theme.is_some() {
        cli_flags.theme.clone_from(&cli.theme);
    }
    if !cli.formats.is_empty() {
        cli_flags.formats.clone_from(&cli.formats);
    }

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os(perf::DEBUG_LOG_ENV).map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    let registry = ThemeRegistry::with_syntect_defaults();
    if cli.list_themes {
        let mut names = registry.names().collect::<Vec<_>>();
        names.sort_unstable();
        for name in names {
            println!("{name}");
        }
        return Ok(());
    }
    if cli.list_languages {
        for spec in languages() {
            println!("{:<12} {}", spec.name, spec.aliases.join(" "));
        }
        return Ok(());
    }

    let (document, mut settings) = if let Some(path) = &cli.bundle {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read bundle {}", path.display()))?;
        let bundle = Bundle::from_json(&text)?;
        (bundle.document(), bundle.settings)
    } else if let Some(file) = &cli.file {
        let document = read_document(file, cli.language.as_deref())?;
        let settings = match &cli.settings {
            Some(path) => load_settings(path)?,
            None => RenderSettings::default(),
        };
        (document, settings)
    } else if cli.save || cli.clear {
        return Ok(());
    } else {
        anyhow::bail!("No input: pass a FILE, `-` for stdin, or --bundle");
    };

    if let Some(theme) = theme_override(cli.bundle.is_some(), &cli_flags, &effective) {
        settings.theme = theme.to_string();
    }
    if let Some(width) = cli.width {
        settings.width = fixed_dimension(width, "--width")?;
    }
    if let Some(height) = cli.height {
        settings.height = fixed_dimension(height, "--height")?;
    }

    if let Some(path) = &cli.save_bundle {
        let json = Bundle::capture(&document, &settings).to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write bundle {}", path.display()))?;
    }

    let base_dir = cli
        .file
        .as_deref()
        .or(cli.bundle.as_deref())
        .filter(|path| *path != Path::new("-"))
        .and_then(Path::parent)
        .map(Path::to_path_buf);
    let exporter = Exporter::new(ExporterConfig {
        asset_timeout: effective
            .asset_timeout_ms
            .map_or(codeframe::export::ASSET_TIMEOUT, Duration::from_millis),
        font_dirs: cli.font_dirs.clone(),
        base_dir,
        ..ExporterConfig::default()
    });

    let font_metrics = exporter.font_metrics(&settings.font_family).await;
    let fallback_metrics = MonospaceMetrics::default();
    let metrics: &dyn TextMetrics = match &font_metrics {
        Some(metrics) => metrics,
        None => &fallback_metrics,
    };
    let frame = render_frame(&document, &settings, &registry, metrics)?;

    let formats = if effective.formats.is_empty() {
        vec![ExportFormat::Png]
    } else {
        effective.formats.clone()
    };
    let scale = effective.scale.unwrap_or(1.0);
    let results = exporter.export_all(&frame, &formats, scale).await;

    let mut failed = 0;
    for (format, result) in formats.iter().zip(results) {
        match result {
            Ok(artifact) => {
                for warning in &artifact.warnings {
                    eprintln!("[warn] {warning}");
                }
                let path = output_path(cli.output.as_deref(), cli.file.as_deref(), *format, formats.len());
                tokio::fs::write(&path, &artifact.bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "{} ({}x{} px)",
                    path.display(),
                    artifact.pixel_width,
                    artifact.pixel_height
                );
            }
            Err(err) => {
                eprintln!("[error] {format}: {err}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} exports failed", formats.len());
    }
    Ok(())
}

fn read_document(file: &Path, language: Option<&str>) -> Result<SourceDocument> {
    if file == Path::new("-") {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("Failed to read stdin")?;
        let language = language.map_or_else(LanguageTag::plain, LanguageTag::new);
        return Ok(SourceDocument::new(code, language));
    }
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    let code = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let language = language.map_or_else(|| LanguageTag::from_path(file), LanguageTag::new);
    Ok(SourceDocument::new(code, language))
}

fn load_settings(path: &Path) -> Result<RenderSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    RenderSettings::from_json5(&text)
        .with_context(|| format!("Invalid settings in {}", path.display()))
}

/// Theme that replaces the one from the settings file or bundle. A bundle
/// renders as it was shared unless the command line names a theme.
fn theme_override<'a>(from_bundle: bool, cli: &'a ConfigFlags, effective: &'a ConfigFlags) -> Option<&'a str> {
    if from_bundle {
        cli.theme.as_deref()
    } else {
        effective.theme.as_deref()
    }
}

fn fixed_dimension(value: u32, flag: &str) -> Result<Dimension> {
    if value == 0 {
        anyhow::bail!("{flag} must be greater than zero");
    }
    Ok(Dimension::Fixed(value))
}

fn output_path(output: Option<&Path>, input: Option<&Path>, format: ExportFormat, count: usize) -> PathBuf {
    match output {
        Some(path) if count == 1 => path.to_path_buf(),
        Some(path) => path.with_extension(format.extension()),
        None => {
            let stem = input
                .filter(|path| *path != Path::new("-"))
                .and_then(Path::file_stem)
                .map_or_else(|| "codeframe".into(), |stem| stem.to_os_string());
            PathBuf::from(stem).with_extension(format.extension())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_defaults_to_input_stem() {
        let path = output_path(None, Some(Path::new("src/lib.rs")), ExportFormat::Jpeg, 1);
        assert_eq!(path, PathBuf::from("lib.jpg"));
        let path = output_path(None, Some(Path::new("-")), ExportFormat::Png, 1);
        assert_eq!(path, PathBuf::from("codeframe.png"));
    }

    #[test]
    fn test_output_path_swaps_extension_for_several_formats() {
        let out = Path::new("shots/demo.png");
        assert_eq!(output_path(Some(out), None, ExportFormat::Png, 1), out);
        assert_eq!(
            output_path(Some(out), None, ExportFormat::Svg, 2),
            PathBuf::from("shots/demo.svg")
        );
    }

    #[test]
    fn test_saved_theme_does_not_override_bundle() {
        let saved = ConfigFlags {
            theme: Some("nord".to_string()),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags::default();
        let effective = saved.union(&cli);
        assert_eq!(theme_override(true, &cli, &effective), None);
        assert_eq!(theme_override(false, &cli, &effective), Some("nord"));

        let explicit = ConfigFlags {
            theme: Some("monokai".to_string()),
            ..ConfigFlags::default()
        };
        let effective = saved.union(&explicit);
        assert_eq!(theme_override(true, &explicit, &effective), Some("monokai"));
    }

    #[test]
    fn test_cli_parses_repeated_formats() {
        let cli = Cli::try_parse_from(["codeframe", "-f", "png", "-f", "jpg", "main.rs"]).unwrap();
        assert_eq!(cli.formats, vec![ExportFormat::Png, ExportFormat::Jpeg]);
        assert!(Cli::try_parse_from(["codeframe", "-f", "tiff", "main.rs"]).is_err());
    }
}
