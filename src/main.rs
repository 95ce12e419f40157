// this_file: src/main.rs

//! Scrawl CLI: render handwriting pages from text and an options file.

use anyhow::{bail, Context};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use log::{info, warn};
use scrawl::{
    Document, ExportFormat, ExportOutput, FontLibrary, ImageOverlay, OverlaySource, RenderEngine,
    Settings,
};
use std::io::{self, Read};
use std::str::FromStr;
use std::sync::Arc;

/// Scrawl: simulated handwriting page renderer
#[derive(Parser)]
#[command(name = "scrawl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render text to PNG, JPEG or PDF
    Render {
        /// Text to render
        #[arg(short, long, conflicts_with = "input")]
        text: Option<String>,

        /// Read text from this file (stdin if neither --text nor --input is given)
        #[arg(short, long)]
        input: Option<Utf8PathBuf>,

        /// JSON options file
        #[arg(long)]
        options: Option<Utf8PathBuf>,

        /// Override a single option, e.g. --set font_size=32
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Register a font file under a family name, e.g. --font Caveat=./Caveat.ttf
        #[arg(long = "font", value_name = "FAMILY=PATH")]
        fonts: Vec<String>,

        /// Image to stamp on the page
        #[arg(long = "overlay", value_name = "PATH")]
        overlays: Vec<Utf8PathBuf>,

        /// Anchor keyword for overlays
        #[arg(long, default_value = "bottom-right")]
        overlay_anchor: String,

        /// Scale applied to overlays
        #[arg(long, default_value = "1.0")]
        overlay_scale: f32,

        /// Opacity applied to overlays
        #[arg(long, default_value = "1.0")]
        overlay_opacity: f32,

        /// Image that covers every page under the ruling; see bg_opacity
        #[arg(long, value_name = "PATH")]
        background: Option<Utf8PathBuf>,

        /// Output file; multi-page raster output is written as NAME-N.EXT
        #[arg(short, long)]
        out: Utf8PathBuf,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check an options file (or stdin if omitted)
    Validate {
        /// Input file path
        #[arg(short, long)]
        input: Option<Utf8PathBuf>,
    },

    /// Print version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            text,
            input,
            options,
            set,
            fonts,
            overlays,
            overlay_anchor,
            overlay_scale,
            overlay_opacity,
            background,
            out,
            verbose,
        } => {
            init_logging(verbose);
            let text = match (text, input) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {path}"))?,
                (None, None) => read_stdin()?,
            };
            let settings = build_settings(options.as_deref(), &set, &out)?;

            let library = FontLibrary::new();
            for pair in &fonts {
                let (family, path) = split_pair(pair)?;
                library
                    .register_file(family, path)
                    .with_context(|| format!("failed to load font {path}"))?;
            }

            let mut doc = Document::new(text, settings);
            for path in &overlays {
                let bytes =
                    std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
                doc = doc.with_overlay(
                    ImageOverlay::from_encoded(bytes, overlay_anchor.as_str())
                        .with_scale(overlay_scale)
                        .with_opacity(overlay_opacity),
                );
            }

            if let Some(path) = &background {
                let bytes =
                    std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
                doc = doc.with_background(OverlaySource::Encoded(Arc::new(bytes)));
            }

            run_render(&doc, &library, &out)?;
        }
        Commands::Validate { input } => {
            init_logging(false);
            run_validate(input)?;
        }
        Commands::Version => {
            println!("scrawl {}", env!("CARGO_PKG_VERSION"));
            println!("Simulated handwriting page renderer");
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn split_pair(raw: &str) -> anyhow::Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => bail!("expected KEY=VALUE, got '{raw}'"),
    }
}

/// The output extension picks the format unless the options file or a
/// `--set` pair names one.
fn build_settings(
    options: Option<&Utf8Path>,
    pairs: &[String],
    out: &Utf8Path,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    if let Some(format) = out.extension().and_then(|ext| ExportFormat::from_str(ext).ok()) {
        settings.export.format = format;
    }

    if let Some(path) = options {
        let json =
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        for warning in settings.apply_json(&json)? {
            warn!("{path}: {warning}");
        }
    }

    for pair in pairs {
        let (key, value) = split_pair(pair)?;
        if let Err(warning) = settings.apply_pair(key, value) {
            warn!("--set {warning}");
        }
    }

    settings.validate()?;
    Ok(settings)
}

fn run_render(doc: &Document, library: &FontLibrary, out: &Utf8Path) -> anyhow::Result<()> {
    let engine = RenderEngine::with_fonts(library);
    let rendered = engine.render(doc)?;
    let exporter = scrawl::Exporter::from_settings(&doc.settings.export);
    let output = exporter.export(&rendered)?;

    let written = write_output(&output, out, exporter.format())?;
    info!(
        "rendered {} page(s), {} line(s) with '{}' to {}",
        rendered.pages.len(),
        rendered.line_count,
        rendered.face,
        written
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

fn write_output(
    output: &ExportOutput,
    out: &Utf8Path,
    format: ExportFormat,
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let files = output.files();
    let paths: Vec<Utf8PathBuf> = if files.len() == 1 {
        vec![out.to_path_buf()]
    } else {
        let stem = out.file_stem().unwrap_or("page");
        let ext = out.extension().unwrap_or(format.extension());
        (1..=files.len())
            .map(|n| out.with_file_name(format!("{stem}-{n}.{ext}")))
            .collect()
    };

    for (path, bytes) in paths.iter().zip(files) {
        std::fs::write(path, bytes).with_context(|| format!("failed to write {path}"))?;
    }
    Ok(paths)
}

fn run_validate(input: Option<Utf8PathBuf>) -> anyhow::Result<()> {
    let json = match input {
        Some(path) => {
            std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?
        }
        None => read_stdin()?,
    };

    let mut settings = Settings::default();
    let warnings = settings.apply_json(&json)?;
    for warning in &warnings {
        println!("warning: {warning}");
    }
    settings.validate()?;
    println!("✓ options valid ({} warning(s))", warnings.len());
    Ok(())
}
