// this_file: src/main.rs

//! texform CLI: render formulas to image files or check that they parse.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use texform::{Color, Formula, ImageFormat, RasterOptions, Rasterizer, Registry, TexStyle};

/// Render TeX-like formulas to PNG, GIF or JPEG
#[derive(Parser)]
#[command(name = "texform")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a formula to an image file
    Render {
        /// Formula source, e.g. '\frac{1}{2}'
        formula: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Encoder name (png, gif, jpeg)
        #[arg(long, default_value = "png")]
        format: ImageFormat,

        /// Font size in points
        #[arg(long, default_value = "20")]
        size: f32,

        /// display, text, script or scriptscript
        #[arg(long, default_value = "display")]
        style: TexStyle,

        /// Foreground color (name or #rrggbb)
        #[arg(long)]
        fg: Option<Color>,

        /// Background color (name or #rrggbb)
        #[arg(long)]
        bg: Option<Color>,

        /// Keep the background transparent; implied when no background is given (ignored for JPEG)
        #[arg(long)]
        transparent: bool,

        /// Skip sub-expressions that fail to parse
        #[arg(long)]
        partial: bool,
    },

    /// Parse a formula and report its layout size
    Check {
        /// Formula source
        formula: String,

        /// Skip sub-expressions that fail to parse
        #[arg(long)]
        partial: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let registry = Registry::with_defaults().context("Failed to load default registry")?;

    match cli.command {
        Commands::Render {
            formula,
            output,
            format,
            size,
            style,
            fg,
            bg,
            transparent,
            partial,
        } => {
            let parsed = parse(&registry, &formula, partial)?;
            let options = raster_options(style, size, fg, bg, transparent);
            Rasterizer::new()
                .create_image(&parsed, format, &options, &output)
                .with_context(|| format!("Failed to render to {}", output.display()))?;
            log::info!("Wrote {}", output.display());
        }
        Commands::Check { formula, partial } => {
            let parsed = parse(&registry, &formula, partial)?;
            let leaves = parsed.root().map_or(0, |root| root.leaves().len());
            let icon = parsed
                .icon_builder()
                .style(TexStyle::Display)
                .size(20.0)
                .true_values(true)
                .build()?;
            println!(
                "ok: {leaves} atoms, {}x{} px at 20pt{}",
                icon.width(),
                icon.height(),
                if parsed.is_colored() { ", colored" } else { "" }
            );
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn parse<'r>(registry: &'r Registry, source: &str, partial: bool) -> anyhow::Result<Formula<'r>> {
    let parsed = if partial {
        Formula::parse_partial(registry, source)
    } else {
        Formula::parse(registry, source)
    };
    parsed.with_context(|| format!("Failed to parse '{source}'"))
}

/// Without a background the image is always transparent.
fn raster_options(
    style: TexStyle,
    size: f32,
    fg: Option<Color>,
    bg: Option<Color>,
    transparent: bool,
) -> RasterOptions {
    RasterOptions {
        style,
        size,
        foreground: fg,
        background: bg,
        transparent: transparent || bg.is_none(),
    }
}
