use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

use svgview::{
    AssetSource, DirAssets, EmbeddedAssets, FixedDisplay, MemorySurface, Presentation,
    ResvgRasterizer, StageDirs, TargetSize, Viewer, ViewerConfig, status_name,
};

#[derive(Parser, Debug)]
#[command(name = "svgview", version)]
/// Stage the bundled SVG, render it at display size and present the PNG.
struct Cli {
    /// Preferred writable directory for the staged SVG and its PNG.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory used when `--data-dir` is absent or unusable.
    #[arg(long)]
    fallback_dir: Option<PathBuf>,

    /// Display width in pixels.
    #[arg(long, default_value_t = 1080)]
    width: u32,

    /// Display height in pixels.
    #[arg(long, default_value_t = 1920)]
    height: u32,

    /// Use this SVG file as the bundled image instead of the built-in one.
    #[arg(long)]
    asset: Option<PathBuf>,

    /// Fill letterbox margins with an opaque `#rrggbb` color.
    #[arg(long, value_parser = parse_hex_rgb)]
    background: Option<[u8; 4]>,

    /// Print the outcome as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_hex_rgb(s: &str) -> Result<[u8; 4], String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected #rrggbb, got '{s}'"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad color '{s}': {e}"))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?, 255])
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (assets, asset_id): (Box<dyn AssetSource>, String) = match &cli.asset {
        Some(path) => {
            let root = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("asset path '{}' has no file name", path.display()))?;
            (
                Box::new(DirAssets::new(root)),
                name.to_string_lossy().into_owned(),
            )
        }
        None => (
            Box::new(EmbeddedAssets::bundled()),
            svgview::BUNDLED_IMAGE_ID.to_string(),
        ),
    };

    let defaults = StageDirs::default();
    let config = ViewerConfig {
        asset_id,
        dirs: StageDirs::new(cli.data_dir, cli.fallback_dir.unwrap_or(defaults.fallback)),
        ..ViewerConfig::default()
    };

    let mut rasterizer = ResvgRasterizer::new().with_system_fonts();
    if let Some(rgba) = cli.background {
        rasterizer = rasterizer.with_background(rgba);
    }

    let display = FixedDisplay(TargetSize::new(cli.width, cli.height)?);
    let viewer = Viewer::new(config, rasterizer);
    let mut surface = MemorySurface::new();

    let presentation = match viewer.show(assets.as_ref(), &display, &mut surface) {
        Ok(p) => p,
        Err(err) => {
            tracing::error!(error = %err, "render attempt aborted");
            return Err(err.into());
        }
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&presentation).context("serialize presentation")?
        );
    }
    match &presentation {
        Presentation::Shown {
            path,
            width,
            height,
        } => eprintln!("presented {} ({width}x{height})", path.display()),
        Presentation::Skipped { status } => {
            eprintln!("nothing presented: rasterizer status {status} ({})", status_name(*status))
        }
    }
    Ok(())
}
