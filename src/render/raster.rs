use std::{
    io::{BufWriter, Write as _},
    path::Path,
    sync::Arc,
};

use anyhow::Context as _;

use crate::render::invoke::{Rasterizer, STATUS_SUCCESS};

/// Pixmap allocation failed.
pub const STATUS_NO_MEMORY: i32 = 1;
/// The PNG could not be encoded or written.
pub const STATUS_IO_ERROR: i32 = 2;
/// The source file could not be read.
pub const STATUS_FILE_NOT_FOUND: i32 = 3;
/// Zero target size, or an SVG without a usable viewport.
pub const STATUS_INVALID_VALUE: i32 = 4;
/// The source is not a parseable SVG document.
pub const STATUS_PARSE_ERROR: i32 = 6;

/// Short human-readable label for a [`ResvgRasterizer`] status code.
pub fn status_name(status: i32) -> &'static str {
    match status {
        STATUS_SUCCESS => "success",
        STATUS_NO_MEMORY => "no memory",
        STATUS_IO_ERROR => "io error",
        STATUS_FILE_NOT_FOUND => "file not found",
        STATUS_INVALID_VALUE => "invalid value",
        STATUS_PARSE_ERROR => "parse error",
        _ => "unknown",
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Uniform scale plus centering offset mapping SVG user space into the target raster.
pub struct FitTransform {
    /// Uniform scale factor.
    pub scale: f32,
    /// Horizontal offset in whole pixels.
    pub dx: f32,
    /// Vertical offset in whole pixels.
    pub dy: f32,
}

impl FitTransform {
    /// Fit an `svg_w` x `svg_h` drawing inside `width` x `height`, preserving aspect ratio.
    ///
    /// The drawing is centered on the axis with slack; offsets are truncated to whole pixels.
    /// Returns `None` when the SVG size is not finite and positive.
    pub fn contain(svg_w: f32, svg_h: f32, width: u32, height: u32) -> Option<Self> {
        if !svg_w.is_finite() || !svg_h.is_finite() || svg_w <= 0.0 || svg_h <= 0.0 {
            return None;
        }
        let (sw, sh) = (f64::from(svg_w), f64::from(svg_h));
        let scale = (f64::from(width) / sw).min(f64::from(height) / sh);

        let fitted_w = (sw * scale + 0.5) as i64;
        let fitted_h = (sh * scale + 0.5) as i64;
        let dx = (i64::from(width) - fitted_w) / 2;
        let dy = (i64::from(height) - fitted_h) / 2;

        Some(Self {
            scale: scale as f32,
            dx: dx as f32,
            dy: dy as f32,
        })
    }

    fn to_tiny_skia(self) -> resvg::tiny_skia::Transform {
        resvg::tiny_skia::Transform::from_row(self.scale, 0.0, 0.0, self.scale, self.dx, self.dy)
    }
}

/// [`Rasterizer`] backed by `usvg` parsing and `resvg` rendering, writing RGBA8 PNG files.
///
/// The drawing is scaled uniformly to fit the requested size and centered; uncovered margins
/// are transparent unless a background is set. The `scale` argument is accepted for contract
/// compatibility, but explicit target dimensions always take precedence over it.
///
/// Output is written to a uniquely named temporary file next to the destination and renamed over
/// it, so readers never observe a partially written PNG and concurrent writers never share a file.
#[derive(Clone)]
pub struct ResvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
    background: Option<[u8; 4]>,
}

impl std::fmt::Debug for ResvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResvgRasterizer")
            .field("font_faces", &self.fontdb.len())
            .field("background", &self.background)
            .finish()
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResvgRasterizer {
    /// Rasterizer with an empty font database and a transparent background.
    pub fn new() -> Self {
        Self {
            fontdb: Arc::new(usvg::fontdb::Database::new()),
            background: None,
        }
    }

    /// Load system fonts so `<text>` elements render.
    pub fn with_system_fonts(mut self) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        self.fontdb = Arc::new(db);
        self
    }

    /// Fill the canvas with straight-alpha `rgba` before drawing.
    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.background = Some(rgba);
        self
    }

    fn rasterize(
        &self,
        source: &Path,
        destination: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), i32> {
        if width == 0 || height == 0 {
            return Err(STATUS_INVALID_VALUE);
        }

        let bytes = std::fs::read(source).map_err(|e| {
            tracing::warn!(source = %source.display(), error = %e, "failed to open svg");
            STATUS_FILE_NOT_FOUND
        })?;

        let opts = usvg::Options {
            resources_dir: source.parent().map(Path::to_path_buf),
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(&bytes, &opts).map_err(|e| {
            tracing::warn!(source = %source.display(), error = %e, "failed to parse svg");
            STATUS_PARSE_ERROR
        })?;

        let svg_size = tree.size();
        let fit = FitTransform::contain(svg_size.width(), svg_size.height(), width, height)
            .ok_or(STATUS_INVALID_VALUE)?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or(STATUS_NO_MEMORY)?;
        if let Some([r, g, b, a]) = self.background {
            pixmap.fill(resvg::tiny_skia::Color::from_rgba8(r, g, b, a));
        }
        resvg::render(&tree, fit.to_tiny_skia(), &mut pixmap.as_mut());

        write_png(&pixmap, destination).map_err(|e| {
            tracing::warn!(destination = %destination.display(), error = %e, "failed to write png");
            STATUS_IO_ERROR
        })
    }
}

impl Rasterizer for ResvgRasterizer {
    fn render_vector(
        &self,
        source: &Path,
        destination: &Path,
        scale: i32,
        width: u32,
        height: u32,
    ) -> i32 {
        tracing::trace!(scale, width, height, "resvg rasterize");
        match self.rasterize(source, destination, width, height) {
            Ok(()) => STATUS_SUCCESS,
            Err(status) => status,
        }
    }
}

fn write_png(pixmap: &resvg::tiny_skia::Pixmap, destination: &Path) -> anyhow::Result<()> {
    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // Dropping the temp file on any early return removes it.
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp png in '{}'", dir.display()))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        image::write_buffer_with_format(
            &mut writer,
            &rgba,
            pixmap.width(),
            pixmap.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("encode png '{}'", destination.display()))?;
        writer.flush().context("flush png")?;
    }

    tmp.persist(destination)
        .map_err(|e| e.error)
        .with_context(|| format!("move png into place at '{}'", destination.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
