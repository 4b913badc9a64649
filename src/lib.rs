//! svgview shows one bundled SVG by rasterizing it to a PNG sized to the display.
//!
//! # Pipeline overview
//!
//! 1. **Stage**: copy the bundled SVG to `<writable dir>/image.svg`, at most once per install
//!    ([`AssetStager`]).
//! 2. **Render**: call a [`Rasterizer`] with the staged path, `<source>.png`, a scale and the
//!    display's current size, and map its status code (`0` = success) onto a
//!    [`RenderResult`] ([`RenderInvoker`]).
//! 3. **Present**: decode the PNG and hand it to a [`Surface`] ([`Viewer::show`]).
//!
//! The rasterizer is a trait seam. [`ResvgRasterizer`] is the bundled implementation built on
//! `usvg` and `resvg`.
//!
//! Renders targeting the same destination are serialized across every invoker in the process,
//! and both the staged file and the PNG are written through a uniquely named temp file and
//! renamed into place.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;
mod host;
mod present;
mod render;

pub use assets::bundle::{
    AssetSource, BUNDLED_IMAGE_ID, BUNDLED_IMAGE_SVG, DirAssets, EmbeddedAssets,
};
pub use assets::stage::{AssetStager, STAGED_FILE_NAME, StageDirs, StageOutcome, StagedAsset};
pub use foundation::core::TargetSize;
pub use foundation::error::{ViewError, ViewResult};
pub use host::display::{DisplayMetrics, FixedDisplay, MutableDisplay};
pub use host::viewer::{Presentation, Viewer, ViewerConfig};
pub use present::decode::{DecodedRaster, decode_raster};
pub use present::surface::{MemorySurface, Surface};
pub use render::invoke::{
    Rasterizer, RenderInvoker, RenderPhase, RenderRequest, RenderResult, STATUS_SUCCESS,
    destination_for,
};
pub use render::locks::{PathGuard, PathLocks};
pub use render::raster::{
    FitTransform, ResvgRasterizer, STATUS_FILE_NOT_FOUND, STATUS_INVALID_VALUE, STATUS_IO_ERROR,
    STATUS_NO_MEMORY, STATUS_PARSE_ERROR, status_name,
};
