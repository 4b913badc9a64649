use std::path::PathBuf;

use crate::{
    assets::{
        bundle::{AssetSource, BUNDLED_IMAGE_ID},
        stage::{AssetStager, StageDirs},
    },
    foundation::error::ViewResult,
    host::display::DisplayMetrics,
    present::{decode::decode_raster, surface::Surface},
    render::invoke::{Rasterizer, RenderInvoker, RenderResult},
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Settings for a [`Viewer`].
pub struct ViewerConfig {
    /// Bundled resource to stage and show.
    pub asset_id: String,
    /// Where the staged file may live.
    pub dirs: StageDirs,
    /// Engine-defined scale forwarded to the rasterizer.
    pub scale: i32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_id: BUNDLED_IMAGE_ID.to_string(),
            dirs: StageDirs::default(),
            scale: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "presentation", rename_all = "snake_case")]
/// What a [`Viewer::show`] call put on the surface.
pub enum Presentation {
    /// The raster at `path` was decoded and presented.
    Shown {
        /// Rendered raster file.
        path: PathBuf,
        /// Presented width in pixels.
        width: u32,
        /// Presented height in pixels.
        height: u32,
    },
    /// The rasterizer failed; the surface was left untouched.
    Skipped {
        /// Raw rasterizer status.
        status: i32,
    },
}

/// Stage, render, decode and present the bundled image in one synchronous call chain.
#[derive(Debug)]
pub struct Viewer<R> {
    config: ViewerConfig,
    stager: AssetStager,
    invoker: RenderInvoker<R>,
}

impl<R: Rasterizer> Viewer<R> {
    /// Build a viewer rendering through `rasterizer`.
    pub fn new(config: ViewerConfig, rasterizer: R) -> Self {
        Self {
            config,
            stager: AssetStager::new(),
            invoker: RenderInvoker::new(rasterizer),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Render invoker used by [`Viewer::show`].
    pub fn invoker(&self) -> &RenderInvoker<R> {
        &self.invoker
    }

    /// Show the configured asset on `surface` at the display's current size.
    ///
    /// Staging and decode failures are returned as errors. A rasterizer failure is not an error:
    /// it yields [`Presentation::Skipped`] and nothing is presented.
    #[tracing::instrument(skip_all, fields(asset = %self.config.asset_id))]
    pub fn show(
        &self,
        assets: &dyn AssetSource,
        display: &dyn DisplayMetrics,
        surface: &mut dyn Surface,
    ) -> ViewResult<Presentation> {
        let staged = self
            .stager
            .ensure_staged(assets, &self.config.asset_id, &self.config.dirs)?;
        let size = display.current_size()?;

        match self.invoker.render(&staged.path, self.config.scale, size) {
            RenderResult::Rendered { path } => {
                let raster = decode_raster(&path)?;
                let (width, height) = (raster.width, raster.height);
                surface.present(raster);
                tracing::info!(path = %path.display(), width, height, "presented raster");
                Ok(Presentation::Shown {
                    path,
                    width,
                    height,
                })
            }
            RenderResult::Failed { status } => {
                tracing::warn!(status, "rasterizer failed, nothing presented");
                Ok(Presentation::Skipped { status })
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/viewer.rs"]
mod tests;
