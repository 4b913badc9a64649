use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{foundation::core::TargetSize, render::locks::PathLocks};

/// Status code a [`Rasterizer`] returns on success. Every other value is a failure.
pub const STATUS_SUCCESS: i32 = 0;

const RASTER_SUFFIX: &str = ".png";

/// External vector rasterizer.
///
/// Reads the vector file at `source`, renders it into a `width` x `height` raster, and writes
/// that raster to `destination`. `scale` is engine-defined and is forwarded untouched.
///
/// The return value is a status code: [`STATUS_SUCCESS`] (`0`) means the destination was
/// written; any other value means failure, with no meaning callers may rely on.
pub trait Rasterizer: Send + Sync {
    /// Run one rasterization to completion.
    fn render_vector(
        &self,
        source: &Path,
        destination: &Path,
        scale: i32,
        width: u32,
        height: u32,
    ) -> i32;
}

impl<R: Rasterizer + ?Sized> Rasterizer for Box<R> {
    fn render_vector(&self, s: &Path, d: &Path, scale: i32, width: u32, height: u32) -> i32 {
        (**self).render_vector(s, d, scale, width, height)
    }
}

impl<R: Rasterizer + ?Sized> Rasterizer for Arc<R> {
    fn render_vector(&self, s: &Path, d: &Path, scale: i32, width: u32, height: u32) -> i32 {
        (**self).render_vector(s, d, scale, width, height)
    }
}

/// Raster output path for `source`: the source path with `.png` appended.
///
/// The mapping ignores the requested size, so every render of one source lands on one file.
pub fn destination_for(source: &Path) -> PathBuf {
    let mut os = source.as_os_str().to_owned();
    os.push(RASTER_SUFFIX);
    PathBuf::from(os)
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// One rasterization job, built fresh per call.
pub struct RenderRequest {
    /// Staged vector file.
    pub source: PathBuf,
    /// Raster output, always [`destination_for`]`(source)`.
    pub destination: PathBuf,
    /// Engine-defined scale, forwarded unchanged.
    pub scale: i32,
    /// Target raster size.
    pub size: TargetSize,
}

impl RenderRequest {
    /// Build a request, deriving the destination from `source`.
    pub fn new(source: impl Into<PathBuf>, scale: i32, size: TargetSize) -> Self {
        let source = source.into();
        let destination = destination_for(&source);
        Self {
            source,
            destination,
            scale,
            size,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
/// Outcome of one [`RenderInvoker::render`] call.
pub enum RenderResult {
    /// The rasterizer reported success; the raster was written to `path`.
    Rendered {
        /// Destination path handed to the rasterizer.
        path: PathBuf,
    },
    /// The rasterizer returned a nonzero status.
    Failed {
        /// Raw status code, unclassified.
        status: i32,
    },
}

impl RenderResult {
    /// Map a raw status code onto a result for `destination`.
    pub fn from_status(status: i32, destination: &Path) -> Self {
        if status == STATUS_SUCCESS {
            Self::Rendered {
                path: destination.to_path_buf(),
            }
        } else {
            Self::Failed { status }
        }
    }

    /// Return `true` for [`RenderResult::Rendered`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }

    /// Rendered raster path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Rendered { path } => Some(path),
            Self::Failed { .. } => None,
        }
    }

    /// Status code the rasterizer returned.
    pub fn status(&self) -> i32 {
        match self {
            Self::Rendered { .. } => STATUS_SUCCESS,
            Self::Failed { status } => *status,
        }
    }

    /// Terminal phase this result corresponds to.
    pub fn phase(&self) -> RenderPhase {
        if self.is_success() {
            RenderPhase::Succeeded
        } else {
            RenderPhase::Failed
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Lifecycle of a single render call. Every call ends in `Succeeded` or `Failed`.
pub enum RenderPhase {
    /// Request built, rasterizer not yet called.
    Idle,
    /// Rasterizer running; the destination lock is held.
    Invoking,
    /// Status `0`.
    Succeeded,
    /// Nonzero status.
    Failed,
}

/// Calls a [`Rasterizer`] and interprets its status code.
///
/// The invoker holds no per-call state. Renders that target the same destination are
/// serialized across every invoker in the process through [`PathLocks::global`]; renders for
/// different destinations run concurrently.
#[derive(Debug)]
pub struct RenderInvoker<R> {
    rasterizer: R,
    locks: &'static PathLocks,
}

impl<R: Rasterizer> RenderInvoker<R> {
    /// Wrap `rasterizer`.
    pub fn new(rasterizer: R) -> Self {
        Self {
            rasterizer,
            locks: PathLocks::global(),
        }
    }

    /// Underlying rasterizer.
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Render `source` at `size` into [`destination_for`]`(source)`.
    ///
    /// The rasterizer is called exactly once, synchronously. Its output is not reopened or
    /// validated here.
    #[tracing::instrument(skip(self))]
    pub fn render(&self, source: &Path, scale: i32, size: TargetSize) -> RenderResult {
        self.execute(&RenderRequest::new(source, scale, size))
    }

    /// Run a prepared request.
    pub fn execute(&self, req: &RenderRequest) -> RenderResult {
        tracing::trace!(phase = ?RenderPhase::Idle, dest = %req.destination.display());
        let _guard = self.locks.acquire(&req.destination);

        tracing::trace!(phase = ?RenderPhase::Invoking, dest = %req.destination.display());
        let status = self.rasterizer.render_vector(
            &req.source,
            &req.destination,
            req.scale,
            req.size.width,
            req.size.height,
        );

        let result = RenderResult::from_status(status, &req.destination);
        match &result {
            RenderResult::Rendered { path } => {
                tracing::debug!(phase = ?result.phase(), path = %path.display(), size = %req.size, "render finished");
            }
            RenderResult::Failed { status } => {
                tracing::debug!(phase = ?result.phase(), status, source = %req.source.display(), "rasterizer failed");
            }
        }
        result
    }

    /// Return `true` while a render for `destination` is in progress.
    pub fn is_rendering(&self, destination: &Path) -> bool {
        self.locks.is_held(destination)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/invoke.rs"]
mod tests;
