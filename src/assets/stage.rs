use std::{
    collections::HashSet,
    fs::File,
    io::{self, BufWriter, Read, Write as _},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crate::{
    assets::bundle::AssetSource,
    foundation::error::{ViewError, ViewResult},
};

/// File name the bundled image is staged under.
pub const STAGED_FILE_NAME: &str = "image.svg";

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Writable directories the stager may place the staged file in.
pub struct StageDirs {
    /// Directory tried first. `None` means the host has no preferred location.
    pub preferred: Option<PathBuf>,
    /// Directory used when `preferred` is absent or cannot be created.
    pub fallback: PathBuf,
}

impl Default for StageDirs {
    fn default() -> Self {
        Self {
            preferred: None,
            fallback: std::env::temp_dir().join("svgview"),
        }
    }
}

impl StageDirs {
    /// Build a directory pair.
    pub fn new(preferred: Option<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            preferred,
            fallback: fallback.into(),
        }
    }

    /// Resolve to an absolute, existing directory, creating it when needed.
    pub fn resolve(&self) -> ViewResult<PathBuf> {
        if let Some(preferred) = &self.preferred {
            match prepare_dir(preferred) {
                Ok(dir) => return Ok(dir),
                Err(err) => {
                    tracing::debug!(
                        dir = %preferred.display(),
                        error = %err,
                        "preferred staging directory unavailable, using fallback"
                    );
                }
            }
        }
        prepare_dir(&self.fallback).map_err(|e| {
            ViewError::staging(
                format!("create staging directory '{}'", self.fallback.display()),
                e,
            )
        })
    }
}

fn prepare_dir(dir: &Path) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    std::path::absolute(dir)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// What [`AssetStager::ensure_staged`] did to produce its path.
pub enum StageOutcome {
    /// The bundled resource was copied in full.
    Copied {
        /// Number of bytes written.
        bytes: u64,
    },
    /// A staged file was already present; nothing was written.
    AlreadyPresent,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// Absolute path of a staged vector asset.
pub struct StagedAsset {
    /// Absolute path to the staged file. The file exists when this value is returned.
    pub path: PathBuf,
    /// Whether this call copied the file.
    pub outcome: StageOutcome,
}

/// Copies a bundled resource into writable storage at most once per install.
///
/// An existing staged file is trusted as-is: it is never re-validated or refreshed. Calls are
/// serialized through an internal lock, so concurrent callers sharing one stager copy at most
/// once. Separate stagers racing on a fresh directory never clobber each other: the one that
/// finds `image.svg` already in place reports [`StageOutcome::AlreadyPresent`].
#[derive(Debug, Default)]
pub struct AssetStager {
    staged: Mutex<HashSet<PathBuf>>,
}

impl AssetStager {
    /// New stager with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `<dir>/image.svg` exists, copying bundled resource `id` from `source` if it does not.
    #[tracing::instrument(skip(self, source, dirs))]
    pub fn ensure_staged(
        &self,
        source: &dyn AssetSource,
        id: &str,
        dirs: &StageDirs,
    ) -> ViewResult<StagedAsset> {
        let dir = dirs.resolve()?;
        let path = dir.join(STAGED_FILE_NAME);

        let mut staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
        if path.exists() {
            staged.insert(path.clone());
            tracing::debug!(path = %path.display(), "asset already staged");
            return Ok(StagedAsset {
                path,
                outcome: StageOutcome::AlreadyPresent,
            });
        }

        let outcome = copy_bundled(source, id, &path)?;
        staged.insert(path.clone());
        match outcome {
            StageOutcome::Copied { bytes } => {
                tracing::info!(path = %path.display(), bytes, "staged bundled asset");
            }
            StageOutcome::AlreadyPresent => {
                tracing::debug!(path = %path.display(), "asset staged concurrently elsewhere");
            }
        }
        Ok(StagedAsset { path, outcome })
    }

    /// Return `true` if this stager has produced or observed a staged file at `path`.
    pub fn is_staged(&self, path: &Path) -> bool {
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }
}

/// Copy resource `id` into a uniquely named sibling of `dest`, then move it into place without
/// replacing a file another stager finished first.
fn copy_bundled(source: &dyn AssetSource, id: &str, dest: &Path) -> ViewResult<StageOutcome> {
    let mut reader = source
        .open(id)
        .map_err(|e| ViewError::staging(format!("open bundled asset '{id}'"), e))?;
    let context = || format!("copy bundled asset '{id}' to '{}'", dest.display());

    let dir = dest.parent().unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| ViewError::staging(context(), e))?;
    let bytes = write_all_to(&mut *reader, tmp.as_file_mut())
        .map_err(|e| ViewError::staging(context(), e))?;

    match tmp.persist_noclobber(dest) {
        Ok(_) => Ok(StageOutcome::Copied { bytes }),
        Err(_) if dest.exists() => Ok(StageOutcome::AlreadyPresent),
        Err(e) => Err(ViewError::staging(context(), e.error)),
    }
}

fn write_all_to<R: Read + ?Sized>(reader: &mut R, file: &mut File) -> io::Result<u64> {
    let mut writer = BufWriter::new(&mut *file);
    let bytes = io::copy(reader, &mut writer)?;
    writer.flush()?;
    drop(writer);
    file.sync_all()?;
    Ok(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/stage.rs"]
mod tests;
