use std::{
    collections::BTreeMap,
    io::{self, Read},
    path::PathBuf,
};

/// Identifier of the image shipped with the viewer.
pub const BUNDLED_IMAGE_ID: &str = "image";

/// Bytes of the image shipped with the viewer.
pub const BUNDLED_IMAGE_SVG: &[u8] = include_bytes!("../../assets/image.svg");

/// Read-only source of bundled resources, addressed by identifier.
///
/// The stager only ever streams from a source; it never asks for a length or a path, so
/// resources can live in the binary, in a directory, or anywhere else a reader can be produced.
pub trait AssetSource: Send + Sync {
    /// Open the resource `id` for reading.
    ///
    /// Unknown identifiers are reported as [`io::ErrorKind::NotFound`].
    fn open(&self, id: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// Resources compiled into the binary.
#[derive(Clone, Debug, Default)]
pub struct EmbeddedAssets {
    entries: BTreeMap<String, &'static [u8]>,
}

impl EmbeddedAssets {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The viewer's default bundle: [`BUNDLED_IMAGE_SVG`] under [`BUNDLED_IMAGE_ID`].
    pub fn bundled() -> Self {
        Self::new().with(BUNDLED_IMAGE_ID, BUNDLED_IMAGE_SVG)
    }

    /// Register `bytes` under `id`, replacing any previous entry.
    pub fn with(mut self, id: impl Into<String>, bytes: &'static [u8]) -> Self {
        self.entries.insert(id.into(), bytes);
        self
    }

    /// Byte length of `id`, if present.
    pub fn len_of(&self, id: &str) -> Option<u64> {
        self.entries.get(id).map(|b| b.len() as u64)
    }
}

impl AssetSource for EmbeddedAssets {
    fn open(&self, id: &str) -> io::Result<Box<dyn Read + '_>> {
        let bytes = self.entries.get(id).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no bundled asset named '{id}'"),
            )
        })?;
        Ok(Box::new(*bytes))
    }
}

/// Resources read from files under a root directory.
///
/// Identifiers map to `root/<id>` when that file exists, otherwise to `root/<id>.svg`.
#[derive(Clone, Debug)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, id: &str) -> io::Result<PathBuf> {
        if id.is_empty() || id.contains("..") {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid asset id '{id}'"),
            ));
        }
        let direct = self.root.join(id);
        if direct.is_file() {
            return Ok(direct);
        }
        Ok(self.root.join(format!("{id}.svg")))
    }
}

impl AssetSource for DirAssets {
    fn open(&self, id: &str) -> io::Result<Box<dyn Read + '_>> {
        let path = self.resolve(id)?;
        let file = std::fs::File::open(&path)?;
        Ok(Box::new(io::BufReader::new(file)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/bundle.rs"]
mod tests;
