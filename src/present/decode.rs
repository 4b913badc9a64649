use std::path::Path;

use crate::foundation::error::{ViewError, ViewResult};

#[derive(Clone, PartialEq, Eq)]
/// Decoded raster ready for a presentation surface.
pub struct DecodedRaster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Straight-alpha RGBA8, row-major, tightly packed.
    pub rgba8: Vec<u8>,
}

impl std::fmt::Debug for DecodedRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedRaster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rgba8_len", &self.rgba8.len())
            .finish()
    }
}

impl DecodedRaster {
    /// RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.rgba8.get(i..i + 4)?.try_into().ok()
    }
}

/// Read the raster file at `path` and decode it to RGBA8.
pub fn decode_raster(path: &Path) -> ViewResult<DecodedRaster> {
    let bytes = std::fs::read(path)
        .map_err(|e| ViewError::decode(format!("read '{}': {e}", path.display())))?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| ViewError::decode(format!("decode '{}': {e}", path.display())))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedRaster {
        width,
        height,
        rgba8: rgba.into_raw(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/present/decode.rs"]
mod tests;
