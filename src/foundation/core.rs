use crate::foundation::error::{ViewError, ViewResult};

/// Target raster dimensions in pixels.
///
/// Both axes are strictly positive. Values are carried to the rasterizer exactly as given.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TargetSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TargetSize {
    /// Build a size, rejecting zero on either axis.
    pub fn new(width: u32, height: u32) -> ViewResult<Self> {
        if width == 0 || height == 0 {
            return Err(ViewError::validation(format!(
                "target size must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Return `true` when the size is taller than it is wide.
    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }

    /// Same size with the axes swapped, as after a display rotation.
    pub fn rotated(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl std::fmt::Display for TargetSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
