use crate::present::decode::DecodedRaster;

/// Host-owned area a decoded raster is shown on.
pub trait Surface {
    /// Replace the displayed content with `raster`.
    fn present(&mut self, raster: DecodedRaster);
}

/// Surface that keeps the last presented raster in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    current: Option<DecodedRaster>,
    presented: usize,
}

impl MemorySurface {
    /// Blank surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raster currently shown, if any.
    pub fn current(&self) -> Option<&DecodedRaster> {
        self.current.as_ref()
    }

    /// How many times [`Surface::present`] was called.
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Surface for MemorySurface {
    fn present(&mut self, raster: DecodedRaster) {
        self.current = Some(raster);
        self.presented += 1;
    }
}
