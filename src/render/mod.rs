pub(crate) mod invoke;
pub(crate) mod locks;
pub(crate) mod raster;
