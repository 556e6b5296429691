//! Source rasters: decoding, pyramid downsampling, and the shared raster cache.

pub(crate) mod cache;
pub(crate) mod decode;
pub(crate) mod raster;
