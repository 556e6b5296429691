//! Triangle-mesh approximation of non-linear transform chains and the resampler that maps a
//! source raster through it.

pub(crate) mod mapping;
pub(crate) mod sampler;
pub(crate) mod triangulation;
