//! Per-tile raster filters applied after loading and before resampling.

pub(crate) mod filter;
