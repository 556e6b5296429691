//! tilemosaic renders mosaics of transformed, multi-resolution image tiles into one composited
//! raster.
//!
//! A render call takes a [`RenderRequest`] (viewport origin, output scale, canvas size), an
//! ordered list of [`TileSpec`]s, and a [`Canvas`]. For every tile, in order:
//!
//! - the tile's transform chain is extended with the world-to-canvas alignment
//! - a pyramid level is picked from the estimated output scale ([`select_level`])
//! - the raster is loaded through an [`ImageCache`] and optionally run through a
//!   [`FilterPipeline`]
//! - a [`TransformMesh`] warps it onto the canvas grid ([`MeshResampler`])
//! - intensity and alpha are composed and the result is painted source-over
//!
//! Tile collections sharing named transforms are handled by [`ResolvedTileCollection`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod effects;
mod foundation;
mod mesh;
mod render;
mod tiles;
mod transform;

pub use crate::foundation::core::{
    Affine, Point, PremulRgba8, Rect, Vec2, parse_rgb_hex, premultiply, unpremultiply,
};
pub use crate::foundation::error::{MosaicError, MosaicResult};

pub use crate::assets::cache::{
    DisabledCache, ImageCache, RasterCache, RasterCacheOpts, RasterCacheStats,
};
pub use crate::assets::decode::{decode_raster, load_raster};
pub use crate::assets::raster::Raster;
pub use crate::effects::filter::{Filter, FilterPipeline, ValueToNoise};
pub use crate::mesh::mapping::{MeshResampler, ResampleOutput, SourceImage};
pub use crate::mesh::sampler::{InterpolatedSampler, NearestSampler, Sampler, sampler_for};
pub use crate::mesh::triangulation::{MeshTriangle, TransformMesh, mesh_resolution};
pub use crate::render::bounds::{derive_bounding_box, derive_bounding_box_with};
pub use crate::render::canvas::Canvas;
pub use crate::render::compose::{TileImage, compose_tile_image, rescale_intensity};
pub use crate::render::level::{LevelChoice, resolve_level, select_level};
pub use crate::render::pipeline::{RenderStats, render};
pub use crate::render::request::RenderRequest;
pub use crate::tiles::collection::{ResolvedTileCollection, apply_stack_transform};
pub use crate::tiles::tile_spec::{ImageAndMask, TileSpec};
pub use crate::transform::chain::{TransformChain, canvas_alignment, scale_level_transform};
pub use crate::transform::coordinate::{CoordinateTransform, Polynomial2D};
pub use crate::transform::fit::{best_mipmap_level, sample_average_scale};
pub use crate::transform::spec::TransformSpec;
