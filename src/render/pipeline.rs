use std::sync::Arc;
use std::time::Instant;

use crate::assets::cache::ImageCache;
use crate::assets::raster::Raster;
use crate::effects::filter::FilterPipeline;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::mesh::mapping::{MeshResampler, SourceImage};
use crate::mesh::sampler::Sampler;
use crate::mesh::triangulation::{TransformMesh, mesh_resolution};
use crate::render::canvas::Canvas;
use crate::render::compose::compose_tile_image;
use crate::render::level::select_level;
use crate::render::request::RenderRequest;
use crate::tiles::tile_spec::TileSpec;
use crate::transform::chain::{TransformChain, scale_level_transform};

/// Counters returned by [`render`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Tiles passed in.
    pub tiles_total: usize,
    /// Tiles painted onto the canvas.
    pub tiles_rendered: usize,
    /// Tiles skipped because their image has zero size.
    pub tiles_skipped: usize,
}

/// Render `tiles` onto `canvas` in list order.
///
/// Tiles are processed one at a time; only the resampling of a single tile runs on
/// `request.num_threads` workers. The request and every tile spec are validated before the canvas
/// is touched. A tile whose image has zero width or height is skipped; any other failure aborts the
/// call. After an error the contents of `canvas` are unspecified and must be discarded.
#[tracing::instrument(skip_all, fields(tiles = tiles.len(), width = request.width, height = request.height, scale = request.scale))]
pub fn render(
    request: &RenderRequest,
    tiles: &[TileSpec],
    canvas: &mut Canvas,
    cache: &dyn ImageCache,
    filters: &FilterPipeline,
) -> MosaicResult<RenderStats> {
    request.validate()?;
    if (canvas.width(), canvas.height()) != (request.width, request.height) {
        return Err(MosaicError::validation(format!(
            "canvas is {}x{} but request asks for {}x{}",
            canvas.width(),
            canvas.height(),
            request.width,
            request.height
        )));
    }
    let chains = tiles
        .iter()
        .map(|t| {
            t.validate()?;
            t.transform_chain()
        })
        .collect::<MosaicResult<Vec<_>>>()?;
    let pool = build_thread_pool(request.num_threads)?;

    if let Some(rgb) = request.background_rgb {
        canvas.fill_rgb(rgb);
    }

    let ctx = TileContext {
        request,
        cache,
        filters,
        pool: &pool,
        sampler: request.sampler(),
    };
    let started = Instant::now();
    let mut stats = RenderStats {
        tiles_total: tiles.len(),
        ..RenderStats::default()
    };
    for (tile, chain) in tiles.iter().zip(&chains) {
        match ctx.render_tile(tile, chain, canvas)? {
            TileOutcome::Painted => stats.tiles_rendered += 1,
            TileOutcome::Skipped => stats.tiles_skipped += 1,
        }
    }

    tracing::debug!(
        rendered = stats.tiles_rendered,
        skipped = stats.tiles_skipped,
        cache_size = cache.size(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "render finished"
    );
    Ok(stats)
}

/// Build the resampler worker pool.
pub(crate) fn build_thread_pool(threads: usize) -> MosaicResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(MosaicError::validation("num_threads must be >= 1"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| MosaicError::resample(format!("failed to build rayon thread pool: {e}")))
}

enum TileOutcome {
    Painted,
    Skipped,
}

struct TileContext<'a> {
    request: &'a RenderRequest,
    cache: &'a dyn ImageCache,
    filters: &'a FilterPipeline,
    pool: &'a rayon::ThreadPool,
    sampler: &'static dyn Sampler,
}

impl TileContext<'_> {
    fn render_tile(
        &self,
        tile: &TileSpec,
        chain: &TransformChain,
        canvas: &mut Canvas,
    ) -> MosaicResult<TileOutcome> {
        let req = self.request;
        let t0 = Instant::now();

        if tile.width == Some(0) || tile.height == Some(0) {
            tracing::debug!(tile = %tile.tile_id, "skipping tile with declared zero size");
            return Ok(TileOutcome::Skipped);
        }

        let (first_level, first) = tile.first_mipmap_entry().ok_or_else(|| {
            MosaicError::validation(format!("tile '{}' has no mipmap levels", tile.tile_id))
        })?;
        let mut probed: Option<Arc<Raster>> = None;
        let (width, height) = match (tile.width, tile.height) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                let r = self.cache.get(&first.image_url, 0, false)?;
                let dims = r.dimensions();
                probed = Some(r);
                dims
            }
        };
        if width == 0 || height == 0 {
            tracing::debug!(tile = %tile.tile_id, url = %first.image_url, "skipping zero pixel size tile");
            return Ok(TileOutcome::Skipped);
        }

        let world = chain.with_canvas_alignment(req.x, req.y, req.scale, req.area_offset);
        let level = select_level(&world, width, height, req.mesh_cell_size, &tile.mipmap_levels)?;
        let entry = tile.mipmap_levels.get(&level.stored_level).ok_or_else(|| {
            MosaicError::validation(format!(
                "tile '{}' lost pyramid level {}",
                tile.tile_id, level.stored_level
            ))
        })?;

        let mut source = match probed {
            Some(r) if level.stored_level == first_level && level.extra_downsample == 0 => r,
            _ => self
                .cache
                .get(&entry.image_url, level.extra_downsample, false)?,
        };
        let t_load = t0.elapsed();
        if source.is_empty() {
            tracing::debug!(tile = %tile.tile_id, url = %entry.image_url, "skipping zero pixel size mipmap");
            return Ok(TileOutcome::Skipped);
        }

        let t1 = Instant::now();
        if req.do_filter && !self.filters.is_empty() {
            self.filters
                .apply(Arc::make_mut(&mut source), level.effective_scale())?;
        }
        let t_filter = t1.elapsed();

        let mask = match &entry.mask_url {
            Some(url) => Some(self.cache.get(url, level.extra_downsample, true)?),
            None => None,
        };

        let t2 = Instant::now();
        let mut mesh_chain = TransformChain::new();
        mesh_chain.push_affine(scale_level_transform(level.effective_level));
        let mesh_chain = mesh_chain.concat(&world);
        let mesh = TransformMesh::new(
            &mesh_chain,
            mesh_resolution(f64::from(width), req.mesh_cell_size),
            f64::from(source.width),
            f64::from(source.height),
        )?;
        let t_mesh = t2.elapsed();

        let t3 = Instant::now();
        let mapped = MeshResampler::new(&mesh, self.pool).map(
            SourceImage {
                raster: &source,
                mask: mask.as_deref(),
            },
            canvas.width(),
            canvas.height(),
            self.sampler,
        )?;
        if let Some(m) = &mask
            && mapped.mask.is_none()
        {
            tracing::warn!(
                tile = %tile.tile_id,
                image = ?source.dimensions(),
                mask = ?m.dimensions(),
                "removing mask because image and mask differ in size"
            );
        }
        let t_map = t3.elapsed();

        let t4 = Instant::now();
        let image = compose_tile_image(
            &mapped.raster,
            tile.min_intensity,
            tile.max_intensity,
            mapped.mask.as_deref(),
            &mapped.outside,
            req.binary_mask,
        )?;
        let t_compose = t4.elapsed();

        let t5 = Instant::now();
        canvas.paint_over(&image)?;
        let t_paint = t5.elapsed();

        tracing::debug!(
            tile = %tile.tile_id,
            stored_level = level.stored_level,
            downsample_levels = level.extra_downsample,
            effective_level = level.effective_level,
            load_ms = t_load.as_millis() as u64,
            filter_ms = t_filter.as_millis() as u64,
            mesh_ms = t_mesh.as_millis() as u64,
            map_ms = t_map.as_millis() as u64,
            compose_ms = t_compose.as_millis() as u64,
            paint_ms = t_paint.as_millis() as u64,
            cache_size = self.cache.size(),
            "rendered tile"
        );
        Ok(TileOutcome::Painted)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
