use crate::assets::decode::load_raster;
use crate::foundation::core::Rect;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::tiles::tile_spec::TileSpec;

/// Derive `tile`'s world bounding box, probing its lowest pyramid image (uncached, full decode)
/// when width or height is unknown. Stores the probed size and the box on the tile.
pub fn derive_bounding_box(
    tile: &mut TileSpec,
    mesh_cell_size: f64,
    force: bool,
) -> MosaicResult<Rect> {
    derive_bounding_box_with(tile, mesh_cell_size, force, |url| {
        Ok(load_raster(url, 0, false)?.dimensions())
    })
}

/// [`derive_bounding_box`] with a custom dimension probe.
pub fn derive_bounding_box_with(
    tile: &mut TileSpec,
    mesh_cell_size: f64,
    force: bool,
    probe: impl FnOnce(&str) -> MosaicResult<(u32, u32)>,
) -> MosaicResult<Rect> {
    if !tile.has_width_and_height() {
        let (_, first) = tile.first_mipmap_entry().ok_or_else(|| {
            MosaicError::validation(format!("tile '{}' has no mipmap levels", tile.tile_id))
        })?;
        let (w, h) = probe(&first.image_url)?;
        tracing::debug!(tile = %tile.tile_id, width = w, height = h, "probed tile size");
        tile.width = Some(w);
        tile.height = Some(h);
    }
    tile.derive_bounding_box(mesh_cell_size, force)
}

#[cfg(test)]
#[path = "../../tests/unit/render/bounds.rs"]
mod tests;
