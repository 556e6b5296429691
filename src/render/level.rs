use std::collections::BTreeMap;

use crate::foundation::error::{MosaicError, MosaicResult};
use crate::transform::chain::TransformChain;
use crate::transform::fit::{best_mipmap_level, sample_average_scale};

/// Pyramid level chosen for one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelChoice {
    /// Level the output scale calls for.
    pub desired_level: u32,
    /// Stored level that will be loaded.
    pub stored_level: u32,
    /// Extra 2x2 halvings applied at load time.
    pub extra_downsample: u32,
    /// `stored_level + extra_downsample`.
    pub effective_level: u32,
}

impl LevelChoice {
    /// `1 / 2^effective_level`.
    pub fn effective_scale(&self) -> f64 {
        1.0 / 2f64.powi(self.effective_level as i32)
    }
}

/// Resolve `desired` against a sparse pyramid with a floor lookup.
///
/// When no stored level is `<= desired`, the smallest stored level is used as is.
pub fn resolve_level<V>(pyramid: &BTreeMap<u32, V>, desired: u32) -> MosaicResult<LevelChoice> {
    if let Some((&stored, _)) = pyramid.range(..=desired).next_back() {
        return Ok(LevelChoice {
            desired_level: desired,
            stored_level: stored,
            extra_downsample: desired - stored,
            effective_level: desired,
        });
    }
    let (&stored, _) = pyramid
        .iter()
        .next()
        .ok_or_else(|| MosaicError::validation("pyramid has no stored levels"))?;
    Ok(LevelChoice {
        desired_level: desired,
        stored_level: stored,
        extra_downsample: 0,
        effective_level: stored,
    })
}

/// Estimate the output scale of `chain` over a `width` x `height` tile and pick a pyramid level.
pub fn select_level<V>(
    chain: &TransformChain,
    width: u32,
    height: u32,
    mesh_cell_size: f64,
    pyramid: &BTreeMap<u32, V>,
) -> MosaicResult<LevelChoice> {
    let s = sample_average_scale(chain, f64::from(width), f64::from(height), mesh_cell_size)?;
    resolve_level(pyramid, best_mipmap_level(s)?)
}

#[cfg(test)]
#[path = "../../tests/unit/render/level.rs"]
mod tests;
