use std::collections::BTreeMap;

use crate::foundation::core::Rect;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::mesh::triangulation::{TransformMesh, mesh_resolution};
use crate::transform::chain::TransformChain;
use crate::transform::spec::TransformSpec;

/// Image source locator plus an optional mask locator with the same geometry.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageAndMask {
    /// Path or `file://` URL of the image.
    pub image_url: String,
    /// Path or `file://` URL of the mask, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_url: Option<String>,
}

impl ImageAndMask {
    /// Image without a mask.
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            mask_url: None,
        }
    }

    /// Attach a mask locator.
    pub fn with_mask(mut self, mask_url: impl Into<String>) -> Self {
        self.mask_url = Some(mask_url.into());
        self
    }
}

fn default_max_intensity() -> f64 {
    255.0
}

/// One tile: a multi-resolution image, its transform chain, and its display range.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TileSpec {
    /// Identifier, unique within a collection.
    pub tile_id: String,
    /// Section (layer) coordinate, informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Full-resolution width in pixels; `None` when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Full-resolution height in pixels; `None` when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Intensity mapped to black.
    #[serde(default)]
    pub min_intensity: f64,
    /// Intensity mapped to white.
    #[serde(default = "default_max_intensity")]
    pub max_intensity: f64,
    /// Sparse pyramid: level (0 = full resolution) to image/mask.
    pub mipmap_levels: BTreeMap<u32, ImageAndMask>,
    /// Transform chain from tile pixels to world coordinates, applied left to right.
    #[serde(default)]
    pub transforms: Vec<TransformSpec>,
    /// World-space bounding box, once derived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
}

impl TileSpec {
    /// Tile with a single full-resolution image, identity transform, and `[0, 255]` display range.
    pub fn new(tile_id: impl Into<String>, image: ImageAndMask) -> Self {
        let mut mipmap_levels = BTreeMap::new();
        mipmap_levels.insert(0, image);
        Self {
            tile_id: tile_id.into(),
            z: None,
            width: None,
            height: None,
            min_intensity: 0.0,
            max_intensity: default_max_intensity(),
            mipmap_levels,
            transforms: Vec::new(),
            bounds: None,
        }
    }

    /// Declare full-resolution dimensions.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Add or replace a pyramid level.
    pub fn with_level(mut self, level: u32, image: ImageAndMask) -> Self {
        self.mipmap_levels.insert(level, image);
        self
    }

    /// Append a transform to the chain.
    pub fn with_transform(mut self, spec: TransformSpec) -> Self {
        self.transforms.push(spec);
        self
    }

    /// Set the display intensity range.
    pub fn with_intensity_range(mut self, min: f64, max: f64) -> Self {
        self.min_intensity = min;
        self.max_intensity = max;
        self
    }

    /// Return `true` when both dimensions are declared.
    pub fn has_width_and_height(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }

    /// Lowest stored pyramid level.
    pub fn first_mipmap_entry(&self) -> Option<(u32, &ImageAndMask)> {
        self.mipmap_levels.iter().next().map(|(k, v)| (*k, v))
    }

    /// Greatest stored level `<= level`.
    pub fn floor_mipmap_entry(&self, level: u32) -> Option<(u32, &ImageAndMask)> {
        self.mipmap_levels
            .range(..=level)
            .next_back()
            .map(|(k, v)| (*k, v))
    }

    /// Build the resolved transform chain. Unresolved references are an error.
    pub fn transform_chain(&self) -> MosaicResult<TransformChain> {
        TransformChain::from_specs(&self.transforms).map_err(|e| match e {
            MosaicError::Transform(msg) => {
                MosaicError::transform(format!("tile '{}': {msg}", self.tile_id))
            }
            other => other,
        })
    }

    /// Structural checks that do not touch any image source.
    pub fn validate(&self) -> MosaicResult<()> {
        if self.mipmap_levels.is_empty() {
            return Err(MosaicError::validation(format!(
                "tile '{}' has no mipmap levels",
                self.tile_id
            )));
        }
        if !self.min_intensity.is_finite() || !self.max_intensity.is_finite() {
            return Err(MosaicError::validation(format!(
                "tile '{}' intensity range must be finite",
                self.tile_id
            )));
        }
        if self.min_intensity > self.max_intensity {
            return Err(MosaicError::validation(format!(
                "tile '{}' min_intensity must be <= max_intensity",
                self.tile_id
            )));
        }
        Ok(())
    }

    /// Compute the world-space bounding box at the given mesh cell size and store it.
    ///
    /// An already stored box is returned unchanged unless `force` is set. Both dimensions must be
    /// declared.
    pub fn derive_bounding_box(&mut self, mesh_cell_size: f64, force: bool) -> MosaicResult<Rect> {
        if !force && let Some(b) = self.bounds {
            return Ok(b);
        }
        let (Some(w), Some(h)) = (self.width, self.height) else {
            return Err(MosaicError::validation(format!(
                "tile '{}' needs width and height to derive its bounding box",
                self.tile_id
            )));
        };
        if w == 0 || h == 0 {
            return Err(MosaicError::validation(format!(
                "tile '{}' has zero size {w}x{h}",
                self.tile_id
            )));
        }
        if !mesh_cell_size.is_finite() || mesh_cell_size <= 0.0 {
            return Err(MosaicError::validation(
                "mesh_cell_size must be finite and > 0",
            ));
        }
        let chain = self.transform_chain()?;
        let mesh = TransformMesh::new(
            &chain,
            mesh_resolution(f64::from(w), mesh_cell_size),
            f64::from(w),
            f64::from(h),
        )?;
        let b = mesh.bounds();
        self.bounds = Some(b);
        Ok(b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/tile_spec.rs"]
mod tests;
