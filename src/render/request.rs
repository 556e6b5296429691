use crate::foundation::core::Rect;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::mesh::sampler::{Sampler, sampler_for};

/// Parameters of one render call. Immutable for its duration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderRequest {
    /// Viewport origin, world x.
    pub x: f64,
    /// Viewport origin, world y.
    pub y: f64,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Output pixels per world unit.
    pub scale: f64,
    /// Desired mesh triangle edge length in source pixels.
    pub mesh_cell_size: f64,
    /// Align sample centers rather than corners.
    pub area_offset: bool,
    /// Use nearest-neighbor sampling.
    pub skip_interpolation: bool,
    /// Run the filter pipeline on each loaded raster.
    pub do_filter: bool,
    /// Threshold mask alpha to fully opaque or fully transparent.
    pub binary_mask: bool,
    /// Opaque fill applied before the first tile.
    pub background_rgb: Option<[u8; 3]>,
    /// Resampler worker threads.
    pub num_threads: usize,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 256,
            height: 256,
            scale: 1.0,
            mesh_cell_size: 64.0,
            area_offset: false,
            skip_interpolation: false,
            do_filter: false,
            binary_mask: false,
            background_rgb: None,
            num_threads: 1,
        }
    }
}

impl RenderRequest {
    /// Request for a `width` x `height` canvas at `(x, y)` and `scale`, other fields default.
    pub fn new(x: f64, y: f64, width: u32, height: u32, scale: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            scale,
            ..Self::default()
        }
    }

    /// Check the request before any tile is touched.
    pub fn validate(&self) -> MosaicResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MosaicError::validation(format!(
                "canvas must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(MosaicError::validation("viewport origin must be finite"));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(MosaicError::validation(format!(
                "scale must be finite and > 0, got {}",
                self.scale
            )));
        }
        if !self.mesh_cell_size.is_finite() || self.mesh_cell_size <= 0.0 {
            return Err(MosaicError::validation(format!(
                "mesh_cell_size must be finite and > 0, got {}",
                self.mesh_cell_size
            )));
        }
        if self.num_threads == 0 {
            return Err(MosaicError::validation("num_threads must be >= 1"));
        }
        Ok(())
    }

    /// Sampler selected by `skip_interpolation`.
    pub fn sampler(&self) -> &'static dyn Sampler {
        sampler_for(self.skip_interpolation)
    }

    /// World-space rectangle covered by the canvas.
    pub fn world_bounds(&self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.x + f64::from(self.width) / self.scale,
            self.y + f64::from(self.height) / self.scale,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/request.rs"]
mod tests;
