use crate::assets::raster::Raster;

/// Reads a source raster at a fractional position.
///
/// Returns `None` when the position falls outside the raster's pixel area
/// (`[-0.5, w - 0.5) x [-0.5, h - 0.5)` in pixel-center coordinates).
pub trait Sampler: Send + Sync {
    /// Sample `raster` at `(x, y)`.
    fn sample(&self, raster: &Raster, x: f64, y: f64) -> Option<f32>;
}

/// Nearest-neighbor lookup.
#[derive(Clone, Copy, Debug, Default)]
pub struct NearestSampler;

/// Bilinear interpolation, edge pixels clamped.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterpolatedSampler;

fn inside(raster: &Raster, x: f64, y: f64) -> bool {
    x >= -0.5 && y >= -0.5 && x < f64::from(raster.width) - 0.5 && y < f64::from(raster.height) - 0.5
}

impl Sampler for NearestSampler {
    fn sample(&self, raster: &Raster, x: f64, y: f64) -> Option<f32> {
        if !inside(raster, x, y) {
            return None;
        }
        let xi = (x + 0.5).floor().clamp(0.0, f64::from(raster.width - 1)) as u32;
        let yi = (y + 0.5).floor().clamp(0.0, f64::from(raster.height - 1)) as u32;
        Some(raster.get(xi, yi))
    }
}

impl Sampler for InterpolatedSampler {
    fn sample(&self, raster: &Raster, x: f64, y: f64) -> Option<f32> {
        if !inside(raster, x, y) {
            return None;
        }
        let max_x = f64::from(raster.width - 1);
        let max_y = f64::from(raster.height - 1);
        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = (x - x0) as f32;
        let fy = (y - y0) as f32;
        let (x0, y0) = (x0 as u32, y0 as u32);
        let x1 = (x0 + 1).min(raster.width - 1);
        let y1 = (y0 + 1).min(raster.height - 1);

        let top = raster.get(x0, y0) * (1.0 - fx) + raster.get(x1, y0) * fx;
        let bottom = raster.get(x0, y1) * (1.0 - fx) + raster.get(x1, y1) * fx;
        Some(top * (1.0 - fy) + bottom * fy)
    }
}

/// Sampler selected by the render request's interpolation flag.
pub fn sampler_for(skip_interpolation: bool) -> &'static dyn Sampler {
    if skip_interpolation {
        &NearestSampler
    } else {
        &InterpolatedSampler
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/sampler.rs"]
mod tests;
