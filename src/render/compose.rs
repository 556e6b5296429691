use crate::assets::raster::Raster;
use crate::foundation::core::PremulRgba8;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::foundation::math::mul_div255_u8;

/// One tile's finished image in canvas space, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major.
    pub data: Vec<u8>,
}

impl TileImage {
    /// Pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// Map `v` linearly from `[min, max]` to `0..=255`, clamping outside the range.
///
/// A collapsed range thresholds at `max`.
pub fn rescale_intensity(v: f32, min: f64, max: f64) -> u8 {
    let v = f64::from(v);
    if max <= min {
        return if v >= max { 255 } else { 0 };
    }
    ((v - min) / (max - min) * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Build a gray tile image from resampled intensities and an alpha source.
///
/// Alpha comes from `mask` when present, else from `outside`. With `binary_mask`, only alpha 255
/// stays opaque and everything else becomes transparent.
pub fn compose_tile_image(
    raster: &Raster,
    min_intensity: f64,
    max_intensity: f64,
    mask: Option<&[u8]>,
    outside: &[u8],
    binary_mask: bool,
) -> MosaicResult<TileImage> {
    let n = raster.pixel_count();
    let alpha = mask.unwrap_or(outside);
    if alpha.len() != n {
        return Err(MosaicError::resample(format!(
            "alpha source has {} pixels, raster has {n}",
            alpha.len()
        )));
    }

    let mut data = vec![0u8; n * 4];
    for ((px, &v), &a) in data.chunks_exact_mut(4).zip(&raster.pixels).zip(alpha) {
        let a = if binary_mask {
            if a == 255 { 255 } else { 0 }
        } else {
            a
        };
        if a == 0 {
            continue;
        }
        let gray = rescale_intensity(v, min_intensity, max_intensity);
        let g = mul_div255_u8(u16::from(gray), u16::from(a));
        px.copy_from_slice(&[g, g, g, a]);
    }

    Ok(TileImage {
        width: raster.width,
        height: raster.height,
        data,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
