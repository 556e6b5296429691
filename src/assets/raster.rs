use crate::foundation::error::{MosaicError, MosaicResult};

/// Single-channel raster, row-major, tightly packed.
///
/// Image rasters keep their source intensity values (8-bit or 16-bit range). Mask rasters hold
/// values in `0..=255`.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel values, `width * height` entries.
    pub pixels: Vec<f32>,
}

impl Raster {
    /// Zero-filled raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0.0)
    }

    /// Raster with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; (width as usize) * (height as usize)],
        }
    }

    /// Wrap existing pixel values, checking the buffer length.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<f32>) -> MosaicResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| MosaicError::validation("raster size overflow"))?;
        if pixels.len() != expected {
            return Err(MosaicError::validation(format!(
                "raster expects {expected} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Return `true` when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Value at `(x, y)`. Panics when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.pixels[self.index(x, y)]
    }

    /// Set the value at `(x, y)`. Panics when out of bounds.
    pub fn set(&mut self, x: u32, y: u32, v: f32) {
        let i = self.index(x, y);
        self.pixels[i] = v;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Halve both dimensions (floor) by averaging 2x2 blocks.
    pub fn downsampled(&self) -> Self {
        let w = self.width / 2;
        let h = self.height / 2;
        let mut out = Self::new(w, h);
        let src_w = self.width as usize;
        for y in 0..h as usize {
            let r0 = 2 * y * src_w;
            let r1 = r0 + src_w;
            for x in 0..w as usize {
                let c = 2 * x;
                let sum = self.pixels[r0 + c]
                    + self.pixels[r0 + c + 1]
                    + self.pixels[r1 + c]
                    + self.pixels[r1 + c + 1];
                out.pixels[y * (w as usize) + x] = sum * 0.25;
            }
        }
        out
    }

    /// Apply [`Raster::downsampled`] `levels` times.
    pub fn downsampled_by(self, levels: u32) -> Self {
        let mut out = self;
        for _ in 0..levels {
            if out.is_empty() {
                break;
            }
            out = out.downsampled();
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/raster.rs"]
mod tests;
