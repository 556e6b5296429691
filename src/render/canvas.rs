use crate::foundation::core::{PremulRgba8, unpremultiply};
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::compose::TileImage;
use crate::render::request::RenderRequest;

/// Output raster of a render call, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// Fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Transparent canvas sized for `request`.
    pub fn for_request(request: &RenderRequest) -> Self {
        Self::new(request.width, request.height)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at `(x, y)`, premultiplied.
    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Overwrite every pixel with an opaque color.
    pub fn fill_rgb(&mut self, rgb: [u8; 3]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
    }

    /// Source-over `tile` onto the canvas.
    pub fn paint_over(&mut self, tile: &TileImage) -> MosaicResult<()> {
        if (tile.width, tile.height) != (self.width, self.height)
            || tile.data.len() != self.data.len()
        {
            return Err(MosaicError::validation(format!(
                "tile image {}x{} does not match canvas {}x{}",
                tile.width, tile.height, self.width, self.height
            )));
        }
        for (d, s) in self.data.chunks_exact_mut(4).zip(tile.data.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
        Ok(())
    }

    /// Straight-alpha RGBA8 copy, suitable for encoding.
    pub fn to_rgba8_straight(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&unpremultiply([px[0], px[1], px[2], px[3]]));
        }
        out
    }
}

fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => dst,
        255 => src,
        sa => {
            let inv = 255u16 - u16::from(sa);
            let mut out = [0u8; 4];
            for i in 0..4 {
                out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
            }
            out
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
