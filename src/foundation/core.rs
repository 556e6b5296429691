pub use kurbo::{Affine, Point, Rect, Vec2};

/// Premultiplied RGBA8 pixel (r,g,b already multiplied by a).
pub type PremulRgba8 = [u8; 4];

/// Convert straight-alpha RGBA8 into premultiplied RGBA8.
pub fn premultiply(rgba: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(rgba[3]);
    [
        mul_div255(u16::from(rgba[0]), a),
        mul_div255(u16::from(rgba[1]), a),
        mul_div255(u16::from(rgba[2]), a),
        rgba[3],
    ]
}

/// Convert premultiplied RGBA8 back to straight alpha.
///
/// Fully transparent pixels become transparent black.
pub fn unpremultiply(px: PremulRgba8) -> [u8; 4] {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| -> u8 { ((u32::from(c) * 255 + a / 2) / a).min(255) as u8 };
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

/// Parse a `RRGGBB` (optionally `#`-prefixed) hex color.
pub fn parse_rgb_hex(s: &str) -> Option<[u8; 3]> {
    let s = s.trim().trim_start_matches('#');
    if s.len() != 6 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let v = u32::from_str_radix(s, 16).ok()?;
    Some([(v >> 16) as u8, (v >> 8) as u8, v as u8])
}

fn mul_div255(x: u16, y: u16) -> u8 {
    crate::foundation::math::mul_div255_u8(x, y)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
