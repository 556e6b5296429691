use crate::foundation::core::{Affine, Point};
use crate::foundation::error::MosaicResult;
use crate::transform::coordinate::CoordinateTransform;
use crate::transform::spec::TransformSpec;

/// Ordered list of coordinate transforms, applied strictly left to right.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformChain {
    transforms: Vec<CoordinateTransform>,
}

impl TransformChain {
    /// Empty (identity) chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a list of specs into a chain. Unresolved references are an error.
    pub fn from_specs(specs: &[TransformSpec]) -> MosaicResult<Self> {
        let mut chain = Self::new();
        for s in specs {
            s.append_to(&mut chain)?;
        }
        Ok(chain)
    }

    /// Append a transform at the end of the chain.
    pub fn push(&mut self, t: CoordinateTransform) {
        self.transforms.push(t);
    }

    /// Append an affine transform at the end of the chain.
    pub fn push_affine(&mut self, a: Affine) {
        self.push(CoordinateTransform::Affine(a));
    }

    /// Append every transform of `other`, preserving order.
    pub fn concat(mut self, other: &TransformChain) -> Self {
        self.transforms.extend(other.transforms.iter().cloned());
        self
    }

    /// Map a point through every transform in order.
    pub fn apply(&self, p: Point) -> Point {
        self.transforms.iter().fold(p, |q, t| t.apply(q))
    }

    /// Number of transforms in the chain.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Return `true` for the identity chain.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Transforms in application order.
    pub fn transforms(&self) -> &[CoordinateTransform] {
        &self.transforms
    }

    /// This chain followed by the world-to-canvas alignment for the given viewport.
    pub fn with_canvas_alignment(&self, x: f64, y: f64, scale: f64, area_offset: bool) -> Self {
        let mut out = self.clone();
        out.push_affine(canvas_alignment(x, y, scale, area_offset));
        out
    }
}

/// Affine mapping world coordinates to canvas pixels for a viewport at `(x, y)` and `scale`.
///
/// With `area_offset`, sample centers rather than corners are aligned, which keeps renders of the
/// same world region at different scales registered to each other.
pub fn canvas_alignment(x: f64, y: f64, scale: f64, area_offset: bool) -> Affine {
    let offset = if area_offset { (1.0 - scale) * 0.5 } else { 0.0 };
    Affine::new([
        scale,
        0.0,
        0.0,
        scale,
        -(x * scale + offset),
        -(y * scale + offset),
    ])
}

/// Affine mapping pixel coordinates of pyramid level `level` to level-0 pixel coordinates.
pub fn scale_level_transform(level: u32) -> Affine {
    let s = 2f64.powi(level as i32);
    let t = (s - 1.0) * 0.5;
    Affine::new([s, 0.0, 0.0, s, t, t])
}

#[cfg(test)]
#[path = "../../tests/unit/transform/chain.rs"]
mod tests;
