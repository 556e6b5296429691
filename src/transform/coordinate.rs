use crate::foundation::core::{Affine, Point};
use crate::foundation::error::{MosaicError, MosaicResult};

/// A resolved 2D coordinate transform.
#[derive(Clone, Debug, PartialEq)]
pub enum CoordinateTransform {
    /// Affine map.
    Affine(Affine),
    /// Non-affine polynomial map.
    Polynomial(Polynomial2D),
}

impl CoordinateTransform {
    /// Map a point.
    pub fn apply(&self, p: Point) -> Point {
        match self {
            Self::Affine(a) => *a * p,
            Self::Polynomial(poly) => poly.apply(p),
        }
    }
}

/// 2D polynomial transform of order `n >= 1`.
///
/// Coefficients are ordered by total degree, then by decreasing power of `x`:
/// `1, x, y, x², xy, y², x³, x²y, …`. Each coefficient list therefore has `(n+1)(n+2)/2` entries.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial2D {
    order: u32,
    x_coeffs: Vec<f64>,
    y_coeffs: Vec<f64>,
}

impl Polynomial2D {
    /// Build a validated polynomial from its `x'` and `y'` coefficient lists.
    pub fn new(x_coeffs: Vec<f64>, y_coeffs: Vec<f64>) -> MosaicResult<Self> {
        if x_coeffs.len() != y_coeffs.len() {
            return Err(MosaicError::transform(
                "polynomial x and y coefficient counts differ",
            ));
        }
        let order = order_for_len(x_coeffs.len()).ok_or_else(|| {
            MosaicError::transform(format!(
                "polynomial coefficient count {} is not (n+1)(n+2)/2 for any order n >= 1",
                x_coeffs.len()
            ))
        })?;
        if x_coeffs.iter().chain(&y_coeffs).any(|c| !c.is_finite()) {
            return Err(MosaicError::transform(
                "polynomial coefficients must be finite",
            ));
        }
        Ok(Self {
            order,
            x_coeffs,
            y_coeffs,
        })
    }

    /// Polynomial order `n`.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Map a point.
    pub fn apply(&self, p: Point) -> Point {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut i = 0usize;
        for d in 0..=self.order {
            for j in 0..=d {
                let term = p.x.powi((d - j) as i32) * p.y.powi(j as i32);
                x += self.x_coeffs[i] * term;
                y += self.y_coeffs[i] * term;
                i += 1;
            }
        }
        Point::new(x, y)
    }
}

fn order_for_len(len: usize) -> Option<u32> {
    let mut n = 1u32;
    loop {
        let expected = ((n as usize) + 1) * ((n as usize) + 2) / 2;
        if expected == len {
            return Some(n);
        }
        if expected > len {
            return None;
        }
        n += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/coordinate.rs"]
mod tests;
