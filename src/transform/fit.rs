use crate::foundation::core::{Affine, Point};
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::mesh::triangulation::MAX_MESH_VERTICES;
use crate::transform::chain::TransformChain;

/// Estimate the average scale factor of `chain` over a `width` x `height` source extent.
///
/// The chain is sampled on a grid with spacing `step` (the far edges are always included), a
/// least-squares affine model is fitted to the sample correspondences, and the square root of the
/// absolute determinant of its linear part is returned.
pub fn sample_average_scale(
    chain: &TransformChain,
    width: f64,
    height: f64,
    step: f64,
) -> MosaicResult<f64> {
    if !step.is_finite() || step <= 0.0 {
        return Err(MosaicError::validation(
            "scale sampling step must be finite and > 0",
        ));
    }
    if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
        return Err(MosaicError::validation(
            "scale sampling extent must be finite and >= 0",
        ));
    }

    let nx = axis_sample_count(width, step);
    let ny = axis_sample_count(height, step);
    let sample_count = nx
        .zip(ny)
        .and_then(|(nx, ny)| nx.checked_mul(ny))
        .filter(|n| *n <= MAX_MESH_VERTICES)
        .ok_or_else(|| {
            MosaicError::resample(format!(
                "scale sampling grid for {width}x{height} at step {step} exceeds \
                 {MAX_MESH_VERTICES} samples"
            ))
        })?;

    let xs = sample_axis(width, step);
    let ys = sample_axis(height, step);
    let mut pairs = Vec::with_capacity(sample_count);
    for &y in &ys {
        for &x in &xs {
            let p = Point::new(x, y);
            pairs.push((p, chain.apply(p)));
        }
    }

    let model = fit_affine(&pairs)?;
    let s = model.determinant().abs().sqrt();
    if !s.is_finite() {
        return Err(MosaicError::transform("estimated scale is not finite"));
    }
    Ok(s)
}

/// `floor(log2(1 / scale))`, clamped at 0.
pub fn best_mipmap_level(scale: f64) -> MosaicResult<u32> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(MosaicError::transform(format!(
            "cannot pick a pyramid level for scale {scale}"
        )));
    }
    let mut inv = (1.0 / scale).min(u64::MAX as f64) as u64;
    let mut level = 0u32;
    while inv > 1 {
        inv >>= 1;
        level += 1;
    }
    Ok(level)
}

/// Upper bound on the samples [`sample_axis`] yields, `None` past the sample budget.
fn axis_sample_count(len: f64, step: f64) -> Option<usize> {
    let n = (len / step).ceil() + 1.0;
    (n.is_finite() && n <= MAX_MESH_VERTICES as f64).then_some(n as usize)
}

fn sample_axis(len: f64, step: f64) -> Vec<f64> {
    let mut out: Vec<f64> = (0u32..)
        .map(|i| f64::from(i) * step)
        .take_while(|v| *v < len)
        .collect();
    out.push(len);
    out
}

/// Least-squares affine fit `q ≈ A·p + t` over point correspondences.
pub(crate) fn fit_affine(pairs: &[(Point, Point)]) -> MosaicResult<Affine> {
    if pairs.len() < 3 {
        return Err(MosaicError::transform(
            "affine fit needs at least three samples",
        ));
    }
    let n = pairs.len() as f64;
    let (mut px, mut py, mut qx, mut qy) = (0.0, 0.0, 0.0, 0.0);
    for (p, q) in pairs {
        px += p.x;
        py += p.y;
        qx += q.x;
        qy += q.y;
    }
    px /= n;
    py /= n;
    qx /= n;
    qy /= n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    let (mut ux, mut uy, mut vx, mut vy) = (0.0, 0.0, 0.0, 0.0);
    for (p, q) in pairs {
        let (dx, dy) = (p.x - px, p.y - py);
        let (ex, ey) = (q.x - qx, q.y - qy);
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
        ux += ex * dx;
        uy += ex * dy;
        vx += ey * dx;
        vy += ey * dy;
    }

    let det = sxx * syy - sxy * sxy;
    if !det.is_finite() || det <= 1e-12 * (sxx * syy).max(f64::MIN_POSITIVE) {
        return Err(MosaicError::transform(
            "affine fit samples are collinear",
        ));
    }

    let a00 = (ux * syy - uy * sxy) / det;
    let a01 = (uy * sxx - ux * sxy) / det;
    let a10 = (vx * syy - vy * sxy) / det;
    let a11 = (vy * sxx - vx * sxy) / det;
    let tx = qx - (a00 * px + a01 * py);
    let ty = qy - (a10 * px + a11 * py);

    let coeffs = [a00, a10, a01, a11, tx, ty];
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(MosaicError::transform("affine fit produced non-finite model"));
    }
    Ok(Affine::new(coeffs))
}

#[cfg(test)]
#[path = "../../tests/unit/transform/fit.rs"]
mod tests;
