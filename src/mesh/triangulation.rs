use crate::foundation::core::{Affine, Point, Rect};
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::transform::chain::TransformChain;

const DEGENERATE_DET: f64 = 1e-12;

/// Upper bound on mesh vertices for one tile.
pub(crate) const MAX_MESH_VERTICES: usize = 1 << 24;

/// Number of mesh cells across a `width`-pixel source for the given cell size, at least one.
pub fn mesh_resolution(width: f64, mesh_cell_size: f64) -> u32 {
    let r = (width / mesh_cell_size).round();
    if r.is_finite() && r >= 1.0 {
        r.min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

/// One mesh triangle, stored as the pair of affines that take a target point to source space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshTriangle {
    /// Vertices in source (tile pixel) space.
    pub source: [Point; 3],
    /// Vertices in target (canvas pixel) space.
    pub target: [Point; 3],
    target_to_unit: Affine,
    unit_to_source: Affine,
}

impl MeshTriangle {
    fn new(source: [Point; 3], target: [Point; 3]) -> Option<Self> {
        let mt = basis(target);
        if mt.determinant().abs() < DEGENERATE_DET {
            return None;
        }
        Some(Self {
            source,
            target,
            target_to_unit: mt.inverse(),
            unit_to_source: basis(source),
        })
    }

    /// Source point for target point `p` when `p` lies inside the triangle (within `eps` in
    /// barycentric units).
    pub fn source_of(&self, p: Point, eps: f64) -> Option<Point> {
        let u = self.target_to_unit * p;
        if u.x >= -eps && u.y >= -eps && u.x + u.y <= 1.0 + eps {
            Some(self.unit_to_source * u)
        } else {
            None
        }
    }

    /// Axis-aligned bounds of the target triangle.
    pub fn target_bounds(&self) -> Rect {
        bounds_of(&self.target)
    }
}

fn basis(v: [Point; 3]) -> Affine {
    Affine::new([
        v[1].x - v[0].x,
        v[1].y - v[0].y,
        v[2].x - v[0].x,
        v[2].y - v[0].y,
        v[0].x,
        v[0].y,
    ])
}

fn bounds_of(points: &[Point]) -> Rect {
    let mut r = Rect::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for p in points {
        r.x0 = r.x0.min(p.x);
        r.y0 = r.y0.min(p.y);
        r.x1 = r.x1.max(p.x);
        r.y1 = r.y1.max(p.y);
    }
    r
}

/// Regular grid over a `width` x `height` source, every vertex pushed through a transform chain,
/// each cell split into two triangles.
#[derive(Clone, Debug)]
pub struct TransformMesh {
    cols: u32,
    rows: u32,
    vertices: Vec<Point>,
    triangles: Vec<MeshTriangle>,
}

impl TransformMesh {
    /// Build a mesh with `resolution` cells across and square-ish cells down.
    ///
    /// Triangles whose target is degenerate are dropped from the mapping but their vertices still
    /// count toward [`TransformMesh::bounds`].
    pub fn new(
        chain: &TransformChain,
        resolution: u32,
        width: f64,
        height: f64,
    ) -> MosaicResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(MosaicError::resample(format!(
                "mesh extent must be positive, got {width}x{height}"
            )));
        }
        let cols = resolution.max(1);
        let cell = width / f64::from(cols);
        let rows = ((height / cell).round().max(1.0)).min(f64::from(u32::MAX)) as u32;

        let vertex_count = (cols as usize + 1)
            .checked_mul(rows as usize + 1)
            .filter(|n| *n <= MAX_MESH_VERTICES)
            .ok_or_else(|| {
                MosaicError::resample(format!(
                    "mesh grid {cols}x{rows} exceeds {MAX_MESH_VERTICES} vertices"
                ))
            })?;

        let mut sources = Vec::with_capacity(vertex_count);
        let mut vertices = Vec::with_capacity(vertex_count);
        for j in 0..=rows {
            let y = height * f64::from(j) / f64::from(rows);
            for i in 0..=cols {
                let x = width * f64::from(i) / f64::from(cols);
                let s = Point::new(x, y);
                let t = chain.apply(s);
                if !(t.x.is_finite() && t.y.is_finite()) {
                    return Err(MosaicError::resample(format!(
                        "transform maps mesh vertex ({x}, {y}) to a non-finite point"
                    )));
                }
                sources.push(s);
                vertices.push(t);
            }
        }

        let stride = (cols + 1) as usize;
        let mut triangles = Vec::with_capacity(2 * cols as usize * rows as usize);
        for j in 0..rows as usize {
            for i in 0..cols as usize {
                let v00 = j * stride + i;
                let v10 = v00 + 1;
                let v01 = v00 + stride;
                let v11 = v01 + 1;
                for [a, b, c] in [[v00, v10, v11], [v00, v11, v01]] {
                    if let Some(t) = MeshTriangle::new(
                        [sources[a], sources[b], sources[c]],
                        [vertices[a], vertices[b], vertices[c]],
                    ) {
                        triangles.push(t);
                    }
                }
            }
        }

        Ok(Self {
            cols,
            rows,
            vertices,
            triangles,
        })
    }

    /// `(cols, rows)` of the grid.
    pub fn grid(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    /// Non-degenerate triangles.
    pub fn triangles(&self) -> &[MeshTriangle] {
        &self.triangles
    }

    /// Target-space bounds of every mesh vertex.
    pub fn bounds(&self) -> Rect {
        bounds_of(&self.vertices)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/triangulation.rs"]
mod tests;
