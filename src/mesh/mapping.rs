use rayon::prelude::*;

use crate::assets::raster::Raster;
use crate::foundation::core::Point;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::mesh::sampler::Sampler;
use crate::mesh::triangulation::{MeshTriangle, TransformMesh};

const INSIDE_EPS: f64 = 1e-9;

/// Source raster and its optional mask for one mapping pass.
#[derive(Clone, Copy, Debug)]
pub struct SourceImage<'a> {
    /// Intensity raster.
    pub raster: &'a Raster,
    /// Mask raster; ignored when its dimensions differ from `raster`.
    pub mask: Option<&'a Raster>,
}

/// Target-space result of [`MeshResampler::map`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResampleOutput {
    /// Resampled intensities; zero where nothing was mapped.
    pub raster: Raster,
    /// Resampled mask values, `None` when no usable mask was supplied.
    pub mask: Option<Vec<u8>>,
    /// 255 where the mesh mapped a source sample, 0 elsewhere.
    pub outside: Vec<u8>,
}

/// Maps a source raster into a target of fixed size through a [`TransformMesh`].
///
/// Target rows are split into bands that are filled in parallel on the supplied pool. Where
/// triangles overlap, the first triangle (in mesh order) that covers a pixel wins.
pub struct MeshResampler<'a> {
    mesh: &'a TransformMesh,
    pool: &'a rayon::ThreadPool,
}

impl<'a> MeshResampler<'a> {
    /// Resampler over `mesh`, running on `pool`.
    pub fn new(mesh: &'a TransformMesh, pool: &'a rayon::ThreadPool) -> Self {
        Self { mesh, pool }
    }

    /// Resample `source` into a `width` x `height` target.
    pub fn map(
        &self,
        source: SourceImage<'_>,
        width: u32,
        height: u32,
        sampler: &dyn Sampler,
    ) -> MosaicResult<ResampleOutput> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| MosaicError::resample("target size overflow"))?;
        let mask = source
            .mask
            .filter(|m| m.dimensions() == source.raster.dimensions());

        let mut values = vec![0f32; len];
        let mut mask_out = vec![0u8; len];
        let mut outside = vec![0u8; len];

        if len > 0 && !source.raster.is_empty() {
            let w = width as usize;
            let bands = self.pool.current_num_threads().max(1) * 4;
            let rows_per_band = (height as usize).div_ceil(bands).max(1);
            let band_len = rows_per_band * w;
            let triangles = self.mesh.triangles();

            self.pool.install(|| {
                values
                    .par_chunks_mut(band_len)
                    .zip(mask_out.par_chunks_mut(band_len))
                    .zip(outside.par_chunks_mut(band_len))
                    .enumerate()
                    .for_each(|(band, ((vals, msk), out))| {
                        let band = Band {
                            y0: band * rows_per_band,
                            rows: vals.len() / w,
                            width: w,
                        };
                        for tri in triangles {
                            band.fill(tri, source.raster, mask, sampler, vals, msk, out);
                        }
                    });
            });
        }

        Ok(ResampleOutput {
            raster: Raster {
                width,
                height,
                pixels: values,
            },
            mask: mask.map(|_| mask_out),
            outside,
        })
    }
}

struct Band {
    y0: usize,
    rows: usize,
    width: usize,
}

impl Band {
    #[allow(clippy::too_many_arguments)]
    fn fill(
        &self,
        tri: &MeshTriangle,
        raster: &Raster,
        mask: Option<&Raster>,
        sampler: &dyn Sampler,
        vals: &mut [f32],
        msk: &mut [u8],
        out: &mut [u8],
    ) {
        let b = tri.target_bounds();
        let y_lo = (b.y0.ceil().max(self.y0 as f64)) as usize;
        let y_hi = b.y1.floor().min((self.y0 + self.rows) as f64 - 1.0);
        let x_lo = b.x0.ceil().max(0.0) as usize;
        let x_hi = b.x1.floor().min(self.width as f64 - 1.0);
        if y_hi < y_lo as f64 || x_hi < x_lo as f64 {
            return;
        }
        let (y_hi, x_hi) = (y_hi as usize, x_hi as usize);

        for py in y_lo..=y_hi {
            let row = (py - self.y0) * self.width;
            for px in x_lo..=x_hi {
                let idx = row + px;
                if out[idx] != 0 {
                    continue;
                }
                let Some(s) = tri.source_of(Point::new(px as f64, py as f64), INSIDE_EPS)
                else {
                    continue;
                };
                let Some(v) = sampler.sample(raster, s.x, s.y) else {
                    continue;
                };
                vals[idx] = v;
                out[idx] = 255;
                if let Some(m) = mask {
                    msk[idx] = sampler
                        .sample(m, s.x, s.y)
                        .map(|a| a.round().clamp(0.0, 255.0) as u8)
                        .unwrap_or(0);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/mapping.rs"]
mod tests;
