use std::sync::Arc;

use crate::assets::raster::Raster;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::foundation::math::hash_u32;

/// In-place raster filter.
///
/// `scale` is the effective scale of the raster relative to full resolution (`1 / 2^level`), so
/// filters with spatial extent can shrink their footprint on coarse pyramid levels.
pub trait Filter: Send + Sync + std::fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Filter `raster` in place.
    fn process(&self, raster: &mut Raster, scale: f64) -> MosaicResult<()>;
}

/// Ordered list of filters. Cloning shares the filter instances.
#[derive(Clone, Debug, Default)]
pub struct FilterPipeline {
    stages: Vec<Arc<dyn Filter>>,
}

impl FilterPipeline {
    /// Empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline used for alignment renders: replaces saturated black and white with mid-gray
    /// noise so clipped regions carry no structure.
    pub fn alignment_default() -> Self {
        Self::new()
            .with_stage(ValueToNoise::new(0.0, 64.0, 191.0))
            .with_stage(ValueToNoise::new(255.0, 64.0, 191.0))
    }

    /// Append a stage.
    pub fn with_stage(mut self, filter: impl Filter + 'static) -> Self {
        self.push(Arc::new(filter));
        self
    }

    /// Append a shared stage.
    pub fn push(&mut self, filter: Arc<dyn Filter>) {
        self.stages.push(filter);
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Return `true` when there are no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in order.
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|f| f.name()).collect()
    }

    /// Run every stage in order.
    pub fn apply(&self, raster: &mut Raster, scale: f64) -> MosaicResult<()> {
        for f in &self.stages {
            f.process(raster, scale).map_err(|e| match e {
                MosaicError::Validation(msg) => {
                    MosaicError::validation(format!("filter '{}': {msg}", f.name()))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

/// Replace every pixel equal to `value` with deterministic noise drawn from `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueToNoise {
    /// Pixel value to replace.
    pub value: f32,
    /// Lower bound of the noise.
    pub min: f32,
    /// Upper bound of the noise.
    pub max: f32,
    /// Noise seed.
    pub seed: u64,
}

impl ValueToNoise {
    /// Filter with seed 0.
    pub fn new(value: f32, min: f32, max: f32) -> Self {
        Self {
            value,
            min,
            max,
            seed: 0,
        }
    }

    /// Same filter with a different seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Filter for ValueToNoise {
    fn name(&self) -> &str {
        "value_to_noise"
    }

    fn process(&self, raster: &mut Raster, _scale: f64) -> MosaicResult<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min > self.max {
            return Err(MosaicError::validation(
                "noise range must be finite with min <= max",
            ));
        }
        let span = f64::from(self.max - self.min);
        let w = raster.width as usize;
        for (i, v) in raster.pixels.iter_mut().enumerate() {
            if *v != self.value {
                continue;
            }
            let (x, y) = ((i % w) as u32, (i / w) as u32);
            let t = f64::from(hash_u32(self.seed, x, y)) / f64::from(u32::MAX);
            *v = (f64::from(self.min) + t * span).round() as f32;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filter.rs"]
mod tests;
