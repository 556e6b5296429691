use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::assets::decode::load_raster;
use crate::assets::raster::Raster;
use crate::foundation::error::MosaicResult;

/// Resolves `(url, downsample_levels, is_mask)` to a raster.
///
/// Implementations are shared across tiles and across concurrent render calls, so `get` takes
/// `&self` and must be safe to call from several threads.
pub trait ImageCache: Send + Sync {
    /// Return the raster for `url`, downsampled `downsample_levels` times.
    fn get(&self, url: &str, downsample_levels: u32, is_mask: bool) -> MosaicResult<Arc<Raster>>;

    /// Number of rasters currently retained.
    fn size(&self) -> usize;
}

/// Cache that retains nothing: every `get` decodes from the source.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledCache;

impl ImageCache for DisabledCache {
    fn get(&self, url: &str, downsample_levels: u32, is_mask: bool) -> MosaicResult<Arc<Raster>> {
        Ok(Arc::new(load_raster(url, downsample_levels, is_mask)?))
    }

    fn size(&self) -> usize {
        0
    }
}

/// Budget for [`RasterCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterCacheOpts {
    /// Maximum number of pixels retained across all cached rasters.
    pub max_cached_pixels: usize,
}

impl Default for RasterCacheOpts {
    fn default() -> Self {
        let max_cached_pixels = std::env::var("TILEMOSAIC_CACHE_MAX_PIXELS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(256 * 1024 * 1024);
        Self { max_cached_pixels }
    }
}

/// Counters reported by [`RasterCache::stats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RasterCacheStats {
    /// Lookups served from memory.
    pub hits: u64,
    /// Lookups that had to load from the source.
    pub misses: u64,
    /// Rasters dropped to stay inside the pixel budget.
    pub evictions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    url: String,
    downsample_levels: u32,
    is_mask: bool,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, Arc<Raster>>,
    lru: VecDeque<CacheKey>,
    cached_pixels: usize,
    stats: RasterCacheStats,
}

type Loader = dyn Fn(&str, u32, bool) -> MosaicResult<Raster> + Send + Sync;

/// Pixel-budgeted LRU raster cache.
///
/// Loads happen outside the lock, so two threads missing on the same key may both decode it; the
/// second insert simply refreshes the entry.
pub struct RasterCache {
    opts: RasterCacheOpts,
    loader: Box<Loader>,
    state: Mutex<CacheState>,
}

impl std::fmt::Debug for RasterCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterCache")
            .field("opts", &self.opts)
            .field("size", &self.size())
            .field("cached_pixels", &self.cached_pixels())
            .finish()
    }
}

impl Default for RasterCache {
    fn default() -> Self {
        Self::new(RasterCacheOpts::default())
    }
}

impl RasterCache {
    /// Cache backed by [`load_raster`].
    pub fn new(opts: RasterCacheOpts) -> Self {
        Self::with_loader(opts, load_raster)
    }

    /// Cache backed by a custom loader.
    pub fn with_loader(
        opts: RasterCacheOpts,
        loader: impl Fn(&str, u32, bool) -> MosaicResult<Raster> + Send + Sync + 'static,
    ) -> Self {
        Self {
            opts,
            loader: Box::new(loader),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Snapshot of hit/miss/eviction counters.
    pub fn stats(&self) -> RasterCacheStats {
        self.lock().stats
    }

    /// Total pixels currently retained.
    pub fn cached_pixels(&self) -> usize {
        self.lock().cached_pixels
    }

    /// Drop every retained raster.
    pub fn clear(&self) {
        let mut st = self.lock();
        st.entries.clear();
        st.lru.clear();
        st.cached_pixels = 0;
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lookup(&self, key: &CacheKey) -> Option<Arc<Raster>> {
        let mut st = self.lock();
        let found = st.entries.get(key).cloned();
        match found {
            Some(r) => {
                st.stats.hits += 1;
                touch(&mut st.lru, key);
                Some(r)
            }
            None => {
                st.stats.misses += 1;
                None
            }
        }
    }

    fn insert(&self, key: CacheKey, raster: Arc<Raster>) {
        let px = raster.pixel_count();
        if px > self.opts.max_cached_pixels {
            return;
        }

        let mut st = self.lock();
        if let Some(old) = st.entries.remove(&key) {
            st.cached_pixels = st.cached_pixels.saturating_sub(old.pixel_count());
        }
        while st.cached_pixels.saturating_add(px) > self.opts.max_cached_pixels {
            let Some(oldest) = st.lru.pop_front() else {
                break;
            };
            if let Some(old) = st.entries.remove(&oldest) {
                st.cached_pixels = st.cached_pixels.saturating_sub(old.pixel_count());
                st.stats.evictions += 1;
            }
        }
        st.entries.insert(key.clone(), raster);
        st.cached_pixels = st.cached_pixels.saturating_add(px);
        touch(&mut st.lru, &key);
    }
}

impl ImageCache for RasterCache {
    fn get(&self, url: &str, downsample_levels: u32, is_mask: bool) -> MosaicResult<Arc<Raster>> {
        let key = CacheKey {
            url: url.to_owned(),
            downsample_levels,
            is_mask,
        };
        if let Some(r) = self.lookup(&key) {
            return Ok(r);
        }
        let raster = Arc::new((self.loader)(url, downsample_levels, is_mask)?);
        self.insert(key, Arc::clone(&raster));
        Ok(raster)
    }

    fn size(&self) -> usize {
        self.lock().entries.len()
    }
}

fn touch(lru: &mut VecDeque<CacheKey>, key: &CacheKey) {
    if let Some(pos) = lru.iter().position(|k| k == key) {
        lru.remove(pos);
    }
    lru.push_back(key.clone());
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
