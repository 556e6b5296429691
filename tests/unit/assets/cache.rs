use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn counting_cache(max_cached_pixels: usize) -> (RasterCache, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let cache = RasterCache::with_loader(RasterCacheOpts { max_cached_pixels }, move |url, levels, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        let side = url.len() as u32;
        Ok(Raster::filled(side, side, levels as f32))
    });
    (cache, loads)
}

#[test]
fn repeated_get_loads_once() {
    let (cache, loads) = counting_cache(1 << 20);
    let a = cache.get("abcd", 0, false).unwrap();
    let b = cache.get("abcd", 0, false).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(cache.size(), 1);
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn key_includes_levels_and_mask_flag() {
    let (cache, loads) = counting_cache(1 << 20);
    cache.get("abcd", 0, false).unwrap();
    cache.get("abcd", 1, false).unwrap();
    cache.get("abcd", 0, true).unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 3);
    assert_eq!(cache.size(), 3);
}

#[test]
fn evicts_least_recently_used_to_fit_budget() {
    // Each 4-char url yields a 4x4 = 16 pixel raster; budget fits two.
    let (cache, loads) = counting_cache(32);
    cache.get("aaaa", 0, false).unwrap();
    cache.get("bbbb", 0, false).unwrap();
    cache.get("aaaa", 0, false).unwrap(); // refresh a
    cache.get("cccc", 0, false).unwrap(); // evicts b
    assert_eq!(cache.size(), 2);
    assert_eq!(cache.cached_pixels(), 32);
    assert_eq!(cache.stats().evictions, 1);

    cache.get("aaaa", 0, false).unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 3);
    cache.get("bbbb", 0, false).unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 4);
}

#[test]
fn oversized_rasters_are_returned_but_not_retained() {
    let (cache, loads) = counting_cache(8);
    let r = cache.get("abcd", 2, false).unwrap();
    assert_eq!(r.pixels[0], 2.0);
    assert_eq!(cache.size(), 0);
    cache.get("abcd", 2, false).unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[test]
fn clear_drops_everything() {
    let (cache, _) = counting_cache(1 << 20);
    cache.get("ab", 0, false).unwrap();
    cache.clear();
    assert_eq!(cache.size(), 0);
    assert_eq!(cache.cached_pixels(), 0);
}

#[test]
fn loader_errors_propagate_and_are_not_cached() {
    let cache = RasterCache::with_loader(RasterCacheOpts::default(), |url, _, _| {
        Err(crate::MosaicError::resource(format!("no such image '{url}'")))
    });
    assert!(cache.get("x", 0, false).is_err());
    assert_eq!(cache.size(), 0);
}

#[test]
fn cache_is_shareable_across_threads() {
    let (cache, _) = counting_cache(1 << 20);
    let cache = Arc::new(cache);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let c = Arc::clone(&cache);
            std::thread::spawn(move || c.get("abcd", 0, false).unwrap().width)
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 4);
    }
    assert_eq!(cache.size(), 1);
}

#[test]
fn disabled_cache_reports_zero_size() {
    assert_eq!(DisabledCache.size(), 0);
    assert!(DisabledCache.get("/no/such/file.png", 0, false).is_err());
}
