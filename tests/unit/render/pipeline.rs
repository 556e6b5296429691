use std::collections::HashMap;

use crate::assets::cache::{RasterCache, RasterCacheOpts};
use crate::tiles::tile_spec::ImageAndMask;

use super::*;

fn memory_cache(images: Vec<(&str, Raster)>) -> RasterCache {
    let images: HashMap<String, Raster> = images
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();
    RasterCache::with_loader(
        RasterCacheOpts {
            max_cached_pixels: 1 << 20,
        },
        move |url, levels, _| {
            images
                .get(url)
                .cloned()
                .map(|r| r.downsampled_by(levels))
                .ok_or_else(|| MosaicError::resource(format!("no image '{url}'")))
        },
    )
}

#[test]
fn zero_threads_is_a_validation_error() {
    assert!(matches!(
        build_thread_pool(0),
        Err(MosaicError::Validation(_))
    ));
    assert_eq!(build_thread_pool(2).unwrap().current_num_threads(), 2);
}

#[test]
fn canvas_must_match_request() {
    let req = RenderRequest::new(0.0, 0.0, 4, 4, 1.0);
    let mut canvas = Canvas::new(4, 3);
    let err = render(
        &req,
        &[],
        &mut canvas,
        &memory_cache(vec![]),
        &FilterPipeline::new(),
    )
    .unwrap_err();
    assert!(matches!(err, MosaicError::Validation(_)));
}

#[test]
fn malformed_tile_fails_before_background_fill() {
    let req = RenderRequest {
        background_rgb: Some([9, 9, 9]),
        ..RenderRequest::new(0.0, 0.0, 2, 2, 1.0)
    };
    let mut bad = TileSpec::new("bad", ImageAndMask::new("a"));
    bad.mipmap_levels.clear();
    let mut canvas = Canvas::for_request(&req);
    assert!(render(&req, &[bad], &mut canvas, &memory_cache(vec![]), &FilterPipeline::new()).is_err());
    assert_eq!(canvas, Canvas::new(2, 2));
}

#[test]
fn identity_tile_paints_its_footprint() {
    let req = RenderRequest::new(0.0, 0.0, 3, 2, 1.0);
    let cache = memory_cache(vec![(
        "a",
        Raster::from_pixels(2, 2, vec![10.0, 20.0, 30.0, 40.0]).unwrap(),
    )]);
    let tiles = [TileSpec::new("a", ImageAndMask::new("a"))];
    let mut canvas = Canvas::for_request(&req);
    let stats = render(&req, &tiles, &mut canvas, &cache, &FilterPipeline::new()).unwrap();
    assert_eq!(
        stats,
        RenderStats {
            tiles_total: 1,
            tiles_rendered: 1,
            tiles_skipped: 0
        }
    );
    assert_eq!(canvas.pixel(0, 0), [10, 10, 10, 255]);
    assert_eq!(canvas.pixel(1, 1), [40, 40, 40, 255]);
    assert_eq!(canvas.pixel(2, 0), [0, 0, 0, 0]);
    // The size probe and the level-0 load share one cache entry.
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn one_pixel_image_downsampled_to_nothing_is_skipped() {
    let req = RenderRequest::new(0.0, 0.0, 2, 2, 0.25);
    let cache = memory_cache(vec![("dot", Raster::filled(1, 1, 200.0))]);
    let tiles = [TileSpec::new("dot", ImageAndMask::new("dot")).with_size(1, 1)];
    let mut canvas = Canvas::for_request(&req);
    let stats = render(&req, &tiles, &mut canvas, &cache, &FilterPipeline::new()).unwrap();
    assert_eq!(stats.tiles_skipped, 1);
    assert_eq!(stats.tiles_rendered, 0);
}

#[test]
fn missing_source_aborts_render() {
    let req = RenderRequest::new(0.0, 0.0, 2, 2, 1.0);
    let tiles = [TileSpec::new("x", ImageAndMask::new("missing")).with_size(2, 2)];
    let mut canvas = Canvas::for_request(&req);
    let err = render(
        &req,
        &tiles,
        &mut canvas,
        &memory_cache(vec![]),
        &FilterPipeline::new(),
    )
    .unwrap_err();
    assert!(matches!(err, MosaicError::Resource(_)));
}
