use std::cell::Cell;

use crate::tiles::tile_spec::ImageAndMask;
use crate::transform::spec::TransformSpec;

use super::*;

#[test]
fn unknown_size_is_probed_from_lowest_level() {
    let mut tile = TileSpec::new("t", ImageAndMask::new("full.png"))
        .with_level(3, ImageAndMask::new("coarse.png"))
        .with_transform(TransformSpec::translation(5.0, 5.0));
    let b = derive_bounding_box_with(&mut tile, 64.0, false, |url| {
        assert_eq!(url, "full.png");
        Ok((40, 20))
    })
    .unwrap();
    assert_eq!((tile.width, tile.height), (Some(40), Some(20)));
    assert_eq!(b, Rect::new(5.0, 5.0, 45.0, 25.0));
    assert_eq!(tile.bounds, Some(b));
}

#[test]
fn known_size_skips_the_probe() {
    let mut tile = TileSpec::new("t", ImageAndMask::new("full.png")).with_size(10, 10);
    let called = Cell::new(false);
    derive_bounding_box_with(&mut tile, 64.0, false, |_| {
        called.set(true);
        Ok((1, 1))
    })
    .unwrap();
    assert!(!called.get());
    assert_eq!(tile.bounds, Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
}

#[test]
fn probe_failure_propagates() {
    let mut tile = TileSpec::new("t", ImageAndMask::new("/no/such/file.png"));
    assert!(matches!(
        derive_bounding_box(&mut tile, 64.0, false),
        Err(MosaicError::Resource(_))
    ));
    assert!(tile.width.is_none());
}
