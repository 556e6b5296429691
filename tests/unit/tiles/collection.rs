use crate::foundation::core::{Affine, Point};
use crate::tiles::tile_spec::ImageAndMask;

use super::*;

fn tile(id: &str) -> TileSpec {
    TileSpec::new(id, ImageAndMask::new(format!("{id}.png")))
}

fn named(id: &str, dx: f64) -> TransformSpec {
    TransformSpec::translation(dx, 0.0).with_id(id)
}

#[test]
fn add_transform_spec_requires_an_id() {
    let mut c = ResolvedTileCollection::new();
    assert!(c.add_transform_spec(TransformSpec::translation(1.0, 0.0)).is_err());
    c.add_transform_spec(named("a", 1.0)).unwrap();
    c.add_transform_spec(named("a", 2.0)).unwrap();
    assert_eq!(c.transform_specs.len(), 1);
    assert_eq!(c.transform_specs["a"], named("a", 2.0));
}

#[test]
fn add_reference_appends_or_replaces_last() {
    let mut c = ResolvedTileCollection::from_tiles(vec![
        tile("t1").with_transform(TransformSpec::translation(1.0, 0.0)),
        tile("t2"),
    ]);
    assert!(matches!(
        c.add_reference_transform_to_all_tiles("nope", false),
        Err(MosaicError::Validation(_))
    ));

    c.add_transform_spec(named("a", 5.0)).unwrap();
    c.add_reference_transform_to_all_tiles("a", false).unwrap();
    assert_eq!(c.tile("t1").unwrap().transforms.len(), 2);
    assert_eq!(c.tile("t2").unwrap().transforms.len(), 1);

    c.add_transform_spec(named("b", 7.0)).unwrap();
    c.add_reference_transform_to_all_tiles("b", true).unwrap();
    let t1 = &c.tile("t1").unwrap().transforms;
    assert_eq!(t1.len(), 2);
    assert_eq!(t1[1], TransformSpec::reference("b"));
}

#[test]
fn remove_unreferenced_follows_nested_references() {
    let mut c = ResolvedTileCollection::from_tiles(vec![
        tile("t").with_transform(TransformSpec::reference("outer")),
    ]);
    c.add_transform_spec(
        TransformSpec::List {
            id: None,
            specs: vec![TransformSpec::reference("inner")],
        }
        .with_id("outer"),
    )
    .unwrap();
    c.add_transform_spec(named("inner", 1.0)).unwrap();
    c.add_transform_spec(named("stale", 2.0)).unwrap();

    assert_eq!(c.remove_unreferenced_transforms(), 1);
    assert!(c.transform_specs.contains_key("outer"));
    assert!(c.transform_specs.contains_key("inner"));
    assert!(!c.transform_specs.contains_key("stale"));
    assert_eq!(c.remove_unreferenced_transforms(), 0);
}

#[test]
fn resolve_inlines_references_in_order() {
    let mut c = ResolvedTileCollection::from_tiles(vec![
        tile("t")
            .with_transform(TransformSpec::affine(Affine::scale(2.0)))
            .with_transform(TransformSpec::reference("shift")),
    ]);
    c.add_transform_spec(named("shift", 3.0)).unwrap();
    c.validate().unwrap();

    let tiles = c.resolve().unwrap();
    assert!(tiles[0].transforms.iter().all(TransformSpec::is_fully_resolved));
    let chain = tiles[0].transform_chain().unwrap();
    assert_eq!(chain.apply(Point::new(1.0, 1.0)), Point::new(5.0, 2.0));
}

#[test]
fn missing_and_cyclic_references_are_rejected() {
    let c = ResolvedTileCollection::from_tiles(vec![
        tile("t").with_transform(TransformSpec::reference("gone")),
    ]);
    assert!(matches!(c.validate(), Err(MosaicError::Transform(_))));
    let err = c.resolve().unwrap_err();
    assert!(err.to_string().contains("tile 't'"));

    let mut c = ResolvedTileCollection::from_tiles(vec![
        tile("t").with_transform(TransformSpec::reference("a")),
    ]);
    c.transform_specs.insert(
        "a".into(),
        TransformSpec::List {
            id: Some("a".into()),
            specs: vec![TransformSpec::reference("b")],
        },
    );
    c.transform_specs.insert(
        "b".into(),
        TransformSpec::List {
            id: Some("b".into()),
            specs: vec![TransformSpec::reference("a")],
        },
    );
    let err = c.resolve().unwrap_err();
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn apply_stack_transform_references_from_every_tile_and_prunes() {
    let mut c = ResolvedTileCollection::from_tiles(vec![tile("a"), tile("b"), tile("c")]);
    c.add_transform_spec(named("orphan", 1.0)).unwrap();

    let n = apply_stack_transform(&mut c, named("stack", 4.0)).unwrap();
    assert_eq!(n, 3);
    assert_eq!(c.transform_specs.keys().collect::<Vec<_>>(), vec!["stack"]);
    for t in &c.tiles {
        assert_eq!(t.transforms.last(), Some(&TransformSpec::reference("stack")));
    }

    assert!(apply_stack_transform(&mut c, TransformSpec::translation(1.0, 1.0)).is_err());
}

#[test]
fn add_tile_replaces_same_id_in_place() {
    let mut c = ResolvedTileCollection::from_tiles(vec![tile("a"), tile("b")]);
    c.add_tile(tile("a").with_size(3, 4));
    c.add_tile(tile("z"));
    let ids: Vec<_> = c.tiles.iter().map(|t| t.tile_id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "z"]);
    assert_eq!(c.tile("a").unwrap().width, Some(3));
    assert_eq!(c.tile_count(), 3);
}

#[test]
fn collection_json_uses_plain_field_names() {
    let json = r#"{
        "transform_specs": {"s": {"type": "affine", "id": "s", "coeffs": [1, 0, 0, 1, 2, 3]}},
        "tiles": [{"tile_id": "t", "mipmap_levels": {"0": {"image_url": "t.png"}},
                   "transforms": [{"type": "reference", "ref_id": "s"}]}]
    }"#;
    let c: ResolvedTileCollection = serde_json::from_str(json).unwrap();
    c.validate().unwrap();
    let chain = c.resolve().unwrap()[0].transform_chain().unwrap();
    assert_eq!(chain.apply(Point::ORIGIN), Point::new(2.0, 3.0));
}
