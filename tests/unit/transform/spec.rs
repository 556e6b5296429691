use super::*;

#[test]
fn json_uses_type_tag() {
    let json = r#"[
        {"type": "affine", "id": "shift", "coeffs": [1, 0, 0, 1, 10, 20]},
        {"type": "reference", "ref_id": "lens"},
        {"type": "list", "specs": [{"type": "polynomial", "x_coeffs": [0, 1, 0], "y_coeffs": [0, 0, 1]}]}
    ]"#;
    let specs: Vec<TransformSpec> = serde_json::from_str(json).unwrap();
    assert_eq!(specs.len(), 3);
    assert_eq!(specs[0].id(), Some("shift"));
    assert_eq!(specs[1], TransformSpec::reference("lens"));
    assert!(specs[2].is_fully_resolved());
    assert!(!specs[1].is_fully_resolved());
}

#[test]
fn collect_references_descends_into_lists() {
    let spec = TransformSpec::List {
        id: None,
        specs: vec![
            TransformSpec::reference("a"),
            TransformSpec::translation(1.0, 1.0),
            TransformSpec::List {
                id: None,
                specs: vec![TransformSpec::reference("b")],
            },
        ],
    };
    let mut refs = BTreeSet::new();
    spec.collect_references(&mut refs);
    assert_eq!(
        refs.into_iter().collect::<Vec<_>>(),
        vec!["a".to_string(), "b".to_string()]
    );
}

#[test]
fn append_to_rejects_unresolved_reference() {
    let mut chain = TransformChain::new();
    let err = TransformSpec::reference("missing")
        .append_to(&mut chain)
        .unwrap_err();
    assert!(matches!(err, MosaicError::Transform(_)));
    assert!(err.to_string().contains("missing"));
}

#[test]
fn append_to_rejects_non_finite_affine() {
    let mut chain = TransformChain::new();
    let spec = TransformSpec::Affine {
        id: None,
        coeffs: [1.0, 0.0, 0.0, f64::NAN, 0.0, 0.0],
    };
    assert!(spec.append_to(&mut chain).is_err());
}

#[test]
fn with_id_keeps_coefficients() {
    let spec = TransformSpec::translation(3.0, 4.0).with_id("t");
    assert_eq!(spec.id(), Some("t"));
    let TransformSpec::Affine { coeffs, .. } = spec else {
        panic!("expected affine");
    };
    assert_eq!(coeffs, [1.0, 0.0, 0.0, 1.0, 3.0, 4.0]);
}
