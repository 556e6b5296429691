use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MosaicError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        MosaicError::transform("x")
            .to_string()
            .contains("transform error:")
    );
    assert!(
        MosaicError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(
        MosaicError::resample("x")
            .to_string()
            .contains("resample error:")
    );
    assert!(
        MosaicError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MosaicError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: MosaicError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, MosaicError::Serde(_)));
}
