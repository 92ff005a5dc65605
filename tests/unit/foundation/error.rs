use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReelError::unsupported("x")
            .to_string()
            .contains("unsupported capability:")
    );
    assert!(
        ReelError::encoder("x")
            .to_string()
            .contains("encoder failure:")
    );
    assert!(
        ReelError::resource_load("x")
            .to_string()
            .contains("resource load failure:")
    );
    assert!(
        ReelError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        ReelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
