use super::*;

#[test]
fn partial_json_keeps_defaults() {
    let s = LayerTreeSettings::from_json(r#"{ "top_controls_height": 50.0 }"#).unwrap();
    assert_eq!(s.top_controls_height, 50.0);
    assert_eq!(
        s.page_scale_animation_ms,
        LayerTreeSettings::default().page_scale_animation_ms
    );
    assert!(!s.ignore_root_layer_flings);
}

#[test]
fn inverted_contents_scale_bounds_are_rejected() {
    let err = LayerTreeSettings::from_json(
        r#"{ "minimum_contents_scale": 2.0, "maximum_contents_scale": 1.0 }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("validation error"));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = LayerTreeSettings::from_json("{ nope").unwrap_err();
    assert!(matches!(err, crate::StrataError::Serde(_)));
}
