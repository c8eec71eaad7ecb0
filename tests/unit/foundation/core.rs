use super::*;

#[test]
fn unique_ids_never_repeat() {
    let a = LayerId::next_unique();
    let b = LayerId::next_unique();
    assert_ne!(a, b);
    assert!(b.0 > a.0);
}

#[test]
fn layer_id_display_is_compact() {
    assert_eq!(LayerId(42).to_string(), "#42");
}

#[test]
fn color_opacity() {
    assert!(Color::WHITE.is_opaque());
    assert!(!Color::TRANSPARENT.is_opaque());
    assert_eq!(Color::default(), Color::TRANSPARENT);
}
