use super::*;

#[test]
fn defaults_match_an_undrawn_layer() {
    let layer = Layer::new(LayerId(3));
    assert_eq!(layer.id(), LayerId(3));
    assert!(layer.parent().is_none());
    assert!(!layer.props.draws_content);
    assert!(layer.props.double_sided);
    assert_eq!(layer.props.opacity, 1.0);
    assert!(layer.props.user_scrollable_horizontal && layer.props.user_scrollable_vertical);
}

#[test]
fn effective_bounds_apply_delta_and_floor_at_zero() {
    let mut layer = Layer::new(LayerId(1));
    layer.props.bounds = Size::new(100.0, 50.0);
    layer.bounds_delta = Vec2::new(10.0, -80.0);
    assert_eq!(layer.effective_bounds(), Size::new(110.0, 0.0));
}

#[test]
fn total_scroll_offset_adds_delta() {
    let mut layer = Layer::new(LayerId(1));
    layer.props.scroll_offset = Vec2::new(5.0, 5.0);
    layer.scroll_delta = Vec2::new(1.0, -2.0);
    assert_eq!(layer.total_scroll_offset(), Vec2::new(6.0, 3.0));
}

#[test]
fn did_draw_only_counts_after_will_draw() {
    let mut layer = Layer::new(LayerId(1));
    layer.did_draw();
    assert_eq!(layer.draw_stats().did_draw, 0);
    assert!(layer.will_draw());
    layer.did_draw();
    layer.did_draw();
    assert_eq!(
        layer.draw_stats(),
        LayerDrawStats {
            will_draw: 1,
            append_quads: 0,
            did_draw: 1
        }
    );
}

#[test]
fn props_deserialize_with_defaults() {
    let props: LayerProps =
        serde_json::from_str(r#"{ "bounds": { "width": 10.0, "height": 20.0 }, "draws_content": true }"#)
            .unwrap();
    assert_eq!(props.bounds, Size::new(10.0, 20.0));
    assert!(props.draws_content);
    assert_eq!(props.opacity, 1.0);
    assert_eq!(props.content, LayerContent::Empty);
}
