use super::*;
use crate::foundation::core::{Point, Size};
use crate::foundation::settings::LayerTreeSettings;
use crate::host::input::ScrollInputType;
use crate::host::support::{host_with_tree, layer, viewport_tree};
use crate::tree::sync::LayerDescription;

fn viewport_description() -> TreeDescription {
    viewport_tree(LayerTreeSettings::default()).to_description()
}

#[test]
fn create_pending_tree_reuses_the_tree_in_flight() {
    let mut host = host_with_tree(viewport_tree(LayerTreeSettings::default()));
    host.create_pending_tree().set_root_layer(layer(1, 0.0, 0.0, 10.0, 10.0));
    assert!(host.create_pending_tree().contains(LayerId(1)));
    assert_eq!(host.pending_tree().unwrap().device_viewport_size(), Size::new(50.0, 50.0));
}

#[test]
fn commit_rejects_bad_descriptions_and_keeps_the_pending_tree() {
    let mut host = host_with_tree(viewport_tree(LayerTreeSettings::default()));
    host.commit_description(&viewport_description()).unwrap();
    assert_eq!(host.client().ready_to_activate, 1);

    let mut broken = viewport_description();
    broken.layers.push(LayerDescription::child(LayerId(9), LayerId(77)));
    assert!(host.commit_description(&broken).is_err());

    let mut crossed = viewport_description();
    crossed.page_scale_layer = Some(LayerId(3));
    assert!(host.commit_description(&crossed).is_err());

    assert_eq!(host.client().ready_to_activate, 1);
    assert_eq!(host.pending_tree().unwrap().page_scale_layer_id(), Some(LayerId(5)));
}

#[test]
fn activation_without_a_pending_tree_does_nothing() {
    let mut host = host_with_tree(viewport_tree(LayerTreeSettings::default()));
    assert!(!host.activate_pending_tree());
    assert_eq!(host.client().activations, 0);
}

#[test]
fn activation_carries_unreported_scroll_and_gesture_state() {
    let mut host = host_with_tree(viewport_tree(LayerTreeSettings::default()));
    host.scroll_begin(Point::new(10.0, 10.0), ScrollInputType::Wheel);
    host.scroll_by(Point::new(10.0, 10.0), Vec2::new(0.0, 30.5));
    let sent = host.process_scroll_deltas();
    assert_eq!(sent.scrolls, vec![LayerScrollUpdate { layer: LayerId(2), scroll_delta: Vec2::new(0.0, 30.0) }]);
    host.scroll_by(Point::new(10.0, 10.0), Vec2::new(0.0, 5.0));

    // The producer folded the reported 30px into the committed offset.
    let mut desc = viewport_description();
    let scroller = desc.layers.iter_mut().find(|l| l.id == LayerId(2)).unwrap();
    scroller.props.scroll_offset = Vec2::new(0.0, 30.0);
    desc.layers.push(LayerDescription::child(LayerId(8), LayerId(1)));
    host.commit_description(&desc).unwrap();
    assert!(host.activate_pending_tree());

    let tree = host.active_tree();
    let layer2 = tree.layer(LayerId(2)).unwrap();
    assert_eq!(layer2.scroll_delta(), Vec2::new(0.0, 5.5));
    assert_eq!(layer2.sent_scroll_delta(), Vec2::ZERO);
    assert_eq!(layer2.total_scroll_offset(), Vec2::new(0.0, 35.5));
    assert_eq!(tree.layer(LayerId(8)).unwrap().scroll_delta(), Vec2::ZERO);
    assert_eq!(tree.currently_scrolling_layer_id(), Some(LayerId(2)));
    assert!(host.pending_tree().is_none());
    assert_eq!(host.client().activations, 1);
}

#[test]
fn unreported_page_scale_survives_activation() {
    let mut host = host_with_tree(viewport_tree(LayerTreeSettings::default()));
    host.active_tree_mut().set_page_scale_delta(2.0);

    host.commit_description(&viewport_description()).unwrap();
    assert_eq!(host.pending_tree().unwrap().page_scale_delta(), 2.0);
    host.activate_pending_tree();
    assert_eq!(host.active_tree().page_scale_delta(), 2.0);
    assert_eq!(host.active_tree().sent_page_scale_delta(), 1.0);

    let report = host.process_scroll_deltas();
    assert_eq!(report.page_scale_delta, 2.0);

    // The producer applied the 2x; the new commit starts from it.
    let mut desc = viewport_description();
    desc.page_scale_factor = 2.0;
    host.commit_description(&desc).unwrap();
    host.activate_pending_tree();
    assert_eq!(host.active_tree().page_scale_delta(), 1.0);
    assert_eq!(host.active_tree().total_page_scale_factor(), 2.0);
}

#[test]
fn scroll_deltas_are_reported_once_in_whole_pixels() {
    let mut host = host_with_tree(viewport_tree(LayerTreeSettings::default()));
    host.scroll_viewport_by(Vec2::new(0.0, 10.7));

    let first = host.process_scroll_deltas();
    assert_eq!(first.scrolls.len(), 1);
    assert_eq!(first.scrolls[0].scroll_delta, Vec2::new(0.0, 10.0));
    assert_eq!(first.page_scale_delta, 1.0);

    let again = host.process_scroll_deltas();
    assert!(again.scrolls.is_empty());
    assert_eq!(again.page_scale_delta, 1.0);

    host.scroll_viewport_by(Vec2::new(0.0, 1.5));
    let next = host.process_scroll_deltas();
    assert_eq!(next.scrolls[0].scroll_delta, Vec2::new(0.0, 2.0));
}
