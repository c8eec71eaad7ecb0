use super::*;
use crate::animation::scrollbar::FadePhase;
use crate::foundation::core::{Point, Rect};
use crate::host::input::ScrollInputType;
use crate::host::support::{Recorder, host_with_tree, layer, viewport_tree};
use crate::layer::content::{ScrollbarContent, ScrollbarOrientation};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// The viewport tree plus a vertical scrollbar (layer 6) tracking layer 2.
fn scrollbar_host(settings: LayerTreeSettings) -> LayerTreeHost<Recorder> {
    let mut tree = viewport_tree(settings);
    let mut bar = layer(6, 45.0, 0.0, 5.0, 50.0);
    bar.props.draws_content = true;
    bar.props.content = LayerContent::Scrollbar(ScrollbarContent {
        orientation: ScrollbarOrientation::Vertical,
        scroll_layer: Some(LayerId(2)),
    });
    tree.add_child(LayerId(1), bar).unwrap();
    host_with_tree(tree)
}

fn fade_phase(host: &LayerTreeHost<Recorder>) -> Option<FadePhase> {
    host.active_tree()
        .layer(LayerId(2))
        .and_then(|l| l.scrollbar_fade())
        .map(|f| f.phase())
}

#[test]
fn page_scale_animation_reaches_its_target() {
    let mut host = host_with_tree(viewport_tree(LayerTreeSettings::default()));
    host.start_page_scale_animation(Vec2::new(50.0, 50.0), true, 2.0, Some(ms(100)));
    assert!(host.page_scale_animation().is_some());
    assert_eq!(host.client().animates, 1);

    host.animate(ms(1000));
    assert_eq!(host.active_tree().total_page_scale_factor(), 1.0);
    host.animate(ms(1050));
    let mid = host.active_tree().total_page_scale_factor();
    assert!(mid > 1.0 && mid < 2.0, "mid-animation scale {mid}");

    host.animate(ms(1100));
    assert!(host.page_scale_animation().is_none());
    assert_eq!(host.active_tree().total_page_scale_factor(), 2.0);
    let offset = host.active_tree().total_scroll_offset();
    assert!((offset - Vec2::new(25.0, 25.0)).hypot() < 1e-9, "offset {offset:?}");
}

#[test]
fn page_scale_animation_uses_the_configured_duration() {
    let mut host = host_with_tree(viewport_tree(LayerTreeSettings::default()));
    host.start_page_scale_animation(Vec2::ZERO, false, 3.0, None);
    host.animate(ms(0));
    host.animate(ms(299));
    assert!(host.page_scale_animation().is_some());
    host.animate(ms(300));
    assert!(host.page_scale_animation().is_none());
    assert_eq!(host.active_tree().total_page_scale_factor(), 3.0);
}

#[test]
fn page_scale_animation_needs_an_inner_viewport() {
    let mut tree = viewport_tree(LayerTreeSettings::default());
    tree.clear_viewport_layer_roles();
    let mut host = host_with_tree(tree);
    host.start_page_scale_animation(Vec2::ZERO, false, 2.0, None);
    assert!(host.page_scale_animation().is_none());
}

#[test]
fn pinch_cancels_a_page_scale_animation() {
    let mut host = host_with_tree(viewport_tree(LayerTreeSettings::default()));
    host.start_page_scale_animation(Vec2::ZERO, false, 2.0, None);
    host.pinch_gesture_begin();
    assert!(host.page_scale_animation().is_none());
}

#[test]
fn scrollbars_show_during_a_gesture_and_fade_after_it() {
    let mut host = scrollbar_host(LayerTreeSettings::default());
    assert_eq!(fade_phase(&host), Some(FadePhase::Hidden));

    let at = Point::new(10.0, 10.0);
    host.scroll_begin(at, ScrollInputType::Gesture);
    assert_eq!(fade_phase(&host), Some(FadePhase::Shown));
    host.scroll_by(at, Vec2::new(0.0, 10.0));
    host.scroll_end();
    assert_eq!(fade_phase(&host), Some(FadePhase::PendingFade { since: Duration::ZERO }));
    assert!(host.client().animates > 0);

    host.animate(ms(300));
    assert_eq!(fade_phase(&host), Some(FadePhase::Fading { started: ms(300) }));
    host.animate(ms(450));
    let fade = host.active_tree().layer(LayerId(2)).unwrap().scrollbar_fade().unwrap();
    assert_eq!(fade.opacity(), 0.5);
    assert_eq!(
        host.active_tree().layer(LayerId(6)).unwrap().props.update_rect,
        Rect::new(0.0, 0.0, 5.0, 50.0)
    );

    host.animate(ms(600));
    assert_eq!(fade_phase(&host), Some(FadePhase::Hidden));
}

#[test]
fn wheel_scrolls_flash_the_scrollbars() {
    let mut host = scrollbar_host(LayerTreeSettings::default());
    host.animate(ms(1000));
    let at = Point::new(10.0, 10.0);
    host.scroll_begin(at, ScrollInputType::Wheel);
    assert_eq!(fade_phase(&host), Some(FadePhase::Hidden));
    host.scroll_by(at, Vec2::new(0.0, 10.0));
    assert_eq!(fade_phase(&host), Some(FadePhase::PendingFade { since: ms(1000) }));
}

#[test]
fn fade_controllers_follow_the_settings() {
    let settings = LayerTreeSettings {
        scrollbar_fade_enabled: false,
        ..LayerTreeSettings::default()
    };
    let host = scrollbar_host(settings);
    assert_eq!(fade_phase(&host), None);
}

#[test]
fn orphaned_fade_controllers_are_dropped() {
    let mut host = scrollbar_host(LayerTreeSettings::default());
    let settings = host.settings().clone();
    let mut tree = host.active_tree_mut();
    tree.remove_layer(LayerId(6)).unwrap();
    sync_scrollbar_fade_controllers(&mut tree, &settings);
    drop(tree);
    assert_eq!(fade_phase(&host), None);
}

#[test]
fn top_controls_settle_after_a_partial_scroll() {
    let settings = LayerTreeSettings {
        top_controls_height: 10.0,
        ..LayerTreeSettings::default()
    };
    let mut host = host_with_tree(viewport_tree(settings));
    let at = Point::new(10.0, 10.0);
    host.scroll_begin(at, ScrollInputType::Gesture);
    host.scroll_by(at, Vec2::new(0.0, 5.0));
    host.scroll_end();
    assert!(host.top_controls().unwrap().is_animating());

    host.animate(ms(1000));
    host.animate(ms(1200));
    let tc = host.top_controls().unwrap();
    assert!(!tc.is_animating());
    assert_eq!(tc.content_top_offset(), 0.0);
    assert_eq!(host.active_tree().layer(LayerId(4)).unwrap().bounds_delta(), Vec2::ZERO);
    assert_eq!(host.active_tree().total_scroll_offset(), Vec2::ZERO);
}
