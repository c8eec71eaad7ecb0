use super::*;

fn bar() -> TopControlsManager {
    TopControlsManager::new(50.0, Duration::from_millis(200))
}

#[test]
fn scrolling_down_hides_the_bar_before_the_content_moves() {
    let mut tc = bar();
    tc.scroll_begin();
    assert_eq!(tc.scroll_by(Vec2::new(3.0, 20.0)), Vec2::new(3.0, 0.0));
    assert_eq!(tc.content_top_offset(), 30.0);
    assert_eq!(tc.controls_top_offset(), -20.0);

    assert_eq!(tc.scroll_by(Vec2::new(0.0, 40.0)), Vec2::new(0.0, 10.0));
    assert_eq!(tc.content_top_offset(), 0.0);
}

#[test]
fn scrolling_up_reveals_a_hidden_bar() {
    let mut tc = bar();
    tc.scroll_begin();
    tc.scroll_by(Vec2::new(0.0, 50.0));
    tc.scroll_end();
    assert!(!tc.is_animating());

    tc.scroll_begin();
    assert_eq!(tc.scroll_by(Vec2::new(0.0, -20.0)), Vec2::ZERO);
    assert_eq!(tc.content_top_offset(), 20.0);
    assert_eq!(tc.scroll_by(Vec2::new(0.0, -40.0)), Vec2::new(0.0, -10.0));
    assert_eq!(tc.content_top_offset(), 50.0);
}

#[test]
fn partially_shown_bar_settles_in_the_scroll_direction() {
    let mut tc = bar();
    tc.scroll_begin();
    tc.scroll_by(Vec2::new(0.0, 20.0));
    tc.scroll_end();
    assert!(tc.is_animating());

    let t0 = Duration::from_secs(1);
    assert_eq!(tc.animate(t0), Vec2::ZERO);
    assert_eq!(tc.animate(t0 + Duration::from_millis(200)), Vec2::new(0.0, -30.0));
    assert!(!tc.is_animating());
    assert_eq!(tc.content_top_offset(), 0.0);
}

#[test]
fn bar_settles_shown_after_scrolling_up() {
    let mut tc = bar();
    tc.scroll_begin();
    tc.scroll_by(Vec2::new(0.0, 50.0));
    tc.scroll_begin();
    tc.scroll_by(Vec2::new(0.0, -10.0));
    tc.scroll_end();

    let t0 = Duration::from_secs(2);
    tc.animate(t0);
    let mid = tc.animate(t0 + Duration::from_millis(100));
    assert!(mid.y > 0.0);
    tc.animate(t0 + Duration::from_millis(200));
    assert_eq!(tc.controls_top_offset(), 0.0);
}

#[test]
fn new_gesture_cancels_the_settle_animation() {
    let mut tc = bar();
    tc.scroll_begin();
    tc.scroll_by(Vec2::new(0.0, 20.0));
    tc.scroll_end();
    tc.scroll_begin();
    assert!(!tc.is_animating());
    assert_eq!(tc.animate(Duration::from_secs(5)), Vec2::ZERO);
}

#[test]
fn pinching_ignores_scroll() {
    let mut tc = bar();
    tc.pinch_begin();
    assert_eq!(tc.scroll_by(Vec2::new(0.0, 20.0)), Vec2::new(0.0, 20.0));
    assert_eq!(tc.content_top_offset(), 50.0);
    tc.pinch_end();
    assert_eq!(tc.scroll_by(Vec2::new(0.0, 20.0)), Vec2::ZERO);
}
