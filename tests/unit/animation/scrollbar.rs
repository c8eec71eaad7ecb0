use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn gesture_shows_then_fades_after_delay() {
    let mut c = ScrollbarFadeController::new(ms(300), ms(300));
    assert_eq!(c.opacity(), 0.0);
    c.did_scroll_gesture_begin();
    c.did_scroll_update(ms(10));
    assert_eq!(c.phase(), FadePhase::Shown);
    assert_eq!(c.opacity(), 1.0);

    c.did_scroll_gesture_end(ms(100));
    assert!(!c.animate(ms(399)));
    assert_eq!(c.opacity(), 1.0);

    assert!(c.animate(ms(550)));
    assert!((c.opacity() - 0.5).abs() < 1e-9);

    assert!(c.animate(ms(700)));
    assert_eq!(c.phase(), FadePhase::Hidden);
    assert_eq!(c.opacity(), 0.0);
    assert!(!c.is_animating());
}

#[test]
fn scroll_outside_gesture_restarts_delay() {
    let mut c = ScrollbarFadeController::new(ms(300), ms(300));
    c.did_scroll_update(ms(0));
    c.did_scroll_update(ms(250));
    assert!(!c.animate(ms(500)));
    assert_eq!(c.opacity(), 1.0);
    assert!(c.animate(ms(600)));
}

#[test]
fn update_during_fade_reshows() {
    let mut c = ScrollbarFadeController::new(ms(0), ms(100));
    c.did_scroll_update(ms(0));
    c.animate(ms(50));
    assert!(c.opacity() < 1.0);
    c.did_scroll_update(ms(60));
    assert_eq!(c.opacity(), 1.0);
    assert_eq!(c.phase(), FadePhase::PendingFade { since: ms(60) });
}
