use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn anim(offset: Vec2, scale: f64) -> PageScaleAnimation {
    PageScaleAnimation::new(
        offset,
        scale,
        Size::new(100.0, 100.0),
        Size::new(1000.0, 1000.0),
        CubicBezier::page_scale(),
    )
}

#[test]
fn zoom_to_reaches_target_exactly() {
    let mut a = anim(Vec2::ZERO, 1.0);
    a.zoom_to(Vec2::new(200.0, 100.0), 2.0, ms(300));
    a.start(ms(1000));
    assert_eq!(a.page_scale_at(ms(1000)), 1.0);
    assert_eq!(a.scroll_offset_at(ms(1000)), Vec2::ZERO);
    assert!(!a.is_complete_at(ms(1299)));
    assert!(a.is_complete_at(ms(1300)));
    assert_eq!(a.page_scale_at(ms(1300)), 2.0);
    assert_eq!(a.scroll_offset_at(ms(1300)), Vec2::new(200.0, 100.0));
}

#[test]
fn target_offset_is_clamped_to_root_layer() {
    let mut a = anim(Vec2::ZERO, 1.0);
    // At scale 2 the viewport covers 50x50, so the max offset is 950.
    a.zoom_to(Vec2::new(5000.0, -20.0), 2.0, ms(100));
    assert_eq!(a.target_scroll_offset(), Vec2::new(950.0, 0.0));
}

#[test]
fn scale_interpolates_geometrically() {
    let mut a = anim(Vec2::ZERO, 1.0);
    a.zoom_to(Vec2::ZERO, 4.0, ms(100));
    a.start(Duration::ZERO);
    let s = a.page_scale_at(ms(50));
    let eased = CubicBezier::page_scale().apply(0.5);
    assert!((s - 4f64.powf(eased)).abs() < 1e-9);
}

#[test]
fn anchor_stays_fixed_on_screen() {
    let mut a = anim(Vec2::new(100.0, 100.0), 1.0);
    let anchor = Vec2::new(150.0, 120.0);
    a.zoom_with_anchor(anchor, 2.0, ms(200));
    a.start(Duration::ZERO);
    let rel_start = (anchor - Vec2::new(100.0, 100.0)) * 1.0;
    for t in [50, 100, 150, 200] {
        let scale = a.page_scale_at(ms(t));
        let offset = a.scroll_offset_at(ms(t));
        let rel = (anchor - offset) * scale;
        assert!((rel - rel_start).hypot() < 1e-6, "t={t} rel={rel:?}");
    }
}

#[test]
fn same_scale_pans_linearly_between_offsets() {
    let mut a = anim(Vec2::ZERO, 1.0);
    a.zoom_to(Vec2::new(100.0, 0.0), 1.0, ms(100));
    a.start(Duration::ZERO);
    let mid = a.scroll_offset_at(ms(50));
    let eased = CubicBezier::page_scale().apply(0.5);
    assert!((mid.x - 100.0 * eased).abs() < 1e-9);
    assert_eq!(a.page_scale_at(ms(50)), 1.0);
}
