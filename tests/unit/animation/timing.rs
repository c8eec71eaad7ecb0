use super::*;

#[test]
fn endpoints_are_fixed() {
    let c = CubicBezier::page_scale();
    assert_eq!(c.apply(0.0), 0.0);
    assert_eq!(c.apply(1.0), 1.0);
    assert_eq!(c.apply(-3.0), 0.0);
    assert_eq!(c.apply(7.0), 1.0);
}

#[test]
fn linear_control_points_give_identity() {
    let c = CubicBezier::new(1.0 / 3.0, 1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0);
    for x in [0.1, 0.25, 0.5, 0.9] {
        assert!((c.apply(x) - x).abs() < 1e-5, "x={x}");
    }
}

#[test]
fn curves_are_monotonic() {
    for c in [CubicBezier::ease(), CubicBezier::page_scale()] {
        let mut prev = 0.0;
        for i in 1..=100 {
            let y = c.apply(i as f64 / 100.0);
            assert!(y + 1e-9 >= prev);
            prev = y;
        }
    }
}

#[test]
fn page_scale_curve_starts_slowly() {
    let c = CubicBezier::page_scale();
    assert!(c.apply(0.2) < 0.1);
    assert!(c.apply(0.8) > 0.8);
}
