use super::*;

#[test]
fn intersect_of_disjoint_rects_is_zero() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(20.0, 20.0, 30.0, 30.0);
    assert_eq!(intersect(a, b), Rect::ZERO);
    assert_eq!(union_nonempty(Rect::ZERO, b), b);
}

#[test]
fn singular_transforms_are_not_invertible() {
    assert!(is_invertible(Affine::scale(2.0)));
    assert!(!is_invertible(Affine::scale_non_uniform(1.0, 0.0)));
    assert!(try_inverse(Affine::scale(0.0)).is_none());
}

#[test]
fn rotation_by_quarter_turn_stays_axis_aligned() {
    assert!(is_axis_aligned(Affine::rotate(std::f64::consts::FRAC_PI_2)));
    assert!(!is_axis_aligned(Affine::rotate(0.3)));
    let s = scale_components(Affine::scale_non_uniform(2.0, 3.0));
    assert_eq!(s, Vec2::new(2.0, 3.0));
}

#[test]
fn subtract_rect_splits_around_hole() {
    let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
    let hole = Rect::new(2.0, 2.0, 8.0, 8.0);
    let pieces = subtract_rect(outer, hole);
    assert_eq!(pieces.len(), 4);
    let area: f64 = pieces.iter().map(|r| r.area()).sum();
    assert_eq!(area, 100.0 - 36.0);
}

#[test]
fn region_coverage_spans_multiple_rects() {
    let mut region = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 5.0));
    region.union_rect(Rect::new(0.0, 5.0, 10.0, 10.0));
    assert!(region.contains_rect(Rect::new(1.0, 1.0, 9.0, 9.0)));
    assert!(!region.contains_rect(Rect::new(1.0, 1.0, 11.0, 9.0)));

    region.subtract_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
    assert!(region.is_empty());
}

#[test]
fn region_union_keeps_rects_disjoint() {
    let mut region = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
    region.union_rect(Rect::new(5.0, 5.0, 15.0, 15.0));
    let area: f64 = region.rects().iter().map(|r| r.area()).sum();
    assert_eq!(area, 100.0 + 100.0 - 25.0);
    assert_eq!(region.bounds(), Rect::new(0.0, 0.0, 15.0, 15.0));
    assert!(region.contains_point(Point::new(12.0, 12.0)));
}
