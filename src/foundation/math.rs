use kurbo::{Affine, Point, Rect, Size, Vec2};
use smallvec::SmallVec;

/// Threshold under which a determinant is treated as zero.
pub(crate) const DETERMINANT_EPSILON: f64 = 1e-9;

pub(crate) fn rect_is_empty(r: Rect) -> bool {
    // Written this way so NaN extents also count as empty.
    !(r.width() > 0.0 && r.height() > 0.0)
}

pub(crate) fn size_is_empty(s: Size) -> bool {
    !(s.width > 0.0 && s.height > 0.0)
}

pub(crate) fn rect_from_size(s: Size) -> Rect {
    Rect::from_origin_size(Point::ZERO, s)
}

/// Intersection that collapses disjoint inputs to `Rect::ZERO`.
pub(crate) fn intersect(a: Rect, b: Rect) -> Rect {
    let r = a.intersect(b);
    if rect_is_empty(r) { Rect::ZERO } else { r }
}

/// Union that ignores empty operands.
pub(crate) fn union_nonempty(a: Rect, b: Rect) -> Rect {
    match (rect_is_empty(a), rect_is_empty(b)) {
        (true, true) => Rect::ZERO,
        (true, false) => b,
        (false, true) => a,
        (false, false) => a.union(b),
    }
}

pub(crate) fn contains_rect(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

/// Axis-aligned bounding box of `r` mapped through `t`.
pub(crate) fn map_rect(t: Affine, r: Rect) -> Rect {
    if rect_is_empty(r) {
        return Rect::ZERO;
    }
    t.transform_rect_bbox(r)
}

pub(crate) fn enclosing_rect(r: Rect) -> Rect {
    if rect_is_empty(r) { Rect::ZERO } else { r.expand() }
}

pub(crate) fn is_invertible(t: Affine) -> bool {
    let det = t.determinant();
    t.is_finite() && det.is_finite() && det.abs() > DETERMINANT_EPSILON
}

pub(crate) fn try_inverse(t: Affine) -> Option<Affine> {
    is_invertible(t).then(|| t.inverse())
}

/// The transform with its translation dropped.
pub(crate) fn linear_part(t: Affine) -> Affine {
    let [a, b, c, d, _, _] = t.as_coeffs();
    Affine::new([a, b, c, d, 0.0, 0.0])
}

/// `v` mapped through the linear part of `t`.
pub(crate) fn map_vec(t: Affine, v: Vec2) -> Vec2 {
    let [a, b, c, d, _, _] = t.as_coeffs();
    Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
}

/// Length of the mapped unit x and y axes.
pub(crate) fn scale_components(t: Affine) -> Vec2 {
    let [a, b, c, d, _, _] = t.as_coeffs();
    Vec2::new(a.hypot(b), c.hypot(d))
}

pub(crate) fn is_axis_aligned(t: Affine) -> bool {
    let [a, b, c, d, _, _] = t.as_coeffs();
    let eps = DETERMINANT_EPSILON;
    (b.abs() < eps && c.abs() < eps) || (a.abs() < eps && d.abs() < eps)
}

pub(crate) fn floor_vec(v: Vec2) -> Vec2 {
    Vec2::new(v.x.floor(), v.y.floor())
}

pub(crate) fn clamp_vec(v: Vec2, min: Vec2, max: Vec2) -> Vec2 {
    Vec2::new(v.x.max(min.x).min(max.x), v.y.max(min.y).min(max.y))
}

/// `a` minus `b`, as up to four disjoint pieces.
pub(crate) fn subtract_rect(a: Rect, b: Rect) -> SmallVec<[Rect; 4]> {
    let mut out = SmallVec::new();
    let i = intersect(a, b);
    if rect_is_empty(i) {
        if !rect_is_empty(a) {
            out.push(a);
        }
        return out;
    }
    let pieces = [
        Rect::new(a.x0, a.y0, a.x1, i.y0),
        Rect::new(a.x0, i.y1, a.x1, a.y1),
        Rect::new(a.x0, i.y0, i.x0, i.y1),
        Rect::new(i.x1, i.y0, a.x1, i.y1),
    ];
    for p in pieces {
        if !rect_is_empty(p) {
            out.push(p);
        }
    }
    out
}

/// A set of points stored as disjoint rectangles.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    /// Empty region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Region covering exactly `r`.
    pub fn from_rect(r: Rect) -> Self {
        let mut out = Self::new();
        out.union_rect(r);
        out
    }

    /// Whether the region covers no area.
    pub fn is_empty(&self) -> bool {
        self.rects.iter().all(|r| rect_is_empty(*r))
    }

    /// The rectangles making up the region.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Bounding box of the region.
    pub fn bounds(&self) -> Rect {
        self.rects
            .iter()
            .fold(Rect::ZERO, |acc, r| union_nonempty(acc, *r))
    }

    /// Add `r` to the region.
    pub fn union_rect(&mut self, r: Rect) {
        let mut pieces: Vec<Rect> = vec![r];
        for existing in &self.rects {
            pieces = pieces
                .into_iter()
                .flat_map(|p| subtract_rect(p, *existing))
                .collect();
            if pieces.is_empty() {
                return;
            }
        }
        self.rects.extend(pieces);
    }

    /// Remove `r` from the region.
    pub fn subtract_rect(&mut self, r: Rect) {
        self.rects = self
            .rects
            .iter()
            .flat_map(|p| subtract_rect(*p, r))
            .collect();
    }

    /// Remove every rectangle of `other` from the region.
    pub fn subtract(&mut self, other: &Region) {
        for r in &other.rects {
            self.subtract_rect(*r);
        }
    }

    /// Whether `p` lies inside the region.
    pub fn contains_point(&self, p: Point) -> bool {
        self.rects.iter().any(|r| r.contains(p))
    }

    /// Whether every point of `r` lies inside the region.
    pub fn contains_rect(&self, r: Rect) -> bool {
        let mut rest = Region::from_rect(r);
        rest.subtract(self);
        rest.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
