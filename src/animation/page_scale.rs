use std::time::Duration;

use crate::animation::timing::CubicBezier;
use crate::foundation::core::{Size, Vec2};

fn normalize(v: Vec2, viewport: Size) -> Vec2 {
    let sx = if viewport.width > 0.0 { 1.0 / viewport.width } else { 0.0 };
    let sy = if viewport.height > 0.0 { 1.0 / viewport.height } else { 0.0 };
    Vec2::new(v.x * sx, v.y * sy)
}

fn denormalize(v: Vec2, viewport: Size) -> Vec2 {
    Vec2::new(v.x * viewport.width, v.y * viewport.height)
}

fn lerp(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    a + (b - a) * t
}

/// Animated zoom of the viewport towards a target scale and scroll offset.
///
/// Scroll offsets and anchors are in layer space (CSS pixels); `viewport_size`
/// is the viewport at page scale 1. The animation keeps an anchor point at the
/// same relative viewport position throughout, and interpolates the scale
/// geometrically so zooming in and out feel symmetric.
#[derive(Clone, Debug, PartialEq)]
pub struct PageScaleAnimation {
    start_scroll_offset: Vec2,
    start_page_scale: f64,
    viewport_size: Size,
    root_layer_size: Size,
    timing: CubicBezier,

    target_scroll_offset: Vec2,
    target_page_scale: f64,
    start_anchor: Vec2,
    target_anchor: Vec2,
    duration: Duration,
    start_time: Option<Duration>,
}

impl PageScaleAnimation {
    /// Animation starting at the current scroll offset and total page scale.
    /// Until [`Self::zoom_to`] or [`Self::zoom_with_anchor`] is called it animates
    /// nowhere.
    pub fn new(
        start_scroll_offset: Vec2,
        start_page_scale: f64,
        viewport_size: Size,
        root_layer_size: Size,
        timing: CubicBezier,
    ) -> Self {
        Self {
            start_scroll_offset,
            start_page_scale,
            viewport_size,
            root_layer_size,
            timing,
            target_scroll_offset: start_scroll_offset,
            target_page_scale: start_page_scale,
            start_anchor: start_scroll_offset,
            target_anchor: start_scroll_offset,
            duration: Duration::ZERO,
            start_time: None,
        }
    }

    /// Zoom so that the viewport ends at `target_scroll_offset` with scale
    /// `target_page_scale`. The anchor is inferred from both viewport rects.
    pub fn zoom_to(&mut self, target_scroll_offset: Vec2, target_page_scale: f64, duration: Duration) {
        self.target_page_scale = target_page_scale;
        self.target_scroll_offset = target_scroll_offset;
        self.clamp_target_scroll_offset();
        self.duration = duration;

        if self.start_page_scale == target_page_scale {
            self.start_anchor = self.start_scroll_offset;
            self.target_anchor = self.target_scroll_offset;
            return;
        }
        self.infer_target_anchor_from_scroll_offsets();
        self.start_anchor = self.target_anchor;
    }

    /// Zoom about `anchor`, a layer-space point that stays fixed on screen unless
    /// the target viewport would leave the root layer; then the anchor drifts so
    /// the viewport stays inside.
    pub fn zoom_with_anchor(&mut self, anchor: Vec2, target_page_scale: f64, duration: Duration) {
        self.start_anchor = anchor;
        self.target_page_scale = target_page_scale;
        self.duration = duration;

        let normalized = normalize(anchor - self.start_scroll_offset, self.start_viewport_size());
        self.target_scroll_offset = anchor - denormalize(normalized, self.target_viewport_size());
        self.clamp_target_scroll_offset();

        if self.start_page_scale == self.target_page_scale {
            self.target_anchor = self.start_anchor;
            return;
        }
        self.infer_target_anchor_from_scroll_offsets();
    }

    fn start_viewport_size(&self) -> Size {
        self.viewport_size / self.start_page_scale
    }

    fn target_viewport_size(&self) -> Size {
        self.viewport_size / self.target_page_scale
    }

    fn clamp_target_scroll_offset(&mut self) {
        let target_viewport = self.target_viewport_size();
        let max = Vec2::new(
            self.root_layer_size.width - target_viewport.width,
            self.root_layer_size.height - target_viewport.height,
        );
        let t = self.target_scroll_offset;
        // Max first, then min: a root smaller than the viewport pins to zero.
        self.target_scroll_offset = Vec2::new(t.x.min(max.x).max(0.0), t.y.min(max.y).max(0.0));
    }

    // The anchor sits at the same normalized position in the start and target
    // viewports: anchor = size * n + offset for both, solved for n.
    fn infer_target_anchor_from_scroll_offsets(&mut self) {
        let start = self.start_viewport_size();
        let target = self.target_viewport_size();
        let dw = target.width - start.width;
        let dh = target.height - start.height;
        let d = self.start_scroll_offset - self.target_scroll_offset;
        let normalized = Vec2::new(
            if dw != 0.0 { d.x / dw } else { 0.0 },
            if dh != 0.0 { d.y / dh } else { 0.0 },
        );
        self.target_anchor = self.target_scroll_offset + denormalize(normalized, target);
    }

    /// Scroll offset the animation ends at, after clamping.
    pub fn target_scroll_offset(&self) -> Vec2 {
        self.target_scroll_offset
    }

    /// Page scale the animation ends at.
    pub fn target_page_scale(&self) -> f64 {
        self.target_page_scale
    }

    /// Whether a start time has been recorded.
    pub fn is_started(&self) -> bool {
        self.start_time.is_some()
    }

    /// Record the first tick's time as the start of the animation.
    pub fn start(&mut self, now: Duration) {
        self.start_time = Some(now);
    }

    /// Whether `now` is at or past the end of the animation.
    pub fn is_complete_at(&self, now: Duration) -> bool {
        match self.start_time {
            Some(start) => now >= start + self.duration,
            None => self.duration.is_zero(),
        }
    }

    fn interp_at(&self, now: Duration) -> f64 {
        if self.is_complete_at(now) {
            return 1.0;
        }
        let Some(start) = self.start_time else {
            return 0.0;
        };
        let t = now.saturating_sub(start).as_secs_f64() / self.duration.as_secs_f64();
        self.timing.apply(t)
    }

    fn page_scale_at_interp(&self, interp: f64) -> f64 {
        if interp <= 0.0 {
            return self.start_page_scale;
        }
        if interp >= 1.0 {
            return self.target_page_scale;
        }
        let ratio = self.target_page_scale / self.start_page_scale;
        self.start_page_scale * (ratio.ln() * interp).exp()
    }

    fn scroll_offset_at_interp(&self, interp: f64) -> Vec2 {
        if interp <= 0.0 {
            return self.start_scroll_offset;
        }
        if interp >= 1.0 {
            return self.target_scroll_offset;
        }
        let anchor = lerp(self.start_anchor, self.target_anchor, interp);
        let start_n = normalize(self.start_anchor - self.start_scroll_offset, self.start_viewport_size());
        let target_n = normalize(
            self.target_anchor - self.target_scroll_offset,
            self.target_viewport_size(),
        );
        let viewport_now = self.viewport_size / self.page_scale_at_interp(interp);
        anchor - denormalize(lerp(start_n, target_n, interp), viewport_now)
    }

    /// Total page scale at `now`.
    pub fn page_scale_at(&self, now: Duration) -> f64 {
        self.page_scale_at_interp(self.interp_at(now))
    }

    /// Scroll offset at `now`.
    pub fn scroll_offset_at(&self, now: Duration) -> Vec2 {
        self.scroll_offset_at_interp(self.interp_at(now))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/page_scale.rs"]
mod tests;
