use std::time::Duration;

use crate::animation::timing::CubicBezier;
use crate::foundation::core::Vec2;

#[derive(Clone, Debug, PartialEq)]
struct OffsetAnimation {
    from: f64,
    to: f64,
    start: Option<Duration>,
    duration: Duration,
    timing: CubicBezier,
}

impl OffsetAnimation {
    fn value_at(&self, now: Duration) -> f64 {
        let Some(start) = self.start else {
            return self.from;
        };
        if self.duration.is_zero() {
            return self.to;
        }
        let t = (now.saturating_sub(start).as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        self.from + (self.to - self.from) * self.timing.apply(t)
    }

    fn is_complete_at(&self, now: Duration) -> bool {
        self.start
            .is_some_and(|s| now.saturating_sub(s) >= self.duration)
    }
}

/// Scroll-driven show/hide state of a browser-chrome bar above the content.
///
/// The controls offset lives in `[-height, 0]`: 0 is fully shown, `-height`
/// fully hidden. Vertical scroll is offered here first; whatever moves the bar
/// is consumed and the rest is returned for the content.
#[derive(Clone, Debug, PartialEq)]
pub struct TopControlsManager {
    height: f64,
    offset: f64,
    scroll_begin_offset: f64,
    accumulated_scroll_delta: f64,
    pinching: bool,
    animation_duration: Duration,
    animation: Option<OffsetAnimation>,
}

impl TopControlsManager {
    /// Fully shown controls of the given height.
    pub fn new(height: f64, animation_duration: Duration) -> Self {
        Self {
            height: height.max(0.0),
            offset: 0.0,
            scroll_begin_offset: 0.0,
            accumulated_scroll_delta: 0.0,
            pinching: false,
            animation_duration,
            animation: None,
        }
    }

    /// Bar height in DIPs.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Top of the bar relative to its shown position, in `[-height, 0]`.
    pub fn controls_top_offset(&self) -> f64 {
        self.offset
    }

    /// How far the content is pushed down by the visible part of the bar.
    pub fn content_top_offset(&self) -> f64 {
        self.offset + self.height
    }

    /// Whether a show or hide animation is in flight.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    fn set_offset(&mut self, offset: f64) {
        self.offset = offset.clamp(-self.height, 0.0);
    }

    fn reset_baseline(&mut self) {
        self.accumulated_scroll_delta = 0.0;
        self.scroll_begin_offset = self.offset;
    }

    /// A scroll gesture started.
    pub fn scroll_begin(&mut self) {
        self.animation = None;
        self.reset_baseline();
    }

    /// Offer `pending` to the bar. Returns the part it did not consume.
    pub fn scroll_by(&mut self, pending: Vec2) -> Vec2 {
        if self.pinching {
            return pending;
        }
        self.accumulated_scroll_delta += pending.y;
        let old = self.content_top_offset();
        self.set_offset(self.scroll_begin_offset - self.accumulated_scroll_delta);
        if self.offset == 0.0 {
            self.reset_baseline();
        }
        self.animation = None;
        let applied = old - self.content_top_offset();
        Vec2::new(pending.x, pending.y - applied)
    }

    /// The scroll gesture ended. A partially shown bar settles in the direction
    /// the gesture was heading.
    pub fn scroll_end(&mut self) {
        self.start_animation_if_necessary();
    }

    /// A pinch started; the bar ignores scroll until it ends.
    pub fn pinch_begin(&mut self) {
        self.pinching = true;
        self.start_animation_if_necessary();
    }

    /// The pinch ended.
    pub fn pinch_end(&mut self) {
        self.pinching = false;
        self.reset_baseline();
    }

    fn start_animation_if_necessary(&mut self) {
        if self.offset == 0.0 || self.offset == -self.height {
            return;
        }
        let to = if self.accumulated_scroll_delta <= 0.0 {
            0.0
        } else {
            -self.height
        };
        self.animation = Some(OffsetAnimation {
            from: self.offset,
            to,
            start: None,
            duration: self.animation_duration,
            timing: CubicBezier::ease(),
        });
    }

    /// Advance the settle animation. Returns how far the bar moved, as a
    /// content-space scroll delta.
    pub fn animate(&mut self, now: Duration) -> Vec2 {
        let Some(anim) = self.animation.as_mut() else {
            return Vec2::ZERO;
        };
        if anim.start.is_none() {
            anim.start = Some(now);
        }
        let value = anim.value_at(now);
        let done = anim.is_complete_at(now);
        let old = self.offset;
        self.set_offset(value);
        if done {
            self.animation = None;
            self.reset_baseline();
        }
        Vec2::new(0.0, self.offset - old)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/top_controls.rs"]
mod tests;
