use std::time::Duration;

/// Phase of a [`ScrollbarFadeController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadePhase {
    /// Scrollbars are invisible.
    Hidden,
    /// A gesture is in progress; scrollbars are fully opaque.
    Shown,
    /// Fully opaque, waiting for the fade delay to pass.
    PendingFade {
        /// When the wait started.
        since: Duration,
    },
    /// Fading out.
    Fading {
        /// When the fade started.
        started: Duration,
    },
}

/// Fades a scroll layer's scrollbars in on scroll and out after a quiet period.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollbarFadeController {
    delay: Duration,
    duration: Duration,
    phase: FadePhase,
    opacity: f64,
}

impl ScrollbarFadeController {
    /// New controller; scrollbars start hidden.
    pub fn new(delay: Duration, duration: Duration) -> Self {
        Self {
            delay,
            duration,
            phase: FadePhase::Hidden,
            opacity: 0.0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    /// Current thumb opacity in `[0, 1]`.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// A scroll gesture began on the layer.
    pub fn did_scroll_gesture_begin(&mut self) {
        self.phase = FadePhase::Shown;
        self.opacity = 1.0;
    }

    /// The layer scrolled. Outside a gesture this restarts the fade delay.
    pub fn did_scroll_update(&mut self, now: Duration) {
        self.opacity = 1.0;
        if self.phase != FadePhase::Shown {
            self.phase = FadePhase::PendingFade { since: now };
        }
    }

    /// The scroll gesture ended.
    pub fn did_scroll_gesture_end(&mut self, now: Duration) {
        if self.phase == FadePhase::Shown {
            self.phase = FadePhase::PendingFade { since: now };
        }
    }

    /// Whether `animate` still has work to do.
    pub fn is_animating(&self) -> bool {
        matches!(
            self.phase,
            FadePhase::PendingFade { .. } | FadePhase::Fading { .. }
        )
    }

    /// Advance to `now`. Returns true if the opacity changed.
    pub fn animate(&mut self, now: Duration) -> bool {
        if let FadePhase::PendingFade { since } = self.phase {
            if now.saturating_sub(since) < self.delay {
                return false;
            }
            self.phase = FadePhase::Fading {
                started: since + self.delay,
            };
        }
        let FadePhase::Fading { started } = self.phase else {
            return false;
        };
        let before = self.opacity;
        let elapsed = now.saturating_sub(started);
        if self.duration.is_zero() || elapsed >= self.duration {
            self.phase = FadePhase::Hidden;
            self.opacity = 0.0;
        } else {
            self.opacity = 1.0 - elapsed.as_secs_f64() / self.duration.as_secs_f64();
        }
        self.opacity != before
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scrollbar.rs"]
mod tests;
