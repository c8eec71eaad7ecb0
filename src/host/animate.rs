use std::time::Duration;

use smallvec::SmallVec;

use crate::animation::page_scale::PageScaleAnimation;
use crate::animation::scrollbar::ScrollbarFadeController;
use crate::animation::timing::CubicBezier;
use crate::foundation::core::{LayerId, Vec2};
use crate::foundation::math::rect_from_size;
use crate::foundation::settings::LayerTreeSettings;
use crate::host::client::HostClient;
use crate::host::host::LayerTreeHost;
use crate::layer::content::LayerContent;
use crate::tree::layer_tree::LayerTree;

impl<C: HostClient> LayerTreeHost<C> {
    /// Advance impl-side animations to `now`: a programmatic page-scale zoom,
    /// the top-controls settle animation and scrollbar fades.
    #[tracing::instrument(skip(self))]
    pub fn animate(&mut self, now: Duration) {
        self.current_frame_time = now;
        self.animate_page_scale(now);
        self.animate_top_controls(now);
        self.animate_scrollbars(now);
    }

    /// Start zooming the viewport towards `page_scale`.
    ///
    /// With `anchor_point` set, `target` is a layer-space point that stays put
    /// on screen; otherwise it is the scroll offset to end at. `None` takes the
    /// duration from the settings. Replaces any animation already running.
    pub fn start_page_scale_animation(
        &mut self,
        target: Vec2,
        anchor_point: bool,
        page_scale: f64,
        duration: Option<Duration>,
    ) {
        if self.active_tree.inner_viewport_scroll_layer_id().is_none() {
            return;
        }
        let duration =
            duration.unwrap_or_else(|| Duration::from_millis(self.settings.page_scale_animation_ms));
        let mut animation = PageScaleAnimation::new(
            self.active_tree.total_scroll_offset(),
            self.active_tree.total_page_scale_factor(),
            self.unscaled_viewport_size(),
            self.active_tree.scrollable_size(),
            CubicBezier::page_scale(),
        );
        if anchor_point {
            animation.zoom_with_anchor(target, page_scale, duration);
        } else {
            animation.zoom_to(target, page_scale, duration);
        }
        tracing::debug!(page_scale, ?duration, "page scale animation started");
        self.page_scale_animation = Some(animation);
        self.client.set_needs_animate();
        self.client.set_needs_commit();
    }

    fn animate_page_scale(&mut self, now: Duration) {
        let Some(animation) = self.page_scale_animation.as_mut() else {
            return;
        };
        if !animation.is_started() {
            animation.start(now);
        }
        let scale = animation.page_scale_at(now);
        let next_scroll = animation.scroll_offset_at(now);
        let complete = animation.is_complete_at(now);

        let factor = self.active_tree.page_scale_factor();
        self.active_tree.set_page_scale_delta(scale / factor);
        let scroll_total = self.active_tree.total_scroll_offset();
        self.scroll_viewport_by(next_scroll - scroll_total);
        self.client.set_needs_redraw(None);

        if complete {
            self.page_scale_animation = None;
            self.client.set_needs_commit();
        } else {
            self.client.set_needs_animate();
        }
    }

    fn animate_top_controls(&mut self, now: Duration) {
        let Some(tc) = self.top_controls.as_mut() else {
            return;
        };
        if !tc.is_animating() {
            return;
        }
        let delta = tc.animate(now);
        let still_animating = tc.is_animating();
        if delta != Vec2::ZERO {
            self.did_change_top_controls_position();
            if self.active_tree.total_scroll_offset().y != 0.0 {
                let scale = self.active_tree.total_page_scale_factor();
                self.scroll_viewport_by(delta / scale);
                self.client.set_needs_commit();
            }
        }
        if still_animating {
            self.client.set_needs_animate();
        }
    }

    fn animate_scrollbars(&mut self, now: Duration) {
        let mut changed: SmallVec<[LayerId; 4]> = SmallVec::new();
        let mut still_animating = false;
        for (id, layer) in self.active_tree.layers.iter_mut() {
            if let Some(fade) = layer.scrollbar_fade.as_mut() {
                if fade.animate(now) {
                    changed.push(*id);
                }
                still_animating |= fade.is_animating();
            }
        }
        if !changed.is_empty() {
            // Thumb opacity is not part of the tracked layer state, so the
            // scrollbars are marked as updated instead.
            for layer in self.active_tree.layers.values_mut() {
                if let LayerContent::Scrollbar(sb) = &layer.props.content
                    && sb.scroll_layer.is_some_and(|s| changed.contains(&s))
                {
                    layer.props.update_rect = rect_from_size(layer.props.bounds);
                }
            }
            self.client.set_needs_redraw(None);
        }
        if still_animating {
            self.client.set_needs_animate();
        }
    }
}

/// Give every scroll layer that some scrollbar tracks a fade controller,
/// keeping controllers that already exist and dropping orphaned ones.
pub(crate) fn sync_scrollbar_fade_controllers(tree: &mut LayerTree, settings: &LayerTreeSettings) {
    let mut tracked: SmallVec<[LayerId; 4]> = SmallVec::new();
    if settings.scrollbar_fade_enabled {
        for layer in tree.layers.values() {
            if let LayerContent::Scrollbar(sb) = &layer.props.content
                && let Some(scroll) = sb.scroll_layer
                && !tracked.contains(&scroll)
            {
                tracked.push(scroll);
            }
        }
    }
    for (id, layer) in tree.layers.iter_mut() {
        if !tracked.contains(id) {
            layer.scrollbar_fade = None;
        } else if layer.scrollbar_fade.is_none() {
            layer.scrollbar_fade = Some(ScrollbarFadeController::new(
                Duration::from_millis(settings.scrollbar_fade_delay_ms),
                Duration::from_millis(settings.scrollbar_fade_duration_ms),
            ));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/animate.rs"]
mod tests;
