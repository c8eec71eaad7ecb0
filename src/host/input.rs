use smallvec::SmallVec;

use crate::foundation::core::{Affine, LayerId, Point, Vec2};
use crate::foundation::math::{map_vec, try_inverse};
use crate::host::client::HostClient;
use crate::host::host::LayerTreeHost;
use crate::tree::layer_tree::LayerTree;

/// Deltas below this are treated as no movement.
const SCROLL_EPSILON: f64 = 0.1;

/// Share of the clip height scrolled by a page step, leaving some overlap.
const PAGE_STEP_FRACTION: f64 = 0.875;

/// Result of trying to start a scroll gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ScrollStatus {
    /// The producer must handle this gesture.
    OnMainThread,
    /// A layer is now scrolling.
    Started,
    /// Nothing can scroll here.
    Ignored,
    /// The hit layer's scroll chain does not lead to the frontmost scroller, so
    /// the target cannot be decided here.
    Unknown,
}

/// Kind of input driving a scroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ScrollInputType {
    /// Touch or touchpad drag; deltas are in viewport space.
    Gesture,
    /// Mouse wheel; deltas are applied as-is in layer space.
    Wheel,
    /// Touch drag that never hands leftover delta to ancestors.
    NonBubblingGesture,
}

/// Direction of a page step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Towards the start of the content.
    Backward,
    /// Towards the end of the content.
    Forward,
}

fn zero_small_components(v: &mut Vec2) {
    if v.x.abs() < SCROLL_EPSILON {
        v.x = 0.0;
    }
    if v.y.abs() < SCROLL_EPSILON {
        v.y = 0.0;
    }
}

/// Whether `layer` at `device_point` can take a scroll of type `input`.
fn try_scroll(
    tree: &LayerTree,
    id: LayerId,
    device_point: Point,
    input: ScrollInputType,
) -> ScrollStatus {
    let Some(layer) = tree.layer(id) else {
        return ScrollStatus::Ignored;
    };
    if layer.props.should_scroll_on_main_thread {
        return ScrollStatus::OnMainThread;
    }
    let Some(local) = tree.layer_space_point(id, device_point) else {
        return ScrollStatus::Ignored;
    };
    if layer.props.non_fast_scrollable_region.contains_point(local) {
        return ScrollStatus::OnMainThread;
    }
    if input == ScrollInputType::Wheel && layer.props.have_wheel_event_handlers {
        return ScrollStatus::OnMainThread;
    }
    if tree.scroll_clip_layer_id(id).is_none() {
        return ScrollStatus::Ignored;
    }
    let max = tree.max_scroll_offset(id);
    if max.x <= 0.0 && max.y <= 0.0 {
        return ScrollStatus::Ignored;
    }
    ScrollStatus::Started
}

/// The layer itself if it scrolls, else its parent when the layer is the
/// drawn content of a scrolling parent.
fn scroll_layer_for_content_layer(tree: &LayerTree, id: LayerId) -> Option<LayerId> {
    if tree.scroll_clip_layer_id(id).is_some() {
        return Some(id);
    }
    let layer = tree.layer(id)?;
    let parent = layer.parent()?;
    (layer.props.draws_content && tree.scroll_clip_layer_id(parent).is_some()).then_some(parent)
}

/// Whether the first scrollable layer up `child`'s scroll chain is
/// `scroll_ancestor`.
fn has_scroll_ancestor(tree: &LayerTree, child: LayerId, scroll_ancestor: LayerId) -> bool {
    let mut cur = Some(child);
    while let Some(id) = cur {
        if tree.scroll_clip_layer_id(id).is_some() {
            return id == scroll_ancestor;
        }
        cur = tree.next_scroll_layer(id);
    }
    false
}

/// Outcome of the scroll-target walk.
enum ScrollTarget {
    MainThread,
    Layer(Option<LayerId>),
}

impl<C: HostClient> LayerTreeHost<C> {
    /// Viewport point (DIPs) to device space.
    pub(crate) fn device_point(&self, viewport_point: Point) -> Point {
        let dsf = self.device_scale_factor;
        self.external_transform * Point::new(viewport_point.x * dsf, viewport_point.y * dsf)
    }

    fn find_scroll_layer_for_device_point(
        &self,
        device_point: Point,
        input: ScrollInputType,
        hit: Option<LayerId>,
    ) -> (ScrollTarget, bool) {
        let tree = &self.active_tree;
        let mut affects_handler = false;
        let mut potential = None;
        let mut cur = hit;
        while let Some(id) = cur {
            cur = tree.next_scroll_layer(id);
            if try_scroll(tree, id, device_point, input) == ScrollStatus::OnMainThread {
                return (ScrollTarget::MainThread, affects_handler);
            }
            let Some(scroll_id) = scroll_layer_for_content_layer(tree, id) else {
                continue;
            };
            let status = try_scroll(tree, scroll_id, device_point, input);
            if status == ScrollStatus::OnMainThread {
                return (ScrollTarget::MainThread, affects_handler);
            }
            if tree
                .layer(scroll_id)
                .is_some_and(|l| l.props.have_scroll_event_handlers)
            {
                affects_handler = true;
            }
            if status == ScrollStatus::Started && potential.is_none() {
                potential = Some(scroll_id);
            }
        }
        // Fall back to the viewport so root overscroll is still reported.
        let target = potential
            .or_else(|| tree.outer_viewport_scroll_layer_id())
            .or_else(|| tree.inner_viewport_scroll_layer_id());
        (ScrollTarget::Layer(target), affects_handler)
    }

    /// Start a scroll gesture at `viewport_point` (DIPs).
    #[tracing::instrument(skip(self))]
    pub fn scroll_begin(&mut self, viewport_point: Point, input: ScrollInputType) -> ScrollStatus {
        if let Some(tc) = self.top_controls.as_mut() {
            tc.scroll_begin();
        }
        self.clear_currently_scrolling_layer();

        let device_point = self.device_point(viewport_point);
        let hit = self.active_tree.find_layer_that_is_hit_by_point(device_point);
        if let Some(hit) = hit
            && let Some(scroller) = self
                .active_tree
                .find_first_scrolling_layer_that_is_hit_by_point(device_point)
            && !has_scroll_ancestor(&self.active_tree, hit, scroller)
        {
            tracing::debug!(%hit, %scroller, "scroll target unknown");
            return ScrollStatus::Unknown;
        }

        let (target, affects_handler) = self.find_scroll_layer_for_device_point(device_point, input, hit);
        self.gesture.scroll_affects_scroll_handler = affects_handler;
        let layer = match target {
            ScrollTarget::MainThread => {
                tracing::debug!("scroll must run on the main thread");
                return ScrollStatus::OnMainThread;
            }
            ScrollTarget::Layer(None) => return ScrollStatus::Ignored,
            ScrollTarget::Layer(Some(layer)) => layer,
        };

        self.active_tree.set_currently_scrolling_layer(Some(layer));
        self.gesture.should_bubble_scrolls = input != ScrollInputType::NonBubblingGesture;
        self.gesture.wheel_scrolling = input == ScrollInputType::Wheel;
        if input != ScrollInputType::Wheel
            && let Some(fade) = self
                .active_tree
                .layers
                .get_mut(&layer)
                .and_then(|l| l.scrollbar_fade.as_mut())
        {
            fade.did_scroll_gesture_begin();
        }
        self.client.scroll_affects_scroll_handler(affects_handler);
        ScrollStatus::Started
    }

    /// Scroll `id` by a viewport-space delta, mapped through the layer's screen
    /// transform so content tracks the finger. Returns the applied delta in
    /// viewport space.
    fn scroll_layer_with_viewport_space_delta(&mut self, id: LayerId, viewport_delta: Vec2) -> Vec2 {
        let Some(layer) = self.active_tree.layer(id) else {
            return Vec2::ZERO;
        };
        let screen = layer.draw.screen_space_transform;
        let cs = layer.draw.contents_scale;
        let Some(inv) = try_inverse(screen) else {
            return Vec2::ZERO;
        };
        let dsf = self.device_scale_factor;
        let screen_delta = map_vec(self.external_transform, viewport_delta * dsf);
        let local = map_vec(inv, screen_delta) / cs;
        let applied = self.active_tree.scroll_by(id, local);
        let applied_screen = map_vec(screen, applied * cs);
        let from_external = try_inverse(self.external_transform).unwrap_or(Affine::IDENTITY);
        map_vec(from_external, applied_screen) / dsf
    }

    /// Apply `delta` (viewport space for gestures, layer space for wheels) to the
    /// scrolling layer, handing what it cannot take to scrollable ancestors when
    /// the gesture bubbles. Returns whether anything (content or the top
    /// controls) moved.
    #[tracing::instrument(skip(self))]
    pub fn scroll_by(&mut self, viewport_point: Point, delta: Vec2) -> bool {
        let Some(start) = self.active_tree.currently_scrolling_layer_id() else {
            return false;
        };
        self.active_tree.update_draw_properties();

        let inner = self.active_tree.inner_viewport_scroll_layer_id();
        let outer = self.active_tree.outer_viewport_scroll_layer_id();
        let consume_by_top_controls = self.top_controls.is_some()
            && (((Some(start) == inner || Some(start) == outer)
                && inner.is_some_and(|i| self.active_tree.max_scroll_offset(i).y > 0.0))
                || delta.y < 0.0);

        let mut pending = delta;
        let mut unused_root_delta = Vec2::ZERO;
        let (mut did_scroll_x, mut did_scroll_y) = (false, false);
        let mut did_scroll_top_controls = false;
        let mut moved: SmallVec<[LayerId; 4]> = SmallVec::new();

        let mut cur = Some(start);
        while let Some(id) = cur {
            cur = self.active_tree.layer(id).and_then(|l| l.parent());
            if self.active_tree.scroll_clip_layer_id(id).is_none() {
                continue;
            }

            if Some(id) == inner {
                if consume_by_top_controls && let Some(tc) = self.top_controls.as_mut() {
                    let before = tc.content_top_offset();
                    let excess = tc.scroll_by(pending);
                    let moved_bar = tc.content_top_offset() != before;
                    if excess.y != pending.y {
                        did_scroll_top_controls = true;
                    }
                    pending = excess;
                    if moved_bar {
                        self.did_change_top_controls_position();
                    }
                }
                unused_root_delta = pending;
            }

            let applied = if self.gesture.wheel_scrolling {
                self.active_tree.scroll_by(id, pending)
            } else {
                self.scroll_layer_with_viewport_space_delta(id, pending)
            };

            if Some(id) == inner {
                unused_root_delta -= applied;
                zero_small_components(&mut unused_root_delta);
                if self.settings.report_overscroll_only_for_scrollable_axes {
                    let max = self.active_tree.total_max_scroll_offset();
                    let (h, v) = self.active_tree.layer(id).map_or((false, false), |l| {
                        (
                            l.props.user_scrollable_horizontal,
                            l.props.user_scrollable_vertical,
                        )
                    });
                    if max.x.abs() <= SCROLL_EPSILON || !h {
                        unused_root_delta.x = 0.0;
                    }
                    if max.y.abs() <= SCROLL_EPSILON || !v {
                        unused_root_delta.y = 0.0;
                    }
                }
            }

            let moved_x = applied.x.abs() > SCROLL_EPSILON;
            let moved_y = applied.y.abs() > SCROLL_EPSILON;
            did_scroll_x |= moved_x;
            did_scroll_y |= moved_y;
            if !moved_x && !moved_y {
                // Scrolls always bubble between the outer and inner viewports.
                if self.gesture.should_bubble_scrolls
                    || !self.gesture.did_lock_scrolling_layer
                    || Some(id) == outer
                {
                    continue;
                }
                break;
            }

            moved.push(id);
            self.gesture.did_lock_scrolling_layer = true;
            if !self.gesture.should_bubble_scrolls {
                self.active_tree.set_currently_scrolling_layer(Some(id));
                break;
            }

            pending -= applied;
            zero_small_components(&mut pending);
            if pending == Vec2::ZERO {
                break;
            }
        }

        let did_scroll_content = did_scroll_x || did_scroll_y;
        if did_scroll_content {
            self.client.set_needs_commit();
            self.client.set_needs_redraw(None);
        }
        let now = self.current_frame_time;
        for id in moved {
            if let Some(fade) = self
                .active_tree
                .layers
                .get_mut(&id)
                .and_then(|l| l.scrollbar_fade.as_mut())
            {
                fade.did_scroll_update(now);
            }
        }

        let overscroll = &mut self.gesture.accumulated_root_overscroll;
        if did_scroll_x {
            overscroll.x = 0.0;
        }
        if did_scroll_y {
            overscroll.y = 0.0;
        }
        *overscroll += unused_root_delta;
        let accumulated = *overscroll;
        if unused_root_delta != Vec2::ZERO {
            self.client.did_overscroll(accumulated, unused_root_delta);
        }

        did_scroll_content || did_scroll_top_controls
    }

    /// Overscroll accumulated by the current gesture.
    pub fn accumulated_root_overscroll(&self) -> Vec2 {
        self.gesture.accumulated_root_overscroll
    }

    /// Scroll by one page on the first layer up the current scroll chain that
    /// can still move vertically. That layer becomes the scrolling layer.
    pub fn scroll_vertically_by_page(&mut self, direction: ScrollDirection) -> bool {
        let mut cur = self.active_tree.currently_scrolling_layer_id();
        while let Some(id) = cur {
            cur = self.active_tree.layer(id).and_then(|l| l.parent());
            let Some(clip) = self
                .active_tree
                .scroll_clip_layer_id(id)
                .and_then(|c| self.active_tree.layer(c))
            else {
                continue;
            };
            if !self
                .active_tree
                .layer(id)
                .is_some_and(|l| l.props.user_scrollable_vertical)
            {
                continue;
            }
            let mut page = (clip.effective_bounds().height * PAGE_STEP_FRACTION).max(1.0);
            if direction == ScrollDirection::Backward {
                page = -page;
            }
            let applied = self.active_tree.scroll_by(id, Vec2::new(0.0, page));
            if applied != Vec2::ZERO {
                self.client.set_needs_commit();
                self.client.set_needs_redraw(None);
                return true;
            }
            self.active_tree.set_currently_scrolling_layer(Some(id));
        }
        false
    }

    /// Continue the current gesture as a fling. Touch flings lock to the first
    /// layer that moves on the next `scroll_by`.
    pub fn fling_scroll_begin(&mut self) -> ScrollStatus {
        let Some(current) = self.active_tree.currently_scrolling_layer_id() else {
            return ScrollStatus::Ignored;
        };
        let is_viewport = Some(current) == self.active_tree.inner_viewport_scroll_layer_id()
            || Some(current) == self.active_tree.outer_viewport_scroll_layer_id();
        if self.settings.ignore_root_layer_flings && is_viewport {
            self.clear_currently_scrolling_layer();
            return ScrollStatus::Ignored;
        }
        if !self.gesture.wheel_scrolling {
            self.gesture.did_lock_scrolling_layer = false;
            self.gesture.should_bubble_scrolls = false;
        }
        ScrollStatus::Started
    }

    /// End the scroll gesture.
    pub fn scroll_end(&mut self) {
        if let Some(tc) = self.top_controls.as_mut() {
            let before = tc.content_top_offset();
            tc.scroll_end();
            if tc.is_animating() || tc.content_top_offset() != before {
                self.client.set_needs_animate();
            }
        }
        self.clear_currently_scrolling_layer();
        let now = self.current_frame_time;
        let mut fading = false;
        for layer in self.active_tree.layers.values_mut() {
            if let Some(fade) = layer.scrollbar_fade.as_mut() {
                fade.did_scroll_gesture_end(now);
                fading |= fade.is_animating();
            }
        }
        if fading {
            self.client.set_needs_animate();
        }
    }

    pub(crate) fn clear_currently_scrolling_layer(&mut self) {
        self.active_tree.clear_currently_scrolling_layer();
        self.gesture.did_lock_scrolling_layer = false;
        self.gesture.scroll_affects_scroll_handler = false;
        self.gesture.accumulated_root_overscroll = Vec2::ZERO;
    }

    /// Whether a gesture of type `input` starting at `viewport_point` would land
    /// on the layer that is scrolling now.
    pub fn is_currently_scrolling_layer_at(
        &mut self,
        viewport_point: Point,
        input: ScrollInputType,
    ) -> bool {
        let Some(current) = self.active_tree.currently_scrolling_layer_id() else {
            return false;
        };
        let device_point = self.device_point(viewport_point);
        let hit = self.active_tree.find_layer_that_is_hit_by_point(device_point);
        match self.find_scroll_layer_for_device_point(device_point, input, hit).0 {
            ScrollTarget::Layer(Some(layer)) => layer == current,
            _ => false,
        }
    }

    /// Whether a touch at `viewport_point` lands in a touch handler region.
    pub fn have_touch_event_handlers_at(&mut self, viewport_point: Point) -> bool {
        let device_point = self.device_point(viewport_point);
        self.active_tree
            .find_layer_that_is_hit_by_point_in_touch_handler_region(device_point)
            .is_some()
    }

    // ---------------------------------------------------------------------
    // Pinch
    // ---------------------------------------------------------------------

    /// Start a pinch. Cancels any page-scale animation.
    pub fn pinch_gesture_begin(&mut self) {
        self.page_scale_animation = None;
        self.gesture.pinch_gesture_active = true;
        self.gesture.previous_pinch_anchor = None;
        self.gesture.pinch_gesture_end_should_clear_scrolling_layer =
            self.active_tree.currently_scrolling_layer_id().is_none();
        let viewport = self
            .active_tree
            .outer_viewport_scroll_layer_id()
            .or_else(|| self.active_tree.inner_viewport_scroll_layer_id());
        self.active_tree.set_currently_scrolling_layer(viewport);
        if let Some(tc) = self.top_controls.as_mut() {
            tc.pinch_begin();
            if tc.is_animating() {
                self.client.set_needs_animate();
            }
        }
    }

    /// Multiply the page scale by `magnify_delta`, keeping the content under
    /// `anchor` (viewport DIPs) in place. A moving anchor also pans.
    ///
    /// Zero, negative and non-finite factors are ignored.
    #[tracing::instrument(skip(self))]
    pub fn pinch_gesture_update(&mut self, magnify_delta: f64, anchor: Point) {
        if !(magnify_delta > 0.0 && magnify_delta.is_finite()) {
            tracing::debug!(magnify_delta, "ignoring degenerate pinch factor");
            return;
        }
        let Some(inner) = self.active_tree.inner_viewport_scroll_layer_id() else {
            return;
        };
        let tree = &mut self.active_tree;
        let previous_anchor = self.gesture.previous_pinch_anchor.unwrap_or(anchor);

        let old_delta = tree.page_scale_delta();
        let previous_scale_anchor = previous_anchor.to_vec2() / old_delta;
        tree.set_page_scale_delta(old_delta * magnify_delta);
        let new_delta = tree.page_scale_delta();
        let new_scale_anchor = anchor.to_vec2() / new_delta;
        self.gesture.previous_pinch_anchor = Some(anchor);

        let mut movement = (previous_scale_anchor - new_scale_anchor) / tree.page_scale_factor();
        movement -= tree.clamp_scroll_to_max_scroll_offset(inner);

        // Bubbling stays within the viewport pair and skips the top controls.
        let unused = match tree.outer_viewport_scroll_layer_id() {
            Some(outer) => movement - tree.scroll_by(outer, movement),
            None => movement,
        };
        if unused != Vec2::ZERO {
            tree.scroll_by(inner, unused);
            tree.clamp_scroll_to_max_scroll_offset(inner);
        }

        let total = tree.page_scale_delta() / tree.sent_page_scale_delta();
        if let Some(pending) = self.pending_tree.as_mut() {
            pending.set_page_scale_delta(total);
        }
        self.update_inner_viewport_container_size();
        self.client.set_needs_commit();
        self.client.set_needs_redraw(None);
    }

    /// End the pinch.
    pub fn pinch_gesture_end(&mut self) {
        self.gesture.pinch_gesture_active = false;
        if self.gesture.pinch_gesture_end_should_clear_scrolling_layer {
            self.gesture.pinch_gesture_end_should_clear_scrolling_layer = false;
            self.clear_currently_scrolling_layer();
        }
        if let Some(tc) = self.top_controls.as_mut() {
            tc.pinch_end();
        }
        self.client.set_needs_commit();
    }

    /// Whether a pinch is in progress.
    pub fn pinch_gesture_active(&self) -> bool {
        self.gesture.pinch_gesture_active
    }

    /// Scroll the outer viewport, then the inner one with what is left. Returns
    /// the part neither could take.
    pub fn scroll_viewport_by(&mut self, delta: Vec2) -> Vec2 {
        let tree = &mut self.active_tree;
        let Some(inner) = tree.inner_viewport_scroll_layer_id() else {
            return delta;
        };
        let mut unused = delta;
        if let Some(outer) = tree.outer_viewport_scroll_layer_id() {
            unused -= tree.scroll_by(outer, unused);
        }
        if unused != Vec2::ZERO {
            unused -= tree.scroll_by(inner, unused);
        }
        unused
    }

    pub(crate) fn did_change_top_controls_position(&mut self) {
        self.update_inner_viewport_container_size();
        self.active_tree.set_needs_update_draw_properties();
        self.active_tree.damage.set_full_root_damage();
        self.client.set_needs_redraw(None);
        self.client.set_needs_animate();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/input.rs"]
mod tests;
