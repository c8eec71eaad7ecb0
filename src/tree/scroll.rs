use crate::foundation::core::{LayerId, Vec2};
use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::math::{clamp_vec, scale_components};
use crate::tree::layer_tree::LayerTree;

impl LayerTree {
    /// The layer's scroll clip, if it names an ancestor-or-self that exists.
    pub fn scroll_clip_layer_id(&self, id: LayerId) -> Option<LayerId> {
        let clip = self.layers.get(&id)?.props.scroll_clip_layer?;
        self.is_ancestor_or_self(clip, id).then_some(clip)
    }

    /// Next layer up the scroll chain: the scroll parent when set, else the tree
    /// parent.
    pub(crate) fn next_scroll_layer(&self, id: LayerId) -> Option<LayerId> {
        let layer = self.layers.get(&id)?;
        layer
            .props
            .scroll_parent
            .filter(|p| self.layers.contains_key(p))
            .or(layer.parent)
    }

    /// Largest total scroll offset the layer may reach, per axis. Zero when the
    /// clip does not resolve, and on axes the user may not scroll.
    pub fn max_scroll_offset(&self, id: LayerId) -> Vec2 {
        let Some(clip_id) = self.scroll_clip_layer_id(id) else {
            return Vec2::ZERO;
        };
        let (Some(layer), Some(clip)) = (self.layers.get(&id), self.layers.get(&clip_id)) else {
            return Vec2::ZERO;
        };

        let page_scale_layer = self.page_scale_layer_id();
        let page_scale = self.total_page_scale_factor();
        let mut scale = Vec2::new(1.0, 1.0);
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == clip_id {
                break;
            }
            let Some(l) = self.layers.get(&c) else {
                break;
            };
            scale = if Some(c) == page_scale_layer {
                accumulate_scale(scale, Vec2::new(page_scale, page_scale))
            } else {
                accumulate_scale(scale, scale_components(l.props.transform))
            };
            cur = l.parent;
        }
        // The page-scale layer may double as the clip.
        if Some(clip_id) == page_scale_layer {
            scale = accumulate_scale(scale, Vec2::new(page_scale, page_scale));
        }

        let bounds = layer.effective_bounds();
        let clip_bounds = clip.effective_bounds();
        let axis_max = |extent: f64, clip_extent: f64, s: f64| {
            (((extent * s).floor() - clip_extent) / s).max(0.0)
        };
        let mut max = Vec2::new(
            axis_max(bounds.width, clip_bounds.width, scale.x),
            axis_max(bounds.height, clip_bounds.height, scale.y),
        );
        if !layer.props.user_scrollable_horizontal {
            max.x = 0.0;
        }
        if !layer.props.user_scrollable_vertical {
            max.y = 0.0;
        }
        max
    }

    /// Whether the layer can scroll on at least one axis.
    pub fn is_scrollable(&self, id: LayerId) -> bool {
        let max = self.max_scroll_offset(id);
        max.x > 0.0 || max.y > 0.0
    }

    /// Committed offset plus impl-side delta, or zero for unknown layers.
    pub fn total_scroll_offset_of(&self, id: LayerId) -> Vec2 {
        self.layers
            .get(&id)
            .map(|l| l.total_scroll_offset())
            .unwrap_or(Vec2::ZERO)
    }

    /// Scroll the layer by `delta`, keeping the total offset within
    /// `[0, max_scroll_offset]` on each axis. Returns the delta actually applied,
    /// which never points against `delta` nor exceeds it. An axis already past
    /// its limit stays where it is until something scrolls it back in range.
    pub fn scroll_by(&mut self, id: LayerId, delta: Vec2) -> Vec2 {
        self.scroll_within_max(id, |current, max| {
            Vec2::new(
                axis_target(current.x, delta.x, max.x),
                axis_target(current.y, delta.y, max.y),
            )
        })
    }

    /// Pull the total offset back inside `[0, max_scroll_offset]`. Returns the
    /// change that was applied.
    pub fn clamp_scroll_to_max_scroll_offset(&mut self, id: LayerId) -> Vec2 {
        self.scroll_within_max(id, |current, max| clamp_vec(current, Vec2::ZERO, max))
    }

    /// Move the layer's total offset to whatever `resolve` returns for its
    /// current total and max offset. Returns the change.
    fn scroll_within_max(&mut self, id: LayerId, resolve: impl FnOnce(Vec2, Vec2) -> Vec2) -> Vec2 {
        if self.scroll_clip_layer_id(id).is_none() {
            return Vec2::ZERO;
        }
        let max = self.max_scroll_offset(id);
        let Some(layer) = self.layers.get_mut(&id) else {
            return Vec2::ZERO;
        };
        let current = layer.total_scroll_offset();
        let target = resolve(current, max);
        let applied = target - current;
        if applied != Vec2::ZERO {
            layer.scroll_delta = target - layer.props.scroll_offset;
            self.set_needs_update_draw_properties();
        }
        applied
    }

    /// Overwrite the impl-side scroll delta without clamping.
    pub fn set_scroll_delta(&mut self, id: LayerId, delta: Vec2) -> StrataResult<()> {
        let layer = self
            .layers
            .get_mut(&id)
            .ok_or_else(|| StrataError::structure(format!("unknown layer {id}")))?;
        if layer.scroll_delta != delta {
            layer.scroll_delta = delta;
            self.set_needs_update_draw_properties();
        }
        Ok(())
    }

    /// Overwrite the committed scroll offset without clamping.
    pub fn set_scroll_offset(&mut self, id: LayerId, offset: Vec2) -> StrataResult<()> {
        let layer = self
            .layers
            .get_mut(&id)
            .ok_or_else(|| StrataError::structure(format!("unknown layer {id}")))?;
        if layer.props.scroll_offset != offset {
            layer.props.scroll_offset = offset;
            self.set_needs_update_draw_properties();
        }
        Ok(())
    }

    /// Record how much of the layer's delta has been reported upstream.
    pub(crate) fn set_sent_scroll_delta(&mut self, id: LayerId, sent: Vec2) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.sent_scroll_delta = sent;
        }
    }

    /// How far the fixed-position container `id` has effectively resized this
    /// gesture: clip bounds changes plus the apparent change from pinch zoom, in
    /// layer space.
    pub fn fixed_container_size_delta(&self, id: LayerId) -> Vec2 {
        let Some(clip) = self
            .scroll_clip_layer_id(id)
            .and_then(|c| self.layers.get(&c))
        else {
            return Vec2::ZERO;
        };
        let scale = self.page_scale_factor();
        let scale_delta = self.page_scale_delta();
        let from_bounds = clip.bounds_delta() / scale;
        let bounds = clip.props.bounds;
        let from_pinch = Vec2::new(bounds.width, bounds.height) / scale * (1.0 / scale_delta - 1.0);
        from_bounds + from_pinch
    }
}

/// Multiply in the positive, finite components of `factor`. Flips and
/// degenerate axes leave the running scale alone.
fn accumulate_scale(scale: Vec2, factor: Vec2) -> Vec2 {
    let fold = |s: f64, f: f64| if f > 0.0 && f.is_finite() { s * f } else { s };
    Vec2::new(fold(scale.x, factor.x), fold(scale.y, factor.y))
}

/// One axis of [`LayerTree::scroll_by`]: `current + delta` clamped to
/// `[0, max]`, widened to take in `current` so the result always lies between
/// `current` and `current + delta`.
fn axis_target(current: f64, delta: f64, max: f64) -> f64 {
    (current + delta).max(current.min(0.0)).min(current.max(max))
}

#[cfg(test)]
#[path = "../../tests/unit/tree/scroll.rs"]
mod tests;
