use crate::animation::scrollbar::ScrollbarFadeController;
use crate::draw::surface::RenderSurface;
use crate::foundation::core::{Affine, Color, LayerId, Point, Rect, Size, Vec2};
use crate::foundation::math::Region;
use crate::layer::content::LayerContent;
use smallvec::SmallVec;

/// How a fixed-position layer tracks its nearest fixed-position container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PositionConstraint {
    /// The layer stays put while the container scrolls.
    pub is_fixed_position: bool,
    /// Anchor to the container's right edge instead of its left edge.
    pub is_fixed_to_right_edge: bool,
    /// Anchor to the container's bottom edge instead of its top edge.
    pub is_fixed_to_bottom_edge: bool,
}

/// Producer-owned layer properties.
///
/// This is the part of a layer that a commit replaces wholesale. Impl-side state
/// (scroll deltas, temporary bounds, draw properties) lives on [`Layer`] itself.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerProps {
    /// Offset of the layer's origin in its parent's space.
    pub position: Point,
    /// Layer size in layer space.
    pub bounds: Size,
    /// Local transform, applied about `transform_origin`.
    pub transform: Affine,
    /// Pivot for `transform`, in layer space.
    pub transform_origin: Point,
    /// Recorded for parity with producers that emit 3D hierarchies. Transforms are
    /// 2D here, so they are always flat.
    pub should_flatten_transform: bool,

    /// The layer emits quads of its own.
    pub draws_content: bool,
    /// Every pixel the layer draws is opaque.
    pub contents_opaque: bool,
    /// Draw the layer even when its back face points at the viewer.
    pub double_sided: bool,
    /// Clip descendants to this layer's bounds.
    pub masks_to_bounds: bool,
    /// Always give this layer its own render surface.
    pub force_render_surface: bool,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f64,
    /// Fixed rasterization scale, bypassing the computed one.
    pub contents_scale_override: Option<f64>,
    /// Background color, used by checkerboard quads.
    pub background_color: Color,

    /// Committed scroll offset.
    pub scroll_offset: Vec2,
    /// Layer whose bounds form this layer's scroll viewport.
    pub scroll_clip_layer: Option<LayerId>,
    /// Layer this one scrolls with when it is not a tree descendant of it.
    pub scroll_parent: Option<LayerId>,
    /// Users may scroll this layer horizontally.
    pub user_scrollable_horizontal: bool,
    /// Users may scroll this layer vertically.
    pub user_scrollable_vertical: bool,

    /// Any scroll reaching this layer must be handled by the producer.
    pub should_scroll_on_main_thread: bool,
    /// Layer-space areas where scrolls must be handled by the producer.
    pub non_fast_scrollable_region: Region,
    /// The producer listens for wheel events on this layer.
    pub have_wheel_event_handlers: bool,
    /// The producer listens for scroll events on this layer.
    pub have_scroll_event_handlers: bool,
    /// Layer-space areas with touch listeners.
    pub touch_event_handler_region: Region,

    /// Fixed-position descendants are positioned relative to this layer.
    pub is_container_for_fixed_position_layers: bool,
    /// Fixed-position behavior of this layer.
    pub position_constraint: PositionConstraint,

    /// A transform animation is running on this layer.
    pub transform_is_animating: bool,
    /// An opacity animation is running on this layer.
    pub opacity_is_animating: bool,

    /// Layer-space area repainted since the last draw.
    pub update_rect: Rect,
    /// What the layer draws.
    pub content: LayerContent,
}

impl Default for LayerProps {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            bounds: Size::ZERO,
            transform: Affine::IDENTITY,
            transform_origin: Point::ZERO,
            should_flatten_transform: true,
            draws_content: false,
            contents_opaque: false,
            double_sided: true,
            masks_to_bounds: false,
            force_render_surface: false,
            opacity: 1.0,
            contents_scale_override: None,
            background_color: Color::TRANSPARENT,
            scroll_offset: Vec2::ZERO,
            scroll_clip_layer: None,
            scroll_parent: None,
            user_scrollable_horizontal: true,
            user_scrollable_vertical: true,
            should_scroll_on_main_thread: false,
            non_fast_scrollable_region: Region::new(),
            have_wheel_event_handlers: false,
            have_scroll_event_handlers: false,
            touch_event_handler_region: Region::new(),
            is_container_for_fixed_position_layers: false,
            position_constraint: PositionConstraint::default(),
            transform_is_animating: false,
            opacity_is_animating: false,
            update_rect: Rect::ZERO,
            content: LayerContent::Empty,
        }
    }
}

/// Per-frame derived state, rebuilt by every property pass.
#[derive(Clone, Debug)]
pub struct DrawProperties {
    /// Content space to render-target space.
    pub target_space_transform: Affine,
    /// Content space to screen (device pixel) space.
    pub screen_space_transform: Affine,
    /// Some transform between this layer and its target is animating.
    pub target_space_transform_is_animating: bool,
    /// Some transform between this layer and the screen is animating.
    pub screen_space_transform_is_animating: bool,
    /// Opacity to draw with, relative to the render target.
    pub opacity: f64,
    /// Rasterization scale from layer space to content space.
    pub contents_scale: f64,
    /// `bounds` scaled by `contents_scale`, rounded up.
    pub content_bounds: Size,
    /// Whether `clip_rect` applies.
    pub is_clipped: bool,
    /// Clip in target space.
    pub clip_rect: Rect,
    /// Clipped footprint in target space.
    pub drawable_content_rect: Rect,
    /// Visible part of the layer, in content space.
    pub visible_content_rect: Rect,
    /// Owner of the render surface this layer draws into.
    pub render_target: Option<LayerId>,
    /// Surface owned by this layer, if it got one.
    pub render_surface: Option<RenderSurface>,
    /// The layer takes part in the render-surface layer list this frame, either
    /// by drawing into its target or by owning a contributing surface.
    pub is_drawn_member: bool,
    /// The layer is scrollable and scrolls itself or a scroll child that is drawn.
    pub scrolls_drawn_descendant: bool,
    /// Accumulated ancestor clip in screen space, used by hit testing.
    pub(crate) screen_clip: Option<Rect>,
}

impl Default for DrawProperties {
    fn default() -> Self {
        Self {
            target_space_transform: Affine::IDENTITY,
            screen_space_transform: Affine::IDENTITY,
            target_space_transform_is_animating: false,
            screen_space_transform_is_animating: false,
            opacity: 1.0,
            contents_scale: 1.0,
            content_bounds: Size::ZERO,
            is_clipped: false,
            clip_rect: Rect::ZERO,
            drawable_content_rect: Rect::ZERO,
            visible_content_rect: Rect::ZERO,
            render_target: None,
            render_surface: None,
            is_drawn_member: false,
            scrolls_drawn_descendant: false,
            screen_clip: None,
        }
    }
}

/// Counters for the draw lifecycle hooks invoked on a layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerDrawStats {
    /// `will_draw` calls that returned true.
    pub will_draw: u32,
    /// Frames in which the layer appended quads.
    pub append_quads: u32,
    /// `did_draw` calls.
    pub did_draw: u32,
}

/// A node of a [`crate::LayerTree`].
///
/// Hierarchy links are ids into the owning tree; the tree is the only thing that
/// edits them. Everything in [`Layer::props`] is free to mutate through
/// [`crate::LayerTree::layer_mut`].
#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerId,
    pub(crate) parent: Option<LayerId>,
    pub(crate) children: SmallVec<[LayerId; 4]>,
    pub(crate) mask_layer: Option<LayerId>,
    pub(crate) replica_layer: Option<LayerId>,
    /// Set on mask and replica layers: the layer that owns them.
    pub(crate) owner: Option<LayerId>,

    /// Producer-owned properties.
    pub props: LayerProps,

    pub(crate) scroll_delta: Vec2,
    pub(crate) sent_scroll_delta: Vec2,
    pub(crate) bounds_delta: Vec2,
    pub(crate) scrollbar_fade: Option<ScrollbarFadeController>,
    pub(crate) draw: DrawProperties,
    pub(crate) stats: LayerDrawStats,
    pub(crate) drawing: bool,
}

impl Layer {
    /// A detached layer with default properties.
    pub fn new(id: LayerId) -> Self {
        Self::with_props(id, LayerProps::default())
    }

    /// A detached layer with the given properties.
    pub fn with_props(id: LayerId, props: LayerProps) -> Self {
        Self {
            id,
            parent: None,
            children: SmallVec::new(),
            mask_layer: None,
            replica_layer: None,
            owner: None,
            props,
            scroll_delta: Vec2::ZERO,
            sent_scroll_delta: Vec2::ZERO,
            bounds_delta: Vec2::ZERO,
            scrollbar_fade: None,
            draw: DrawProperties::default(),
            stats: LayerDrawStats::default(),
            drawing: false,
        }
    }

    /// Layer id.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Tree parent. Mask and replica layers have none.
    pub fn parent(&self) -> Option<LayerId> {
        self.parent
    }

    /// Children in paint order (later children draw on top).
    pub fn children(&self) -> &[LayerId] {
        &self.children
    }

    /// Mask layer owned by this layer.
    pub fn mask_layer(&self) -> Option<LayerId> {
        self.mask_layer
    }

    /// Replica (reflection) layer owned by this layer.
    pub fn replica_layer(&self) -> Option<LayerId> {
        self.replica_layer
    }

    /// Impl-side scroll accumulated since the last commit.
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    /// Part of `scroll_delta` already reported to the producer.
    pub fn sent_scroll_delta(&self) -> Vec2 {
        self.sent_scroll_delta
    }

    /// Committed offset plus impl-side delta.
    pub fn total_scroll_offset(&self) -> Vec2 {
        self.props.scroll_offset + self.scroll_delta
    }

    /// Impl-side adjustment of `bounds`, used for viewport container resizing.
    pub fn bounds_delta(&self) -> Vec2 {
        self.bounds_delta
    }

    /// `bounds` with the impl-side adjustment applied.
    pub fn effective_bounds(&self) -> Size {
        Size::new(
            (self.props.bounds.width + self.bounds_delta.x).max(0.0),
            (self.props.bounds.height + self.bounds_delta.y).max(0.0),
        )
    }

    /// Derived per-frame state from the last property pass.
    pub fn draw_properties(&self) -> &DrawProperties {
        &self.draw
    }

    /// Draw lifecycle counters.
    pub fn draw_stats(&self) -> LayerDrawStats {
        self.stats
    }

    /// Scrollbar fade controller bound to this scroll layer, if any.
    pub fn scrollbar_fade(&self) -> Option<&ScrollbarFadeController> {
        self.scrollbar_fade.as_ref()
    }

    /// Whether the layer owns a render surface this frame.
    pub fn has_render_surface(&self) -> bool {
        self.draw.render_surface.is_some()
    }

    pub(crate) fn will_draw(&mut self) -> bool {
        if !self.props.content.will_draw() {
            return false;
        }
        self.drawing = true;
        self.stats.will_draw += 1;
        true
    }

    pub(crate) fn did_draw(&mut self) {
        if !self.drawing {
            return;
        }
        self.drawing = false;
        self.props.content.did_draw();
        self.stats.did_draw += 1;
    }

    pub(crate) fn release_resources(&mut self) {
        self.props.content.release_resources();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/layer.rs"]
mod tests;
