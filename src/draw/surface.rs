use crate::foundation::core::{Affine, LayerId, Rect};

/// An offscreen target that a subtree is drawn into before being composited
/// into its parent target as a single quad.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSurface {
    /// Layer that owns the surface.
    pub owner: LayerId,
    /// Union of contributor footprints, in surface space.
    pub content_rect: Rect,
    /// Surface space to parent target space.
    pub draw_transform: Affine,
    /// Surface space to screen space.
    pub screen_space_transform: Affine,
    /// Replica placement in parent target space, if the owner has a replica.
    pub replica_draw_transform: Option<Affine>,
    /// Opacity applied when compositing the surface.
    pub draw_opacity: f64,
    /// Some transform from surface space to the parent target is animating.
    pub target_transform_is_animating: bool,
    /// Whether `clip_rect` applies.
    pub is_clipped: bool,
    /// Clip in parent target space.
    pub clip_rect: Rect,
    /// Footprint of the surface (and replica) in parent target space.
    pub drawable_content_rect: Rect,
    /// Layers drawing into this surface, in paint order. Child surfaces appear
    /// as their owner.
    pub layer_list: Vec<LayerId>,
    /// Area that changed since the previous frame, in surface space.
    pub damage_rect: Rect,
}

impl RenderSurface {
    pub(crate) fn new(owner: LayerId) -> Self {
        Self {
            owner,
            content_rect: Rect::ZERO,
            draw_transform: Affine::IDENTITY,
            screen_space_transform: Affine::IDENTITY,
            replica_draw_transform: None,
            draw_opacity: 1.0,
            target_transform_is_animating: false,
            is_clipped: false,
            clip_rect: Rect::ZERO,
            drawable_content_rect: Rect::ZERO,
            layer_list: Vec::new(),
            damage_rect: Rect::ZERO,
        }
    }
}
