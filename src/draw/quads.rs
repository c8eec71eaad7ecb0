use crate::foundation::core::{Affine, Color, LayerId, Rect};
use crate::layer::content::ScrollbarOrientation;

/// Identifies a render pass: the surface-owning layer plus an index for owners
/// that produce more than one pass.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RenderPassId {
    /// Owner of the render surface.
    pub layer: LayerId,
    /// Pass index within the owner.
    pub index: u32,
}

/// Tile resolution a tile quad was drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TileResolution {
    /// Full-resolution content.
    High,
    /// Stand-in content rasterized at a lower scale.
    Low,
}

/// What a quad draws.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuadMaterial {
    /// Flat color.
    SolidColor {
        /// Fill color.
        color: Color,
    },
    /// Rasterized tile content.
    Tile {
        /// Resolution of the backing tile.
        resolution: TileResolution,
    },
    /// Placeholder for a tile that has not been rasterized.
    Checkerboard {
        /// Placeholder color.
        color: Color,
    },
    /// Scrollbar track.
    ScrollbarTrack {
        /// Track orientation.
        orientation: ScrollbarOrientation,
    },
    /// Scrollbar thumb.
    ScrollbarThumb {
        /// Thumb orientation.
        orientation: ScrollbarOrientation,
    },
    /// Output of another render pass.
    RenderPass {
        /// Pass being composited.
        pass: RenderPassId,
        /// This quad draws the surface's replica rather than the surface itself.
        is_replica: bool,
        /// The surface (or replica) is masked.
        has_mask: bool,
    },
}

/// State shared by all quads a layer emits in one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SharedQuadState {
    /// Content space to target space.
    pub content_to_target: Affine,
    /// Visible part of the layer in content space.
    pub visible_content_rect: Rect,
    /// Target-space clip, if any.
    pub clip_rect: Option<Rect>,
    /// Opacity relative to the target.
    pub opacity: f64,
}

/// A drawable primitive.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DrawQuad {
    /// Layer that produced the quad. Background fill quads have none.
    pub layer: Option<LayerId>,
    /// Quad geometry in content space.
    pub rect: Rect,
    /// Sub-rectangle of `rect` that is not occluded.
    pub visible_rect: Rect,
    /// Pixels underneath show through and must be blended.
    pub needs_blending: bool,
    /// Shared transform, clip and opacity.
    pub shared: SharedQuadState,
    /// What is drawn.
    pub material: QuadMaterial,
}

impl DrawQuad {
    /// `rect` mapped into target space.
    pub fn target_rect(&self) -> Rect {
        crate::foundation::math::map_rect(self.shared.content_to_target, self.visible_rect)
    }
}

/// One offscreen or onscreen pass: quads drawn into one render surface.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderPass {
    /// Pass id.
    pub id: RenderPassId,
    /// Pass extent in its own space.
    pub output_rect: Rect,
    /// Area that changed since the previous frame, in the pass's own space.
    pub damage_rect: Rect,
    /// Pass space to root target space.
    pub transform_to_root_target: Affine,
    /// The pass leaves uncovered pixels transparent.
    pub has_transparent_background: bool,
    /// Quads ordered front to back.
    pub quads: Vec<DrawQuad>,
}

/// Tile accounting collected while layers append quads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppendQuadsData {
    /// Tiles drawn as checkerboard because no content existed.
    pub num_missing_tiles: u32,
    /// Tiles drawn from low-resolution stand-ins.
    pub num_incomplete_tiles: u32,
}

