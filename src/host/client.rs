use std::time::Duration;

use crate::draw::quads::RenderPass;
use crate::foundation::core::{LayerId, Rect, Vec2};

/// Upcalls from the host to whoever schedules frames and commits.
///
/// Every method has a no-op default so embedders implement only what they
/// observe. Calls happen synchronously from inside host operations.
pub trait HostClient {
    /// [`crate::LayerTreeHost::can_draw`] changed (or may have changed) to `can_draw`.
    fn on_can_draw_state_changed(&mut self, _can_draw: bool) {}

    /// Request a redraw. `None` means the whole viewport.
    fn set_needs_redraw(&mut self, _damage: Option<Rect>) {}

    /// Request another `animate` tick.
    fn set_needs_animate(&mut self) {}

    /// Request a commit from the producer side.
    fn set_needs_commit(&mut self) {}

    /// The pending tree is ready to be activated.
    fn notify_ready_to_activate(&mut self) {}

    /// The pending tree just became active.
    fn did_activate_pending_tree(&mut self) {}

    /// Scroll input was not fully consumed.
    fn did_overscroll(&mut self, _accumulated: Vec2, _latest: Vec2) {}

    /// A gesture started on a layer whose producer listens for scroll events.
    fn scroll_affects_scroll_handler(&mut self, _affects: bool) {}

    /// Evict producer textures until usage fits `limit_bytes` and no retained
    /// texture is below `cutoff`. Returns true if anything was evicted.
    fn reduce_contents_texture_memory(&mut self, _limit_bytes: usize, _cutoff: PriorityCutoff) -> bool {
        false
    }
}

/// A client that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullClient;

impl HostClient for NullClient {}

/// What a renderer can do, queried once after its context initializes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RendererCapabilities {
    /// The output surface is redrawn and swapped completely every frame. Damage
    /// tracking and missing-content aborts are bypassed.
    pub draw_and_swap_full_viewport_every_frame: bool,
    /// Texture uploads may update part of a texture.
    pub allow_partial_texture_updates: bool,
    /// `swap_buffers` presents only the damaged region.
    pub using_partial_swap: bool,
    /// Missing tiles may be rasterized at draw time instead of checkerboarded.
    pub allow_rasterize_on_demand: bool,
}

/// Sink for finished frames.
pub trait Renderer {
    /// Bring up the drawing context. Returning false aborts host initialization.
    fn initialize_context(&mut self) -> bool {
        true
    }

    /// Capabilities of this renderer.
    fn capabilities(&self) -> RendererCapabilities;

    /// Draw the passes of one frame, root pass last.
    fn submit_frame(&mut self, passes: &[RenderPass], frame_time: Duration);

    /// Present the last submitted frame.
    fn swap_buffers(&mut self) -> bool {
        true
    }
}

/// Raster state of one tile as seen at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileStatus {
    /// High-resolution content is ready.
    Ready,
    /// Only a low-resolution stand-in is ready.
    LowResolution,
    /// Nothing has been rasterized.
    Missing,
}

/// Answers which tiles of a tiled layer have been rasterized.
pub trait TileCoverage {
    /// Status of the tile covering `tile_rect` (content space) on `layer`.
    fn tile_status(&self, layer: LayerId, tile_rect: Rect) -> TileStatus;
}

/// Minimum priority of producer textures that may stay resident.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PriorityCutoff {
    /// Keep nothing.
    AllowNothing,
    /// Keep only what is visible.
    AllowVisibleOnly,
    /// Keep visible content and what is close to it.
    AllowVisibleAndNearby,
    /// Keep everything.
    #[default]
    AllowEverything,
}

/// Memory budget handed down by the embedder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemoryPolicy {
    /// Budget while the host is visible.
    pub bytes_limit_when_visible: usize,
    /// Cutoff while the host is visible.
    pub priority_cutoff_when_visible: PriorityCutoff,
}

impl Default for MemoryPolicy {
    fn default() -> Self {
        Self {
            bytes_limit_when_visible: 64 * 1024 * 1024,
            priority_cutoff_when_visible: PriorityCutoff::AllowEverything,
        }
    }
}
