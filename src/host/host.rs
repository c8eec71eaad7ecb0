use std::ops::{Deref, DerefMut};
use std::time::Duration;

use crate::animation::page_scale::PageScaleAnimation;
use crate::foundation::core::{Affine, Point, Rect, Size, Vec2};
use crate::foundation::error::StrataResult;
use crate::foundation::math::{rect_is_empty, size_is_empty, union_nonempty};
use crate::foundation::settings::LayerTreeSettings;
use crate::host::client::{HostClient, MemoryPolicy, Renderer, RendererCapabilities, TileCoverage};
use crate::host::top_controls::TopControlsManager;
use crate::tree::layer_tree::{DrawViewport, LayerTree};

/// State of the scroll or pinch gesture in progress.
#[derive(Clone, Debug, Default)]
pub(crate) struct GestureState {
    pub(crate) did_lock_scrolling_layer: bool,
    pub(crate) should_bubble_scrolls: bool,
    pub(crate) wheel_scrolling: bool,
    pub(crate) scroll_affects_scroll_handler: bool,
    pub(crate) accumulated_root_overscroll: Vec2,
    pub(crate) pinch_gesture_active: bool,
    pub(crate) pinch_gesture_end_should_clear_scrolling_layer: bool,
    pub(crate) previous_pinch_anchor: Option<Point>,
}

/// Owns the active tree (and a pending tree while a commit is in flight) and
/// turns input, animation ticks and draw requests into tree updates and frames.
///
/// Everything runs synchronously on the caller's thread. Notifications go to
/// the [`HostClient`] `C`.
pub struct LayerTreeHost<C: HostClient> {
    pub(crate) settings: LayerTreeSettings,
    pub(crate) client: C,
    pub(crate) renderer: Option<Box<dyn Renderer>>,
    pub(crate) capabilities: RendererCapabilities,
    pub(crate) tile_coverage: Option<Box<dyn TileCoverage>>,

    pub(crate) active_tree: LayerTree,
    pub(crate) pending_tree: Option<LayerTree>,

    pub(crate) device_viewport_size: Size,
    pub(crate) device_scale_factor: f64,
    pub(crate) external_transform: Affine,
    pub(crate) external_viewport: Option<Rect>,
    pub(crate) viewport_damage_rect: Rect,

    pub(crate) visible: bool,
    pub(crate) memory_policy: MemoryPolicy,
    pub(crate) max_memory_needed_bytes: usize,

    pub(crate) gesture: GestureState,
    pub(crate) top_controls: Option<TopControlsManager>,
    pub(crate) page_scale_animation: Option<PageScaleAnimation>,
    pub(crate) current_frame_time: Duration,
}

impl<C: HostClient> LayerTreeHost<C> {
    /// A visible host with an empty active tree and no renderer.
    pub fn new(settings: LayerTreeSettings, client: C) -> StrataResult<Self> {
        settings.validate()?;
        let top_controls = (settings.top_controls_height > 0.0).then(|| {
            TopControlsManager::new(
                settings.top_controls_height,
                Duration::from_millis(settings.top_controls_animation_ms),
            )
        });
        Ok(Self {
            active_tree: LayerTree::new(settings.clone()),
            settings,
            client,
            renderer: None,
            capabilities: RendererCapabilities::default(),
            tile_coverage: None,
            pending_tree: None,
            device_viewport_size: Size::ZERO,
            device_scale_factor: 1.0,
            external_transform: Affine::IDENTITY,
            external_viewport: None,
            viewport_damage_rect: Rect::ZERO,
            visible: true,
            memory_policy: MemoryPolicy::default(),
            max_memory_needed_bytes: 0,
            gesture: GestureState::default(),
            top_controls,
            page_scale_animation: None,
            current_frame_time: Duration::ZERO,
        })
    }

    /// Host settings.
    pub fn settings(&self) -> &LayerTreeSettings {
        &self.settings
    }

    /// The notification sink.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Mutable access to the notification sink.
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// The tree being drawn and scrolled.
    pub fn active_tree(&self) -> &LayerTree {
        &self.active_tree
    }

    /// Mutable access to the active tree. Drawability is re-evaluated, and the
    /// client told, when the guard is dropped.
    pub fn active_tree_mut(&mut self) -> TreeGuard<'_, C> {
        TreeGuard { host: self }
    }

    /// The tree being prepared for activation, if any.
    pub fn pending_tree(&self) -> Option<&LayerTree> {
        self.pending_tree.as_ref()
    }

    /// Mutable access to the pending tree.
    pub fn pending_tree_mut(&mut self) -> Option<&mut LayerTree> {
        self.pending_tree.as_mut()
    }

    /// Top-controls state, when the bar is enabled.
    pub fn top_controls(&self) -> Option<&TopControlsManager> {
        self.top_controls.as_ref()
    }

    /// Page-scale animation in flight, if any.
    pub fn page_scale_animation(&self) -> Option<&PageScaleAnimation> {
        self.page_scale_animation.as_ref()
    }

    // ---------------------------------------------------------------------
    // Renderer and viewport
    // ---------------------------------------------------------------------

    /// Bind a renderer. On failure the host keeps working for input but cannot
    /// draw.
    #[tracing::instrument(skip(self, renderer))]
    pub fn initialize_renderer(&mut self, mut renderer: Box<dyn Renderer>) -> bool {
        self.release_renderer_resources();
        if !renderer.initialize_context() {
            tracing::debug!("renderer context creation failed");
            self.notify_can_draw_state_changed();
            return false;
        }
        self.capabilities = renderer.capabilities();
        self.renderer = Some(renderer);
        self.active_tree.damage.set_full_root_damage();
        self.notify_can_draw_state_changed();
        self.client.set_needs_redraw(None);
        true
    }

    /// The output surface was lost. Drawing stops until a new renderer is bound.
    pub fn did_lose_output_surface(&mut self) {
        tracing::debug!("output surface lost");
        self.release_renderer_resources();
        self.notify_can_draw_state_changed();
    }

    fn release_renderer_resources(&mut self) {
        if self.renderer.take().is_some() {
            self.active_tree.release_resources();
            if let Some(pending) = self.pending_tree.as_mut() {
                pending.release_resources();
            }
        }
        self.capabilities = RendererCapabilities::default();
    }

    /// Capabilities of the bound renderer (all false without one).
    pub fn renderer_capabilities(&self) -> RendererCapabilities {
        self.capabilities
    }

    /// Install (or remove) the tile raster-state oracle consulted while drawing.
    pub fn set_tile_coverage(&mut self, coverage: Option<Box<dyn TileCoverage>>) {
        self.tile_coverage = coverage;
        self.client.set_needs_redraw(None);
    }

    /// Device viewport size in physical pixels.
    pub fn device_viewport_size(&self) -> Size {
        self.device_viewport_size
    }

    /// Resize the device viewport.
    pub fn set_viewport_size(&mut self, device_size: Size) {
        if device_size == self.device_viewport_size {
            return;
        }
        self.device_viewport_size = device_size;
        if self.pending_tree.is_some() {
            self.active_tree.set_viewport_size_invalid();
        }
        self.sync_draw_viewport();
        self.update_inner_viewport_container_size();
        self.active_tree.damage.set_full_root_damage();
        self.notify_can_draw_state_changed();
        self.client.set_needs_redraw(None);
        self.client.set_needs_commit();
    }

    /// Device pixels per DIP.
    pub fn device_scale_factor(&self) -> f64 {
        self.device_scale_factor
    }

    /// Change device pixels per DIP.
    pub fn set_device_scale_factor(&mut self, factor: f64) {
        if factor == self.device_scale_factor || !(factor > 0.0) {
            return;
        }
        self.device_scale_factor = factor;
        self.active_tree.set_device_scale_factor(factor);
        if let Some(pending) = self.pending_tree.as_mut() {
            pending.set_device_scale_factor(factor);
        }
        self.update_inner_viewport_container_size();
        self.active_tree.damage.set_full_root_damage();
        self.client.set_needs_redraw(None);
    }

    /// Draw through `transform` into `viewport` (device space) instead of the
    /// plain device viewport. Passing `None` for the viewport clears it.
    pub fn set_external_draw_constraints(&mut self, transform: Affine, viewport: Option<Rect>) {
        self.external_transform = transform;
        self.external_viewport = viewport;
        self.sync_draw_viewport();
        self.active_tree.damage.set_full_root_damage();
        self.notify_can_draw_state_changed();
        self.client.set_needs_redraw(None);
    }

    /// Add to the area redrawn by the next frame, in device space.
    pub fn set_viewport_damage(&mut self, damage: Rect) {
        self.viewport_damage_rect = union_nonempty(self.viewport_damage_rect, damage);
        self.client.set_needs_redraw(Some(damage));
    }

    pub(crate) fn draw_viewport(&self) -> DrawViewport {
        DrawViewport {
            device_size: self.device_viewport_size,
            external_transform: self.external_transform,
            external_viewport: self.external_viewport,
        }
    }

    pub(crate) fn sync_draw_viewport(&mut self) {
        let viewport = self.draw_viewport();
        for tree in std::iter::once(&mut self.active_tree).chain(self.pending_tree.as_mut()) {
            if tree.viewport != viewport {
                tree.viewport = viewport;
                tree.set_needs_update_draw_properties();
            }
        }
    }

    /// Viewport in DIPs: device size over device scale.
    pub fn unscaled_viewport_size(&self) -> Size {
        self.device_viewport_size / self.device_scale_factor
    }

    /// Resize the inner viewport container to the DIP viewport minus the visible
    /// part of the top controls. Containers that mask to bounds keep their size.
    pub(crate) fn update_inner_viewport_container_size(&mut self) {
        let top = self
            .top_controls
            .as_ref()
            .map_or(0.0, TopControlsManager::content_top_offset);
        let viewport = self.unscaled_viewport_size();
        let Some(container_id) = self.active_tree.inner_viewport_container_layer_id() else {
            return;
        };
        let Some(container) = self.active_tree.layers.get_mut(&container_id) else {
            return;
        };
        if container.props.masks_to_bounds {
            return;
        }
        let bounds = container.props.bounds;
        let delta = Vec2::new(
            viewport.width - bounds.width,
            viewport.height - top - bounds.height,
        );
        if container.bounds_delta != delta {
            container.bounds_delta = delta;
            self.active_tree.set_needs_update_draw_properties();
        }
    }

    // ---------------------------------------------------------------------
    // Drawability
    // ---------------------------------------------------------------------

    /// Whether a frame could be drawn right now.
    pub fn can_draw(&self) -> bool {
        if self.renderer.is_none() {
            tracing::trace!("cannot draw: no renderer");
            return false;
        }
        if self.active_tree.root_layer_id().is_none() {
            tracing::trace!("cannot draw: no root layer");
            return false;
        }
        if self.capabilities.draw_and_swap_full_viewport_every_frame {
            return true;
        }
        if size_is_empty(self.device_viewport_size)
            || self.external_viewport.is_some_and(rect_is_empty)
        {
            tracing::trace!("cannot draw: empty viewport");
            return false;
        }
        if self.active_tree.viewport_size_invalid() {
            tracing::trace!("cannot draw: viewport size invalid");
            return false;
        }
        if self.active_tree.contents_textures_purged() {
            tracing::trace!("cannot draw: contents textures purged");
            return false;
        }
        true
    }

    pub(crate) fn notify_can_draw_state_changed(&mut self) {
        self.active_tree.can_draw_dirty = false;
        let can_draw = self.can_draw();
        self.client.on_can_draw_state_changed(can_draw);
    }

    /// Fold the active tree's structural changes into host state.
    pub(crate) fn did_modify_active_tree(&mut self) {
        self.sync_draw_viewport();
        if self.active_tree.can_draw_dirty {
            self.notify_can_draw_state_changed();
        }
    }
}

/// Mutable borrow of the active tree handed out by
/// [`LayerTreeHost::active_tree_mut`].
pub struct TreeGuard<'a, C: HostClient> {
    host: &'a mut LayerTreeHost<C>,
}

impl<C: HostClient> Deref for TreeGuard<'_, C> {
    type Target = LayerTree;

    fn deref(&self) -> &LayerTree {
        &self.host.active_tree
    }
}

impl<C: HostClient> DerefMut for TreeGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut LayerTree {
        &mut self.host.active_tree
    }
}

impl<C: HostClient> Drop for TreeGuard<'_, C> {
    fn drop(&mut self) {
        self.host.did_modify_active_tree();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/host.rs"]
mod tests;
