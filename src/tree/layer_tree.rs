use std::collections::HashMap;

use crate::draw::damage::DamageTrackers;
use crate::foundation::core::{Affine, Color, LayerId, Rect, Size, Vec2};
use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::math::rect_from_size;
use crate::foundation::settings::LayerTreeSettings;
use crate::layer::layer::Layer;

/// Viewport geometry pushed down from the host before each property pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DrawViewport {
    pub(crate) device_size: Size,
    pub(crate) external_transform: Affine,
    pub(crate) external_viewport: Option<Rect>,
}

impl Default for DrawViewport {
    fn default() -> Self {
        Self {
            device_size: Size::ZERO,
            external_transform: Affine::IDENTITY,
            external_viewport: None,
        }
    }
}

/// One scene graph plus the per-tree state a host needs to draw and scroll it.
///
/// Layers live in an id-keyed arena. Parent links and child lists are ids, and
/// every layer in the arena is reachable from the root through child, mask or
/// replica links. Viewport roles are stored as ids and resolved on demand, so
/// they survive whole-tree replacement.
#[derive(Debug)]
pub struct LayerTree {
    pub(crate) layers: HashMap<LayerId, Layer>,
    root: Option<LayerId>,
    pub(crate) settings: LayerTreeSettings,

    page_scale_layer: Option<LayerId>,
    inner_viewport_scroll_layer: Option<LayerId>,
    outer_viewport_scroll_layer: Option<LayerId>,
    currently_scrolling_layer: Option<LayerId>,

    page_scale_factor: f64,
    page_scale_delta: f64,
    sent_page_scale_delta: f64,
    min_page_scale_factor: f64,
    max_page_scale_factor: f64,
    device_scale_factor: f64,
    pub(crate) viewport: DrawViewport,

    background_color: Color,
    has_transparent_background: bool,

    needs_update_draw_properties: bool,
    requires_high_res_to_draw: bool,
    viewport_size_invalid: bool,
    contents_textures_purged: bool,
    pub(crate) can_draw_dirty: bool,

    pub(crate) render_surface_layer_list: Vec<LayerId>,
    pub(crate) damage: DamageTrackers,
}

impl LayerTree {
    /// Empty tree.
    pub fn new(settings: LayerTreeSettings) -> Self {
        Self {
            layers: HashMap::new(),
            root: None,
            settings,
            page_scale_layer: None,
            inner_viewport_scroll_layer: None,
            outer_viewport_scroll_layer: None,
            currently_scrolling_layer: None,
            page_scale_factor: 1.0,
            page_scale_delta: 1.0,
            sent_page_scale_delta: 1.0,
            min_page_scale_factor: 0.0,
            max_page_scale_factor: 0.0,
            device_scale_factor: 1.0,
            viewport: DrawViewport::default(),
            background_color: Color::WHITE,
            has_transparent_background: false,
            needs_update_draw_properties: true,
            requires_high_res_to_draw: false,
            viewport_size_invalid: false,
            contents_textures_purged: false,
            can_draw_dirty: false,
            render_surface_layer_list: Vec::new(),
            damage: DamageTrackers::default(),
        }
    }

    /// Settings the tree was created with.
    pub fn settings(&self) -> &LayerTreeSettings {
        &self.settings
    }

    // ---------------------------------------------------------------------
    // Structure
    // ---------------------------------------------------------------------

    /// Root layer id, if any.
    pub fn root_layer_id(&self) -> Option<LayerId> {
        self.root
    }

    /// Root layer, if any.
    pub fn root_layer(&self) -> Option<&Layer> {
        self.root.and_then(|id| self.layers.get(&id))
    }

    /// Number of layers, including masks and replicas.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Whether the tree holds a layer with this id.
    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Layer by id.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Mutable layer by id. Marks draw properties stale, since callers reach for
    /// this to change geometry.
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        let layer = self.layers.get_mut(&id)?;
        self.needs_update_draw_properties = true;
        Some(layer)
    }

    /// Replace the root. The previous root subtree is destroyed.
    pub fn set_root_layer(&mut self, root: Layer) {
        self.clear_layers();
        let id = root.id();
        self.layers.insert(id, detached(root));
        self.root = Some(id);
        self.can_draw_dirty = true;
        self.needs_update_draw_properties = true;
    }

    /// Destroy the whole scene graph, keeping the tree ready for a new root.
    pub fn detach_layer_tree(&mut self) {
        self.clear_layers();
        self.can_draw_dirty = true;
        self.needs_update_draw_properties = true;
    }

    fn clear_layers(&mut self) {
        self.layers.clear();
        self.root = None;
        self.currently_scrolling_layer = None;
        self.render_surface_layer_list.clear();
        self.damage = DamageTrackers::default();
    }

    /// Append `child` as the last child of `parent`.
    pub fn add_child(&mut self, parent: LayerId, child: Layer) -> StrataResult<()> {
        self.insert_child(parent, usize::MAX, child)
    }

    /// Insert `child` under `parent` at `index` (clamped to the child count).
    pub fn insert_child(&mut self, parent: LayerId, index: usize, child: Layer) -> StrataResult<()> {
        if !self.layers.contains_key(&parent) {
            return Err(StrataError::structure(format!("unknown parent layer {parent}")));
        }
        let id = child.id();
        if self.layers.contains_key(&id) {
            return Err(StrataError::structure(format!("duplicate layer id {id}")));
        }
        let mut child = detached(child);
        child.parent = Some(parent);
        self.layers.insert(id, child);
        self.link_child(parent, index, id);
        self.needs_update_draw_properties = true;
        Ok(())
    }

    /// Move an existing layer (with its subtree) under `new_parent`.
    pub fn reparent(&mut self, id: LayerId, new_parent: LayerId) -> StrataResult<()> {
        let Some(layer) = self.layers.get(&id) else {
            return Err(StrataError::structure(format!("unknown layer {id}")));
        };
        if layer.owner.is_some() {
            return Err(StrataError::structure(format!(
                "layer {id} is a mask or replica and cannot be reparented"
            )));
        }
        if self.root == Some(id) {
            return Err(StrataError::structure("the root layer cannot become a child"));
        }
        if !self.layers.contains_key(&new_parent) {
            return Err(StrataError::structure(format!("unknown parent layer {new_parent}")));
        }
        if self.is_ancestor_or_self(id, new_parent) {
            return Err(StrataError::structure(format!(
                "moving {id} under {new_parent} would create a cycle"
            )));
        }
        self.unlink(id);
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.parent = Some(new_parent);
        }
        self.link_child(new_parent, usize::MAX, id);
        self.needs_update_draw_properties = true;
        Ok(())
    }

    /// Remove a layer and destroy its subtree. Removing the root empties the tree.
    pub fn remove_layer(&mut self, id: LayerId) -> StrataResult<()> {
        if !self.layers.contains_key(&id) {
            return Err(StrataError::structure(format!("unknown layer {id}")));
        }
        if self.root == Some(id) {
            self.detach_layer_tree();
            return Ok(());
        }
        self.unlink(id);
        for gone in self.subtree_ids(id) {
            self.layers.remove(&gone);
            if self.currently_scrolling_layer == Some(gone) {
                self.currently_scrolling_layer = None;
            }
        }
        self.needs_update_draw_properties = true;
        Ok(())
    }

    /// Attach (or with `None`, destroy) the mask of `owner`.
    pub fn set_mask_layer(&mut self, owner: LayerId, mask: Option<Layer>) -> StrataResult<()> {
        self.set_owned_layer(owner, mask, OwnedSlot::Mask)
    }

    /// Attach (or with `None`, destroy) the replica of `owner`. A replica may own a
    /// mask of its own.
    pub fn set_replica_layer(&mut self, owner: LayerId, replica: Option<Layer>) -> StrataResult<()> {
        self.set_owned_layer(owner, replica, OwnedSlot::Replica)
    }

    fn set_owned_layer(
        &mut self,
        owner: LayerId,
        layer: Option<Layer>,
        slot: OwnedSlot,
    ) -> StrataResult<()> {
        let Some(owner_layer) = self.layers.get(&owner) else {
            return Err(StrataError::structure(format!("unknown layer {owner}")));
        };
        if let Some(new) = &layer
            && self.layers.contains_key(&new.id())
        {
            return Err(StrataError::structure(format!("duplicate layer id {}", new.id())));
        }
        let previous = match slot {
            OwnedSlot::Mask => owner_layer.mask_layer,
            OwnedSlot::Replica => owner_layer.replica_layer,
        };
        if let Some(prev) = previous {
            for gone in self.subtree_ids(prev) {
                self.layers.remove(&gone);
            }
        }
        let new_id = layer.map(|l| {
            let mut l = detached(l);
            l.owner = Some(owner);
            let id = l.id();
            self.layers.insert(id, l);
            id
        });
        if let Some(owner_layer) = self.layers.get_mut(&owner) {
            match slot {
                OwnedSlot::Mask => owner_layer.mask_layer = new_id,
                OwnedSlot::Replica => owner_layer.replica_layer = new_id,
            }
        }
        self.needs_update_draw_properties = true;
        Ok(())
    }

    fn link_child(&mut self, parent: LayerId, index: usize, id: LayerId) {
        if let Some(p) = self.layers.get_mut(&parent) {
            let at = index.min(p.children.len());
            p.children.insert(at, id);
        }
    }

    fn unlink(&mut self, id: LayerId) {
        let (parent, owner) = match self.layers.get(&id) {
            Some(l) => (l.parent, l.owner),
            None => return,
        };
        if let Some(p) = parent.and_then(|p| self.layers.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
        if let Some(o) = owner.and_then(|o| self.layers.get_mut(&o)) {
            if o.mask_layer == Some(id) {
                o.mask_layer = None;
            }
            if o.replica_layer == Some(id) {
                o.replica_layer = None;
            }
        }
        if let Some(l) = self.layers.get_mut(&id) {
            l.parent = None;
            l.owner = None;
        }
    }

    /// `id` and everything it owns, in pre-order: the layer, its mask, its
    /// replica (and the replica's mask), then its children.
    pub(crate) fn subtree_ids(&self, id: LayerId) -> Vec<LayerId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(layer) = self.layers.get(&cur) else {
                continue;
            };
            out.push(cur);
            for child in layer.children.iter().rev() {
                stack.push(*child);
            }
            if let Some(r) = layer.replica_layer {
                stack.push(r);
            }
            if let Some(m) = layer.mask_layer {
                stack.push(m);
            }
        }
        out
    }

    /// Every layer reachable from the root, in pre-order.
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.root.map(|r| self.subtree_ids(r)).unwrap_or_default()
    }

    /// Whether `ancestor` is `id` or one of its tree ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: LayerId, id: LayerId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.layers.get(&c).and_then(|l| l.parent);
        }
        false
    }

    // ---------------------------------------------------------------------
    // Viewport roles
    // ---------------------------------------------------------------------

    /// Bind viewport roles by id. Ids that do not resolve simply leave the role
    /// unbound until a layer with that id appears.
    pub fn set_viewport_layer_roles(
        &mut self,
        page_scale: Option<LayerId>,
        inner_viewport_scroll: Option<LayerId>,
        outer_viewport_scroll: Option<LayerId>,
    ) {
        self.page_scale_layer = page_scale;
        self.inner_viewport_scroll_layer = inner_viewport_scroll;
        self.outer_viewport_scroll_layer = outer_viewport_scroll;
        self.needs_update_draw_properties = true;
    }

    /// Drop every viewport role binding.
    pub fn clear_viewport_layer_roles(&mut self) {
        self.set_viewport_layer_roles(None, None, None);
    }

    /// Id of the page-scale layer, if bound and present.
    pub fn page_scale_layer_id(&self) -> Option<LayerId> {
        self.page_scale_layer.filter(|id| self.layers.contains_key(id))
    }

    /// Id of the inner viewport scroll layer, if bound and present.
    pub fn inner_viewport_scroll_layer_id(&self) -> Option<LayerId> {
        self.inner_viewport_scroll_layer
            .filter(|id| self.layers.contains_key(id))
    }

    /// Id of the outer viewport scroll layer, if bound and present.
    pub fn outer_viewport_scroll_layer_id(&self) -> Option<LayerId> {
        self.outer_viewport_scroll_layer
            .filter(|id| self.layers.contains_key(id))
    }

    /// The page-scale layer.
    pub fn page_scale_layer(&self) -> Option<&Layer> {
        self.page_scale_layer_id().and_then(|id| self.layers.get(&id))
    }

    /// The inner viewport scroll layer.
    pub fn inner_viewport_scroll_layer(&self) -> Option<&Layer> {
        self.inner_viewport_scroll_layer_id()
            .and_then(|id| self.layers.get(&id))
    }

    /// The outer viewport scroll layer.
    pub fn outer_viewport_scroll_layer(&self) -> Option<&Layer> {
        self.outer_viewport_scroll_layer_id()
            .and_then(|id| self.layers.get(&id))
    }

    /// Clip layer of the inner viewport scroll layer: the viewport container.
    pub fn inner_viewport_container_layer_id(&self) -> Option<LayerId> {
        self.inner_viewport_scroll_layer_id()
            .and_then(|id| self.scroll_clip_layer_id(id))
    }

    /// Check that bound roles form the chain page-scale → inner → outer.
    pub fn validate_viewport_roles(&self) -> StrataResult<()> {
        let page = self.page_scale_layer_id();
        let inner = self.inner_viewport_scroll_layer_id();
        let outer = self.outer_viewport_scroll_layer_id();
        if let (Some(p), Some(i)) = (page, inner)
            && (p == i || !self.is_ancestor_or_self(p, i))
        {
            return Err(StrataError::structure(format!(
                "page-scale layer {p} must be an ancestor of inner viewport {i}"
            )));
        }
        if let (Some(i), Some(o)) = (inner, outer)
            && (i == o || !self.is_ancestor_or_self(i, o))
        {
            return Err(StrataError::structure(format!(
                "inner viewport {i} must be an ancestor of outer viewport {o}"
            )));
        }
        Ok(())
    }

    /// Layer targeted by the scroll gesture in progress.
    pub fn currently_scrolling_layer_id(&self) -> Option<LayerId> {
        self.currently_scrolling_layer
            .filter(|id| self.layers.contains_key(id))
    }

    /// Set the layer targeted by the scroll gesture in progress.
    pub fn set_currently_scrolling_layer(&mut self, id: Option<LayerId>) {
        self.currently_scrolling_layer = id;
    }

    /// Forget the layer targeted by the scroll gesture in progress.
    pub fn clear_currently_scrolling_layer(&mut self) {
        self.currently_scrolling_layer = None;
    }

    // ---------------------------------------------------------------------
    // Page scale
    // ---------------------------------------------------------------------

    /// Producer-committed page scale.
    pub fn page_scale_factor(&self) -> f64 {
        self.page_scale_factor
    }

    /// Impl-side multiplicative adjustment of the page scale.
    pub fn page_scale_delta(&self) -> f64 {
        self.page_scale_delta
    }

    /// Part of `page_scale_delta` already reported to the producer.
    pub fn sent_page_scale_delta(&self) -> f64 {
        self.sent_page_scale_delta
    }

    /// Lower page-scale limit (0 means unlimited).
    pub fn min_page_scale_factor(&self) -> f64 {
        self.min_page_scale_factor
    }

    /// Upper page-scale limit (0 means unlimited).
    pub fn max_page_scale_factor(&self) -> f64 {
        self.max_page_scale_factor
    }

    /// `page_scale_factor * page_scale_delta`: the scale used for drawing.
    pub fn total_page_scale_factor(&self) -> f64 {
        self.page_scale_factor * self.page_scale_delta
    }

    /// Set the committed page scale and its limits, re-clamping the delta.
    pub fn set_page_scale_factor_and_limits(&mut self, factor: f64, min: f64, max: f64) {
        if !(factor > 0.0) {
            return;
        }
        self.min_page_scale_factor = min;
        self.max_page_scale_factor = max;
        self.page_scale_factor = factor;
        self.page_scale_delta = self.clamp_page_scale_delta(self.page_scale_delta);
        self.needs_update_draw_properties = true;
    }

    fn clamp_page_scale_delta(&self, delta: f64) -> f64 {
        let total = self.page_scale_factor * delta;
        if self.min_page_scale_factor > 0.0 && total < self.min_page_scale_factor {
            self.min_page_scale_factor / self.page_scale_factor
        } else if self.max_page_scale_factor > 0.0 && total > self.max_page_scale_factor {
            self.max_page_scale_factor / self.page_scale_factor
        } else {
            delta
        }
    }

    /// Set the impl-side page-scale delta. When `factor * delta` would leave the
    /// limits, the delta is adjusted so the product sits on the limit. Zero,
    /// negative and non-finite deltas are ignored.
    pub fn set_page_scale_delta(&mut self, delta: f64) {
        if !(delta > 0.0 && delta.is_finite()) {
            return;
        }
        let delta = self.clamp_page_scale_delta(delta);
        if delta == self.page_scale_delta {
            return;
        }
        self.page_scale_delta = delta;
        self.needs_update_draw_properties = true;
    }

    /// Record how much of the page-scale delta has been reported upstream.
    pub fn set_sent_page_scale_delta(&mut self, delta: f64) {
        self.sent_page_scale_delta = delta;
    }

    // ---------------------------------------------------------------------
    // Scalar state
    // ---------------------------------------------------------------------

    /// Device pixels per DIP.
    pub fn device_scale_factor(&self) -> f64 {
        self.device_scale_factor
    }

    /// Set device pixels per DIP.
    pub fn set_device_scale_factor(&mut self, factor: f64) {
        if factor == self.device_scale_factor || !(factor > 0.0) {
            return;
        }
        self.device_scale_factor = factor;
        self.needs_update_draw_properties = true;
    }

    /// Device viewport the tree is drawn into.
    pub fn device_viewport_size(&self) -> Size {
        self.viewport.device_size
    }

    /// Set the device viewport. Hosts do this for their trees; standalone trees
    /// need it before computing draw properties.
    pub fn set_device_viewport_size(&mut self, size: Size) {
        if self.viewport.device_size == size {
            return;
        }
        self.viewport.device_size = size;
        self.needs_update_draw_properties = true;
    }

    /// Viewport rect used for clipping: the external viewport if one is set,
    /// otherwise the device viewport.
    pub fn draw_viewport_rect(&self) -> Rect {
        self.viewport
            .external_viewport
            .unwrap_or_else(|| rect_from_size(self.viewport.device_size))
    }

    /// Transform from root layer space to device pixels.
    pub fn device_transform(&self) -> Affine {
        self.viewport.external_transform * Affine::scale(self.device_scale_factor)
    }

    /// Color shown where no layer draws.
    pub fn background_color(&self) -> Color {
        self.background_color
    }

    /// Set the color shown where no layer draws.
    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    /// Whether uncovered pixels stay transparent instead of being filled.
    pub fn has_transparent_background(&self) -> bool {
        self.has_transparent_background
    }

    /// Leave uncovered pixels transparent instead of filling them.
    pub fn set_has_transparent_background(&mut self, transparent: bool) {
        self.has_transparent_background = transparent;
    }

    /// Whether draw properties are stale.
    pub fn needs_update_draw_properties(&self) -> bool {
        self.needs_update_draw_properties
    }

    /// Mark draw properties stale.
    pub fn set_needs_update_draw_properties(&mut self) {
        self.needs_update_draw_properties = true;
    }

    /// Whether low-resolution or missing tiles abort the draw.
    pub fn requires_high_res_to_draw(&self) -> bool {
        self.requires_high_res_to_draw
    }

    /// Make low-resolution or missing tiles abort the draw until the next commit.
    pub fn set_requires_high_res_to_draw(&mut self) {
        self.requires_high_res_to_draw = true;
    }

    /// Allow drawing with low-resolution content again.
    pub fn reset_requires_high_res_to_draw(&mut self) {
        self.requires_high_res_to_draw = false;
    }

    /// Whether the viewport changed in a way this tree has not caught up with.
    pub fn viewport_size_invalid(&self) -> bool {
        self.viewport_size_invalid
    }

    /// Flag the viewport as out of date for this tree.
    pub fn set_viewport_size_invalid(&mut self) {
        self.viewport_size_invalid = true;
        self.can_draw_dirty = true;
    }

    /// Clear the out-of-date viewport flag.
    pub fn reset_viewport_size_invalid(&mut self) {
        self.viewport_size_invalid = false;
        self.can_draw_dirty = true;
    }

    /// Whether producer textures were evicted since the last commit.
    pub fn contents_textures_purged(&self) -> bool {
        self.contents_textures_purged
    }

    /// Record that producer textures were evicted.
    pub fn set_contents_textures_purged(&mut self) {
        self.contents_textures_purged = true;
        self.can_draw_dirty = true;
    }

    /// Clear the eviction flag once the producer re-uploaded its textures.
    pub fn reset_contents_textures_purged(&mut self) {
        self.contents_textures_purged = false;
        self.can_draw_dirty = true;
    }

    /// Surface-owning layers from the last property pass, parent before child.
    pub fn render_surface_layer_list(&self) -> &[LayerId] {
        &self.render_surface_layer_list
    }

    /// Recompute draw properties if they are stale.
    pub fn update_draw_properties(&mut self) {
        if !self.needs_update_draw_properties {
            return;
        }
        crate::draw::properties::calculate_draw_properties(self);
        self.needs_update_draw_properties = false;
    }

    /// Sum of the inner and outer viewport scroll offsets.
    pub fn total_scroll_offset(&self) -> Vec2 {
        [self.inner_viewport_scroll_layer(), self.outer_viewport_scroll_layer()]
            .into_iter()
            .flatten()
            .map(Layer::total_scroll_offset)
            .fold(Vec2::ZERO, |acc, v| acc + v)
    }

    /// Sum of the inner and outer viewport maximum scroll offsets.
    pub fn total_max_scroll_offset(&self) -> Vec2 {
        [
            self.inner_viewport_scroll_layer_id(),
            self.outer_viewport_scroll_layer_id(),
        ]
        .into_iter()
        .flatten()
        .map(|id| self.max_scroll_offset(id))
        .fold(Vec2::ZERO, |acc, v| acc + v)
    }

    /// Size of the content scrolled by the viewport, in layer space.
    pub fn scrollable_size(&self) -> Size {
        self.outer_viewport_scroll_layer()
            .or_else(|| self.inner_viewport_scroll_layer())
            .map(|l| l.effective_bounds())
            .unwrap_or(Size::ZERO)
    }

    /// Release content resources on every layer.
    pub(crate) fn release_resources(&mut self) {
        for layer in self.layers.values_mut() {
            layer.release_resources();
        }
    }

    /// Clear update rects on every layer after a draw.
    pub(crate) fn reset_update_rects(&mut self) {
        for layer in self.layers.values_mut() {
            layer.props.update_rect = Rect::ZERO;
        }
    }

    /// Deterministic human-readable listing of the tree.
    pub fn dump(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "LayerTree layers={} page_scale={}x{} dsf={}\n",
            self.layers.len(),
            self.page_scale_factor,
            self.page_scale_delta,
            self.device_scale_factor
        ));
        s.push_str(&format!(
            "roles: page_scale={:?} inner={:?} outer={:?}\n",
            self.page_scale_layer.map(|i| i.0),
            self.inner_viewport_scroll_layer.map(|i| i.0),
            self.outer_viewport_scroll_layer.map(|i| i.0),
        ));
        if let Some(root) = self.root {
            self.dump_layer(root, 0, "", &mut s);
        }
        s
    }

    fn dump_layer(&self, id: LayerId, depth: usize, tag: &str, s: &mut String) {
        let Some(layer) = self.layers.get(&id) else {
            return;
        };
        let p = &layer.props;
        let b = layer.effective_bounds();
        s.push_str(&format!(
            "{:indent$}{}{} pos=({}, {}) bounds={}x{} scroll=({}, {})+({}, {})",
            "",
            tag,
            id,
            p.position.x,
            p.position.y,
            b.width,
            b.height,
            p.scroll_offset.x,
            p.scroll_offset.y,
            layer.scroll_delta.x,
            layer.scroll_delta.y,
            indent = depth * 2
        ));
        if p.draws_content {
            s.push_str(" draws");
        }
        if let Some(clip) = p.scroll_clip_layer {
            s.push_str(&format!(" clip={clip}"));
        }
        if layer.has_render_surface() {
            s.push_str(" surface");
        }
        s.push('\n');
        if let Some(m) = layer.mask_layer {
            self.dump_layer(m, depth + 1, "mask:", s);
        }
        if let Some(r) = layer.replica_layer {
            self.dump_layer(r, depth + 1, "replica:", s);
        }
        for child in &layer.children {
            self.dump_layer(*child, depth + 1, "", s);
        }
    }
}

#[derive(Clone, Copy)]
enum OwnedSlot {
    Mask,
    Replica,
}

/// Strip hierarchy links from a layer entering the tree.
fn detached(mut layer: Layer) -> Layer {
    layer.parent = None;
    layer.owner = None;
    layer.children.clear();
    layer.mask_layer = None;
    layer.replica_layer = None;
    layer
}

#[cfg(test)]
#[path = "../../tests/unit/tree/layer_tree.rs"]
mod tests;
