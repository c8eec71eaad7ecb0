use crate::foundation::core::{LayerId, Vec2};
use crate::foundation::error::StrataResult;
use crate::foundation::math::floor_vec;
use crate::host::animate::sync_scrollbar_fade_controllers;
use crate::host::client::HostClient;
use crate::host::host::LayerTreeHost;
use crate::tree::layer_tree::LayerTree;
use crate::tree::sync::TreeDescription;

/// Scroll reported back to the producer for one layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerScrollUpdate {
    /// Layer that scrolled.
    pub layer: LayerId,
    /// Whole-pixel scroll not reported before.
    pub scroll_delta: Vec2,
}

/// Impl-side changes the producer should fold into its next commit.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollAndScaleSet {
    /// Per-layer scroll, for layers with something new to report.
    pub scrolls: Vec<LayerScrollUpdate>,
    /// Page-scale change not reported before (1 when there is none).
    pub page_scale_delta: f64,
}

impl<C: HostClient> LayerTreeHost<C> {
    /// Start a commit: create an empty pending tree (or return the one already
    /// in flight) for the producer to populate.
    pub fn create_pending_tree(&mut self) -> &mut LayerTree {
        let tree = match self.pending_tree.take() {
            Some(tree) => tree,
            None => self.new_pending_tree(LayerTree::new(self.settings.clone())),
        };
        self.pending_tree.insert(tree)
    }

    /// Commit a whole tree description as the pending tree and tell the client
    /// it is ready to activate.
    ///
    /// A description that is structurally invalid, or whose viewport roles do
    /// not form an ancestor chain, is rejected and leaves any existing pending
    /// tree untouched.
    #[tracing::instrument(skip(self, desc), fields(layers = desc.layers.len()))]
    pub fn commit_description(&mut self, desc: &TreeDescription) -> StrataResult<()> {
        let tree = LayerTree::from_description(desc, self.settings.clone())?;
        tree.validate_viewport_roles()?;
        let tree = self.new_pending_tree(tree);
        self.pending_tree = Some(tree);
        tracing::debug!("pending tree committed");
        self.client.notify_ready_to_activate();
        Ok(())
    }

    /// Seed a freshly built pending tree with the host's viewport and the
    /// page-scale change not yet reported to the producer.
    fn new_pending_tree(&self, mut tree: LayerTree) -> LayerTree {
        tree.viewport = self.draw_viewport();
        let active = &self.active_tree;
        tree.set_page_scale_delta(active.page_scale_delta() / active.sent_page_scale_delta());
        tree.set_needs_update_draw_properties();
        tree
    }

    /// Make the pending tree active.
    ///
    /// Runtime state is carried over by layer id: the unreported part of each
    /// scroll delta, scrollbar fade controllers, the layer being scrolled and
    /// the damage history. Returns false when there is no pending tree.
    #[tracing::instrument(skip(self))]
    pub fn activate_pending_tree(&mut self) -> bool {
        let Some(mut next) = self.pending_tree.take() else {
            return false;
        };
        let old = &mut self.active_tree;

        for (id, layer) in next.layers.iter_mut() {
            match old.layers.get_mut(id) {
                Some(prev) => {
                    layer.scroll_delta = prev.scroll_delta - prev.sent_scroll_delta;
                    layer.scrollbar_fade = prev.scrollbar_fade.take();
                }
                None => layer.scroll_delta = Vec2::ZERO,
            }
            layer.sent_scroll_delta = Vec2::ZERO;
        }
        next.set_currently_scrolling_layer(old.currently_scrolling_layer_id());
        next.set_page_scale_delta(old.page_scale_delta() / old.sent_page_scale_delta());
        next.set_sent_page_scale_delta(1.0);
        next.damage = std::mem::take(&mut old.damage);
        next.viewport = old.viewport;
        if old.requires_high_res_to_draw() {
            next.set_requires_high_res_to_draw();
        }

        self.device_scale_factor = next.device_scale_factor();
        sync_scrollbar_fade_controllers(&mut next, &self.settings);
        next.set_needs_update_draw_properties();
        self.active_tree = next;
        tracing::debug!(layers = self.active_tree.layer_count(), "pending tree activated");

        self.sync_draw_viewport();
        self.update_inner_viewport_container_size();
        self.notify_can_draw_state_changed();
        self.client.set_needs_redraw(None);
        self.client.did_activate_pending_tree();
        true
    }

    /// Report whole-pixel scroll and page-scale changes not reported before,
    /// and remember them as sent. A second call with no scrolling in between
    /// reports nothing.
    pub fn process_scroll_deltas(&mut self) -> ScrollAndScaleSet {
        let tree = &mut self.active_tree;
        let mut scrolls = Vec::new();
        for id in tree.layer_ids() {
            let Some(layer) = tree.layer(id) else {
                continue;
            };
            let floored = floor_vec(layer.scroll_delta());
            let unreported = floored - layer.sent_scroll_delta();
            if unreported != Vec2::ZERO {
                scrolls.push(LayerScrollUpdate {
                    layer: id,
                    scroll_delta: unreported,
                });
                tree.set_sent_scroll_delta(id, floored);
            }
        }
        let page_scale_delta = tree.page_scale_delta() / tree.sent_page_scale_delta();
        tree.set_sent_page_scale_delta(tree.page_scale_delta());
        ScrollAndScaleSet {
            scrolls,
            page_scale_delta,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/activation.rs"]
mod tests;
