use std::collections::HashSet;
use std::time::Duration;

use crate::draw::damage::update_damage;
use crate::draw::quads::{
    AppendQuadsData, DrawQuad, QuadMaterial, RenderPass, RenderPassId, SharedQuadState,
};
use crate::foundation::core::{LayerId, Rect, Vec2};
use crate::foundation::math::{Region, intersect, is_axis_aligned, rect_is_empty};
use crate::host::client::HostClient;
use crate::host::host::LayerTreeHost;
use crate::layer::content::{AppendQuadsContext, LayerContent, ScrollbarOrientation, ThumbGeometry};
use crate::tree::layer_tree::LayerTree;

/// Outcome of [`LayerTreeHost::prepare_to_draw`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DrawResult {
    /// The frame is complete and may be drawn.
    Success,
    /// An animating layer is missing tiles; showing it would checkerboard.
    AbortedCheckerboardAnimations,
    /// High-resolution content is required but some tiles are low-res or missing.
    AbortedMissingHighResContent,
    /// No renderer is bound.
    AbortedContextLost,
    /// The host cannot draw for another reason (no root, empty viewport, ...).
    AbortedCantDraw,
}

/// A frame assembled by [`LayerTreeHost::prepare_to_draw`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameData {
    /// Passes in draw order: every pass precedes the passes that consume it, so
    /// the root pass is last.
    pub render_passes: Vec<RenderPass>,
    /// Layers whose `will_draw` ran this frame and that await `did_draw`.
    pub will_draw_layers: Vec<LayerId>,
    /// Some drawn tile was low resolution or missing.
    pub contains_incomplete_tile: bool,
    /// Nothing changed since the previous frame; there are no passes.
    pub has_no_damage: bool,
    /// Damage of the root pass, in device space.
    pub root_damage_rect: Rect,
}

impl FrameData {
    /// The pass drawn to the screen.
    pub fn root_render_pass(&self) -> Option<&RenderPass> {
        self.render_passes.last()
    }

    /// Every quad of every pass, front to back within each pass.
    pub fn quads(&self) -> impl Iterator<Item = &DrawQuad> {
        self.render_passes.iter().flat_map(|p| p.quads.iter())
    }
}

fn layer_is_animating(tree: &LayerTree, id: LayerId) -> bool {
    tree.layer(id).is_some_and(|l| {
        l.draw.screen_space_transform_is_animating || l.props.opacity_is_animating
    })
}

/// Thumb placement for a scrollbar layer, from the scroll layer it tracks.
fn thumb_geometry(tree: &LayerTree, orientation: ScrollbarOrientation, scroll: LayerId) -> Option<ThumbGeometry> {
    let layer = tree.layer(scroll)?;
    let clip = tree.layer(tree.scroll_clip_layer_id(scroll)?)?;
    let max = tree.max_scroll_offset(scroll);
    let offset = layer.total_scroll_offset();
    let pick = |v: Vec2| match orientation {
        ScrollbarOrientation::Horizontal => v.x,
        ScrollbarOrientation::Vertical => v.y,
    };
    let (visible, total) = match orientation {
        ScrollbarOrientation::Horizontal => (clip.effective_bounds().width, layer.effective_bounds().width),
        ScrollbarOrientation::Vertical => (clip.effective_bounds().height, layer.effective_bounds().height),
    };
    let length = if total > 0.0 { (visible / total).min(1.0) } else { 1.0 };
    let start = if pick(max) > 0.0 {
        (pick(offset) / pick(max)).clamp(0.0, 1.0) * (1.0 - length)
    } else {
        0.0
    };
    let opacity = layer.scrollbar_fade.as_ref().map_or(1.0, |f| f.opacity());
    Some(ThumbGeometry { start, length, opacity })
}

impl<C: HostClient> LayerTreeHost<C> {
    /// Refresh draw properties and damage on the active tree and build the
    /// frame's render passes.
    ///
    /// Aborted frames leave the tree intact and force full damage on the next
    /// attempt. `will_draw` has still run for the layers listed in `frame`, so
    /// [`Self::did_draw_all_layers`] must be called either way.
    #[tracing::instrument(skip(self, frame))]
    pub fn prepare_to_draw(&mut self, frame: &mut FrameData) -> DrawResult {
        *frame = FrameData::default();
        if self.renderer.is_none() {
            return DrawResult::AbortedContextLost;
        }
        if !self.can_draw() {
            return DrawResult::AbortedCantDraw;
        }

        self.active_tree.update_draw_properties();
        let viewport_damage = std::mem::replace(&mut self.viewport_damage_rect, Rect::ZERO);
        if !rect_is_empty(viewport_damage) {
            self.active_tree.damage.add_root_damage(viewport_damage);
        }
        update_damage(&mut self.active_tree);

        let full_viewport = self.capabilities.draw_and_swap_full_viewport_every_frame;
        let root_damage = self
            .active_tree
            .root_layer()
            .and_then(|l| l.draw.render_surface.as_ref())
            .map_or(Rect::ZERO, |s| s.damage_rect);
        frame.root_damage_rect = root_damage;
        if rect_is_empty(root_damage) && !full_viewport {
            tracing::trace!("no damage, skipping frame");
            frame.has_no_damage = true;
            return DrawResult::Success;
        }

        let mut result = DrawResult::Success;
        let mut built: HashSet<LayerId> = HashSet::new();
        let owners: Vec<LayerId> = self.active_tree.render_surface_layer_list().to_vec();
        let root = self.active_tree.root_layer_id();
        for owner in owners.iter().rev().copied() {
            let Some(pass) = self.build_render_pass(owner, Some(owner) == root, &built, frame, &mut result)
            else {
                continue;
            };
            if pass.quads.is_empty() && Some(owner) != root {
                continue;
            }
            built.insert(owner);
            frame.render_passes.push(pass);
        }

        if full_viewport {
            result = DrawResult::Success;
        }
        if result != DrawResult::Success {
            tracing::debug!(?result, "frame aborted");
            self.active_tree.damage.set_full_root_damage();
        }
        result
    }

    fn build_render_pass(
        &mut self,
        owner: LayerId,
        is_root: bool,
        built: &HashSet<LayerId>,
        frame: &mut FrameData,
        result: &mut DrawResult,
    ) -> Option<RenderPass> {
        let tree = &self.active_tree;
        let surface = tree.layer(owner)?.draw.render_surface.as_ref()?;
        let mut pass = RenderPass {
            id: RenderPassId { layer: owner, index: 0 },
            output_rect: surface.content_rect,
            damage_rect: surface.damage_rect,
            transform_to_root_target: surface.screen_space_transform,
            has_transparent_background: !is_root || tree.has_transparent_background(),
            quads: Vec::new(),
        };
        let members: Vec<LayerId> = surface.layer_list.iter().rev().copied().collect();
        let requires_high_res = tree.requires_high_res_to_draw();
        let rasterize_on_demand = self.capabilities.allow_rasterize_on_demand;

        for id in members {
            if id != owner
                && let Some(child) = self.active_tree.layer(id).and_then(|l| l.draw.render_surface.as_ref())
            {
                if built.contains(&id) {
                    let has_mask = self.active_tree.layer(id).is_some_and(|l| l.mask_layer().is_some());
                    append_surface_quads(&mut pass.quads, id, child, has_mask);
                }
                continue;
            }

            let Some(content) = self.active_tree.layer(id).map(|l| &l.props.content) else {
                continue;
            };
            let thumb = match content {
                LayerContent::Scrollbar(sb) => sb
                    .scroll_layer
                    .and_then(|s| thumb_geometry(&self.active_tree, sb.orientation, s)),
                _ => None,
            };
            let animating = layer_is_animating(&self.active_tree, id);
            let Some(layer) = self.active_tree.layers.get_mut(&id) else {
                continue;
            };
            if rect_is_empty(layer.draw.visible_content_rect) || !layer.will_draw() {
                continue;
            }
            frame.will_draw_layers.push(id);

            let dp = &layer.draw;
            let ctx = AppendQuadsContext {
                layer: id,
                shared: SharedQuadState {
                    content_to_target: dp.target_space_transform,
                    visible_content_rect: dp.visible_content_rect,
                    clip_rect: dp.is_clipped.then_some(dp.clip_rect),
                    opacity: dp.opacity,
                },
                content_bounds: dp.content_bounds,
                contents_opaque: layer.props.contents_opaque,
                background_color: layer.props.background_color,
                tiles: self.tile_coverage.as_deref(),
                thumb,
            };
            let mut data = AppendQuadsData::default();
            layer.props.content.append_quads(&ctx, &mut pass.quads, &mut data);
            layer.stats.append_quads += 1;

            if data.num_missing_tiles > 0 && animating {
                *result = DrawResult::AbortedCheckerboardAnimations;
            }
            if data.num_missing_tiles > 0 || data.num_incomplete_tiles > 0 {
                frame.contains_incomplete_tile = true;
                let blocks = data.num_incomplete_tiles > 0 || !rasterize_on_demand;
                if requires_high_res && blocks && *result == DrawResult::Success {
                    *result = DrawResult::AbortedMissingHighResContent;
                }
            }
        }

        if is_root && !self.active_tree.has_transparent_background() {
            append_background_quads(&mut pass, self.active_tree.background_color());
        }
        Some(pass)
    }

    /// Hand the prepared passes to the renderer and clear per-frame update rects.
    #[tracing::instrument(skip(self, frame))]
    pub fn draw_layers(&mut self, frame: &FrameData, frame_time: Duration) {
        if frame.has_no_damage || frame.render_passes.is_empty() {
            return;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        renderer.submit_frame(&frame.render_passes, frame_time);
        self.active_tree.reset_update_rects();
        if !frame.contains_incomplete_tile {
            self.active_tree.reset_requires_high_res_to_draw();
        }
    }

    /// Tell every layer that ran `will_draw` this frame that drawing is over.
    pub fn did_draw_all_layers(&mut self, frame: &FrameData) {
        for id in &frame.will_draw_layers {
            if let Some(layer) = self.active_tree.layers.get_mut(id) {
                layer.did_draw();
            }
        }
    }

    /// Present the last submitted frame.
    pub fn swap_buffers(&mut self) -> bool {
        self.renderer.as_mut().is_some_and(|r| r.swap_buffers())
    }
}

fn append_surface_quads(
    quads: &mut Vec<DrawQuad>,
    owner: LayerId,
    surface: &crate::draw::surface::RenderSurface,
    has_mask: bool,
) {
    let pass = RenderPassId { layer: owner, index: 0 };
    let shared = |content_to_target| SharedQuadState {
        content_to_target,
        visible_content_rect: surface.content_rect,
        clip_rect: surface.is_clipped.then_some(surface.clip_rect),
        opacity: surface.draw_opacity,
    };
    quads.push(DrawQuad {
        layer: Some(owner),
        rect: surface.content_rect,
        visible_rect: surface.content_rect,
        needs_blending: true,
        shared: shared(surface.draw_transform),
        material: QuadMaterial::RenderPass {
            pass,
            is_replica: false,
            has_mask,
        },
    });
    // The replica sits behind the surface.
    if let Some(replica) = surface.replica_draw_transform {
        quads.push(DrawQuad {
            layer: Some(owner),
            rect: surface.content_rect,
            visible_rect: surface.content_rect,
            needs_blending: true,
            shared: shared(replica),
            material: QuadMaterial::RenderPass {
                pass,
                is_replica: true,
                has_mask,
            },
        });
    }
}

/// Fill what opaque quads leave uncovered with the background color.
fn append_background_quads(pass: &mut RenderPass, color: crate::foundation::core::Color) {
    let mut fill = Region::from_rect(pass.output_rect);
    for quad in &pass.quads {
        if !quad.needs_blending
            && quad.shared.opacity >= 1.0
            && is_axis_aligned(quad.shared.content_to_target)
        {
            let covered = match quad.shared.clip_rect {
                Some(clip) => intersect(quad.target_rect(), clip),
                None => quad.target_rect(),
            };
            fill.subtract_rect(covered);
        }
    }
    let shared = SharedQuadState {
        content_to_target: crate::foundation::core::Affine::IDENTITY,
        visible_content_rect: pass.output_rect,
        clip_rect: None,
        opacity: 1.0,
    };
    let rects: Vec<Rect> = fill.rects().to_vec();
    for rect in rects {
        pass.quads.push(DrawQuad {
            layer: None,
            rect,
            visible_rect: rect,
            needs_blending: !color.is_opaque(),
            shared,
            material: QuadMaterial::SolidColor { color },
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/frame.rs"]
mod tests;
