use std::collections::HashMap;

use crate::draw::surface::RenderSurface;
use crate::foundation::core::{Affine, LayerId, Rect, Size, Vec2};
use crate::foundation::math::{
    enclosing_rect, intersect, linear_part, map_rect, map_vec, rect_from_size, rect_is_empty,
    scale_components, size_is_empty, try_inverse, union_nonempty,
};
use crate::layer::layer::{DrawProperties, Layer};
use crate::tree::layer_tree::LayerTree;

/// Tree-wide inputs fixed for one property pass.
struct Globals {
    root: LayerId,
    device_transform: Affine,
    viewport: Rect,
    page_scale_layer: Option<LayerId>,
    page_scale: f64,
    device_scale_factor: f64,
    can_adjust_raster_scales: bool,
    min_contents_scale: f64,
    max_contents_scale: f64,
}

/// State handed from a layer to its children.
#[derive(Clone, Copy, Debug)]
struct Inherited {
    /// Parent layer space to the current target space.
    parent_matrix: Affine,
    /// Current target space to screen space.
    target_to_screen: Affine,
    target: LayerId,
    /// Scissor clip in target space.
    clip: Option<Rect>,
    /// Bound on what can be visible, in target space.
    visible_clip: Rect,
    /// Ancestor clips in screen space.
    screen_clip: Rect,
    opacity: f64,
    target_animating: bool,
    screen_animating: bool,
    /// Target-space shift that undoes ancestor scrolling for fixed layers.
    scroll_compensation: Vec2,
    /// Linear part of the fixed container's layer-to-target mapping.
    container_linear: Affine,
    /// How far the fixed container grew, in its layer space.
    container_size_delta: Vec2,
}

struct Calc<'a> {
    tree: &'a LayerTree,
    g: Globals,
    drawing_descendants: HashMap<LayerId, usize>,
    draw: HashMap<LayerId, DrawProperties>,
    surfaces: HashMap<LayerId, RenderSurface>,
    rsll: Vec<LayerId>,
}

/// Recompute draw properties, render surfaces and the render-surface layer list
/// for the whole tree, then run occlusion over the result.
#[tracing::instrument(skip(tree), fields(layers = tree.layers.len()))]
pub(crate) fn calculate_draw_properties(tree: &mut LayerTree) {
    let Some(root) = tree.root_layer_id() else {
        tree.render_surface_layer_list.clear();
        return;
    };

    let settings = &tree.settings;
    let g = Globals {
        root,
        device_transform: tree.device_transform(),
        viewport: tree.draw_viewport_rect(),
        page_scale_layer: tree.page_scale_layer_id(),
        page_scale: tree.total_page_scale_factor(),
        device_scale_factor: tree.device_scale_factor(),
        can_adjust_raster_scales: settings.layer_transforms_should_scale_layer_contents,
        min_contents_scale: settings.minimum_contents_scale,
        max_contents_scale: settings.maximum_contents_scale,
    };

    let mut calc = Calc {
        tree: &*tree,
        g,
        drawing_descendants: HashMap::new(),
        draw: HashMap::new(),
        surfaces: HashMap::new(),
        rsll: Vec::new(),
    };
    calc.count_drawing_descendants(root);

    let viewport = calc.g.viewport;
    let start = Inherited {
        parent_matrix: calc.g.device_transform,
        target_to_screen: Affine::IDENTITY,
        target: root,
        clip: Some(viewport),
        visible_clip: viewport,
        screen_clip: viewport,
        opacity: 1.0,
        target_animating: false,
        screen_animating: false,
        scroll_compensation: Vec2::ZERO,
        container_linear: Affine::IDENTITY,
        container_size_delta: Vec2::ZERO,
    };
    calc.visit(root, &start);
    calc.mark_drawn_scrollers();

    let Calc {
        mut draw,
        mut surfaces,
        rsll,
        ..
    } = calc;

    for (id, layer) in tree.layers.iter_mut() {
        layer.draw = draw.remove(id).unwrap_or_default();
        layer.draw.render_surface = surfaces.remove(id);
    }
    tracing::debug!(surfaces = rsll.len(), "draw properties updated");
    tree.render_surface_layer_list = rsll;

    crate::draw::occlusion::apply(tree);
}

/// Layer space to parent space, with the effective scroll offset subtracted.
fn local_transform(layer: &Layer, scroll: Vec2) -> Affine {
    let p = &layer.props;
    let origin = p.transform_origin.to_vec2();
    Affine::translate(p.position.to_vec2() - scroll)
        * Affine::translate(origin)
        * p.transform
        * Affine::translate(-origin)
}

fn nonzero_scale(v: Vec2) -> Vec2 {
    let fix = |s: f64| if s > 1e-6 && s.is_finite() { s } else { 1.0 };
    Vec2::new(fix(v.x), fix(v.y))
}

impl Calc<'_> {
    fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.tree.layers.get(&id)
    }

    /// Records, for every layer, how many descendants draw content. Returns the
    /// count for `id` including itself.
    fn count_drawing_descendants(&mut self, id: LayerId) -> usize {
        let tree = self.tree;
        let Some(layer) = tree.layers.get(&id) else {
            return 0;
        };
        let children: Vec<LayerId> = layer.children.to_vec();
        let own = usize::from(layer.props.draws_content);
        let below: usize = children
            .into_iter()
            .map(|c| self.count_drawing_descendants(c))
            .sum();
        self.drawing_descendants.insert(id, below);
        own + below
    }

    /// Impl-side delta of a scroll parent that is not a tree ancestor. Such a
    /// layer has to follow its scroll parent by hand.
    fn scroll_parent_delta(&self, layer: &Layer) -> Vec2 {
        if let Some(sp) = layer.props.scroll_parent
            && let Some(scroll_parent) = self.layer(sp)
            && !layer
                .parent
                .is_some_and(|p| self.tree.is_ancestor_or_self(sp, p))
        {
            return scroll_parent.scroll_delta;
        }
        Vec2::ZERO
    }

    /// Own scroll delta plus the detached scroll parent's. Fixed-position
    /// layers undo exactly this much.
    fn effective_scroll_delta(&self, layer: &Layer) -> Vec2 {
        layer.scroll_delta + self.scroll_parent_delta(layer)
    }

    /// Committed offset plus impl-side delta, plus the detached scroll
    /// parent's delta. This is what the draw transform subtracts.
    fn effective_scroll_offset(&self, layer: &Layer) -> Vec2 {
        layer.total_scroll_offset() + self.scroll_parent_delta(layer)
    }

    fn contents_scale(&self, layer: &Layer, screen: Affine) -> f64 {
        let scale = if let Some(o) = layer.props.contents_scale_override {
            o
        } else if self.g.can_adjust_raster_scales {
            let s = scale_components(screen);
            s.x.max(s.y)
                .max(self.g.min_contents_scale)
                .min(self.g.max_contents_scale)
        } else {
            1.0
        };
        if scale > 0.0 && scale.is_finite() { scale } else { 1.0 }
    }

    fn needs_render_surface(&self, layer: &Layer) -> bool {
        let p = &layer.props;
        if layer.id() == self.g.root
            || layer.mask_layer.is_some()
            || layer.replica_layer.is_some()
            || p.force_render_surface
        {
            return true;
        }
        let drawing = self
            .drawing_descendants
            .get(&layer.id())
            .copied()
            .unwrap_or(0);
        p.opacity < 1.0 && drawing > 0
    }

    fn visit(&mut self, id: LayerId, inh: &Inherited) {
        let tree = self.tree;
        let Some(layer) = tree.layers.get(&id) else {
            return;
        };
        let p = &layer.props;
        let is_root = id == self.g.root;

        if !is_root && p.opacity <= 0.0 && !p.opacity_is_animating {
            return;
        }

        let scroll = self.effective_scroll_delta(layer);
        let local = local_transform(layer, self.effective_scroll_offset(layer));
        let mut combined = inh.parent_matrix * local;

        if p.position_constraint.is_fixed_position {
            let c = p.position_constraint;
            let edge = Vec2::new(
                if c.is_fixed_to_right_edge {
                    inh.container_size_delta.x
                } else {
                    0.0
                },
                if c.is_fixed_to_bottom_edge {
                    inh.container_size_delta.y
                } else {
                    0.0
                },
            );
            let shift = inh.scroll_compensation + map_vec(inh.container_linear, edge);
            combined = Affine::translate(shift) * combined;
        }
        let screen = inh.target_to_screen * combined;

        if !is_root && !p.double_sided && screen.determinant() < 0.0 {
            return;
        }

        let bounds = layer.effective_bounds();
        let cs = self.contents_scale(layer, screen);
        let content_bounds = Size::new((bounds.width * cs).ceil(), (bounds.height * cs).ceil());
        let content_rect = rect_from_size(content_bounds);
        let content_to_layer = Affine::scale(1.0 / cs);
        let layer_animating = p.transform_is_animating;
        let owns_surface = self.needs_render_surface(layer);

        let mut dp = DrawProperties {
            contents_scale: cs,
            content_bounds,
            screen_space_transform: screen * content_to_layer,
            screen_space_transform_is_animating: inh.screen_animating || layer_animating,
            screen_clip: Some(inh.screen_clip),
            ..DrawProperties::default()
        };

        let mut children = *inh;
        children.screen_animating = inh.screen_animating || layer_animating;

        let mut compensation = if p.is_container_for_fixed_position_layers {
            Vec2::ZERO
        } else {
            inh.scroll_compensation
        };
        compensation += map_vec(inh.parent_matrix, scroll);

        // Layer space to the children's target space.
        let layer_to_child_target;
        let own_visible_clip;

        if owns_surface {
            let (base, surface_draw) = if is_root {
                (combined, Affine::IDENTITY)
            } else {
                let s = if self.g.can_adjust_raster_scales {
                    nonzero_scale(scale_components(combined))
                } else {
                    Vec2::new(self.g.device_scale_factor, self.g.device_scale_factor)
                };
                (
                    Affine::scale_non_uniform(s.x, s.y),
                    combined * Affine::scale_non_uniform(1.0 / s.x, 1.0 / s.y),
                )
            };

            let mut surface = RenderSurface::new(id);
            surface.draw_transform = surface_draw;
            surface.screen_space_transform = inh.target_to_screen * surface_draw;
            surface.draw_opacity = inh.opacity * p.opacity;
            surface.target_transform_is_animating = inh.target_animating || layer_animating;
            surface.is_clipped = !is_root && inh.clip.is_some();
            surface.clip_rect = if surface.is_clipped {
                inh.clip.unwrap_or(Rect::ZERO)
            } else {
                Rect::ZERO
            };
            if let Some(replica) = layer.replica_layer.and_then(|r| tree.layers.get(&r))
                && let Some(base_inv) = try_inverse(base)
            {
                let replica_local = local_transform(replica, Vec2::ZERO);
                surface.replica_draw_transform = Some(surface_draw * base * replica_local * base_inv);
            }

            let surface_clip = if is_root {
                self.g.viewport
            } else {
                match try_inverse(surface_draw) {
                    Some(inv) => map_rect(inv, inh.visible_clip),
                    None => Rect::ZERO,
                }
            };
            let to_surface_linear = try_inverse(linear_part(surface_draw))
                .map(linear_part)
                .unwrap_or(Affine::IDENTITY);

            dp.target_space_transform = base * content_to_layer;
            dp.opacity = 1.0;
            dp.render_target = Some(id);
            dp.is_clipped = is_root;
            dp.clip_rect = if is_root { self.g.viewport } else { Rect::ZERO };
            dp.target_space_transform_is_animating = false;
            own_visible_clip = surface_clip;

            children.parent_matrix = base;
            children.target_to_screen = surface.screen_space_transform;
            children.target = id;
            children.clip = if is_root { Some(self.g.viewport) } else { None };
            children.visible_clip = surface_clip;
            children.opacity = 1.0;
            children.target_animating = false;
            children.scroll_compensation = map_vec(to_surface_linear, compensation);
            children.container_linear = to_surface_linear * inh.container_linear;
            layer_to_child_target = base;

            self.rsll.push(id);
            self.surfaces.insert(id, surface);
        } else {
            dp.target_space_transform = combined * content_to_layer;
            dp.opacity = inh.opacity * p.opacity;
            dp.render_target = Some(inh.target);
            dp.is_clipped = inh.clip.is_some();
            dp.clip_rect = inh.clip.unwrap_or(Rect::ZERO);
            dp.target_space_transform_is_animating = inh.target_animating || layer_animating;
            own_visible_clip = inh.visible_clip;

            children.parent_matrix = combined;
            children.opacity = dp.opacity;
            children.target_animating = dp.target_space_transform_is_animating;
            children.scroll_compensation = compensation;
            layer_to_child_target = combined;
        }

        if p.masks_to_bounds {
            let layer_rect = rect_from_size(bounds);
            let in_target = map_rect(layer_to_child_target, layer_rect);
            children.clip = Some(match children.clip {
                Some(c) => intersect(c, in_target),
                None => in_target,
            });
            children.visible_clip = intersect(children.visible_clip, in_target);
            children.screen_clip = intersect(children.screen_clip, map_rect(screen, layer_rect));
        }

        if p.is_container_for_fixed_position_layers {
            children.container_linear = linear_part(layer_to_child_target);
            children.container_size_delta = if tree.scroll_clip_layer_id(id).is_some() {
                tree.fixed_container_size_delta(id)
            } else {
                layer.bounds_delta
            };
        }

        if Some(id) == self.g.page_scale_layer {
            children.parent_matrix = children.parent_matrix * Affine::scale(self.g.page_scale);
        }

        dp.visible_content_rect = match try_inverse(dp.target_space_transform) {
            Some(inv) => intersect(enclosing_rect(map_rect(inv, own_visible_clip)), content_rect),
            None => Rect::ZERO,
        };
        let footprint = map_rect(dp.target_space_transform, content_rect);
        dp.drawable_content_rect = if dp.is_clipped {
            intersect(footprint, dp.clip_rect)
        } else {
            footprint
        };

        let contributes = p.draws_content
            && !size_is_empty(bounds)
            && !rect_is_empty(dp.visible_content_rect);
        if contributes {
            dp.is_drawn_member = true;
            let target = dp.render_target.unwrap_or(id);
            if let Some(s) = self.surfaces.get_mut(&target) {
                s.layer_list.push(id);
            }
        }

        let child_ids: Vec<LayerId> = layer.children.to_vec();
        self.draw.insert(id, dp);
        for child in child_ids {
            self.visit(child, &children);
        }

        if owns_surface {
            self.finish_surface(id, inh, own_visible_clip);
        }
    }

    fn finish_surface(&mut self, id: LayerId, inh: &Inherited, surface_clip: Rect) {
        let is_root = id == self.g.root;
        let empty = self
            .surfaces
            .get(&id)
            .is_none_or(|s| s.layer_list.is_empty());

        if empty && !is_root {
            // Nothing below can contribute either, so later surfaces are gone too.
            if let Some(at) = self.rsll.iter().position(|s| *s == id) {
                for gone in self.rsll.drain(at..) {
                    self.surfaces.remove(&gone);
                }
            }
            if let Some(dp) = self.draw.get_mut(&id) {
                dp.render_target = Some(inh.target);
                dp.is_drawn_member = false;
            }
            return;
        }

        let content_rect = if is_root {
            self.g.viewport
        } else {
            let Some(surface) = self.surfaces.get(&id) else {
                return;
            };
            let union = surface
                .layer_list
                .iter()
                .filter_map(|member| {
                    if *member != id
                        && let Some(child) = self.surfaces.get(member)
                    {
                        Some(child.drawable_content_rect)
                    } else {
                        self.draw.get(member).map(|dp| dp.drawable_content_rect)
                    }
                })
                .fold(Rect::ZERO, union_nonempty);
            enclosing_rect(intersect(union, surface_clip))
        };

        let Some(surface) = self.surfaces.get_mut(&id) else {
            return;
        };
        surface.content_rect = content_rect;
        let mut drawable = map_rect(surface.draw_transform, content_rect);
        if let Some(replica) = surface.replica_draw_transform {
            drawable = union_nonempty(drawable, map_rect(replica, content_rect));
        }
        if surface.is_clipped {
            drawable = intersect(drawable, surface.clip_rect);
        }
        surface.drawable_content_rect = drawable;

        if !is_root {
            if let Some(parent) = self.surfaces.get_mut(&inh.target) {
                parent.layer_list.push(id);
            }
            if let Some(dp) = self.draw.get_mut(&id) {
                dp.is_drawn_member = true;
            }
        }
    }

    /// Fills `scrolls_drawn_descendant` for scrollable layers whose subtree, or
    /// one of whose scroll children, is drawn.
    fn mark_drawn_scrollers(&mut self) {
        let mut drawn_below: HashMap<LayerId, bool> = HashMap::new();
        self.collect_drawn(self.g.root, &mut drawn_below);

        let tree = self.tree;
        let mut scrolls: Vec<LayerId> = Vec::new();
        for (id, layer) in &tree.layers {
            if tree.scroll_clip_layer_id(*id).is_none() {
                continue;
            }
            let own = drawn_below.get(id).copied().unwrap_or(false);
            let via_scroll_child = || {
                tree.layers.values().any(|other| {
                    other.props.scroll_parent == Some(layer.id())
                        && drawn_below.get(&other.id()).copied().unwrap_or(false)
                })
            };
            if own || via_scroll_child() {
                scrolls.push(*id);
            }
        }
        for id in scrolls {
            if let Some(dp) = self.draw.get_mut(&id) {
                dp.scrolls_drawn_descendant = true;
            }
        }
    }

    fn collect_drawn(&self, id: LayerId, out: &mut HashMap<LayerId, bool>) -> bool {
        let Some(layer) = self.layer(id) else {
            return false;
        };
        let mut drawn = self.draw.get(&id).is_some_and(|dp| dp.is_drawn_member);
        for child in &layer.children {
            drawn |= self.collect_drawn(*child, out);
        }
        out.insert(id, drawn);
        drawn
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/properties.rs"]
mod tests;
