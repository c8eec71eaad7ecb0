use crate::foundation::core::{LayerId, Rect};
use crate::foundation::math::{
    Region, enclosing_rect, intersect, is_axis_aligned, map_rect, rect_is_empty, try_inverse,
};
use crate::tree::layer_tree::LayerTree;

/// Shrink visible content rects by what opaque layers in front cover.
///
/// Each surface is handled on its own: layers are walked front to back, and
/// every opaque, axis-aligned, non-animating contributor adds its footprint to
/// the occluded region of that target. Child surfaces neither occlude nor get
/// occluded here.
pub(crate) fn apply(tree: &mut LayerTree) {
    let owners: Vec<LayerId> = tree.render_surface_layer_list.clone();
    for owner in owners {
        let Some(list) = tree
            .layers
            .get(&owner)
            .and_then(|l| l.draw.render_surface.as_ref())
            .map(|s| s.layer_list.clone())
        else {
            continue;
        };

        let mut occluded = Region::new();
        for id in list.iter().rev() {
            let Some(layer) = tree.layers.get_mut(id) else {
                continue;
            };
            if *id != owner && layer.draw.render_surface.is_some() {
                continue;
            }
            let dp = &mut layer.draw;
            if rect_is_empty(dp.visible_content_rect) {
                continue;
            }
            let t = dp.target_space_transform;
            let mut footprint = map_rect(t, dp.visible_content_rect);
            if dp.is_clipped {
                footprint = intersect(footprint, dp.clip_rect);
            }

            if !occluded.is_empty() {
                if occluded.contains_rect(footprint) {
                    dp.visible_content_rect = Rect::ZERO;
                    continue;
                }
                if is_axis_aligned(t)
                    && let Some(inv) = try_inverse(t)
                {
                    let mut rest = Region::from_rect(footprint);
                    rest.subtract(&occluded);
                    let back = enclosing_rect(map_rect(inv, rest.bounds()));
                    dp.visible_content_rect = intersect(dp.visible_content_rect, back);
                }
            }

            let opaque = layer.props.contents_opaque
                && dp.opacity >= 1.0
                && is_axis_aligned(t)
                && !dp.target_space_transform_is_animating;
            if opaque {
                occluded.union_rect(footprint);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/occlusion.rs"]
mod tests;
