use std::collections::HashMap;

use crate::foundation::core::{Affine, LayerId, Rect};
use crate::foundation::math::{intersect, map_rect, union_nonempty};
use crate::tree::layer_tree::LayerTree;

/// What a contributor looked like the last time its surface was tracked.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ContributorState {
    rect: Rect,
    opacity: f64,
    transform: Affine,
}

#[derive(Clone, Debug, Default)]
struct SurfaceTracker {
    contributors: HashMap<LayerId, ContributorState>,
}

/// Per-surface damage history, keyed by surface owner.
///
/// Trackers outlive individual frames and move to the new active tree on
/// activation, so damage stays incremental across commits.
#[derive(Clone, Debug, Default)]
pub(crate) struct DamageTrackers {
    surfaces: HashMap<LayerId, SurfaceTracker>,
    pending_root_damage: Rect,
    force_full_root_damage: bool,
}

impl DamageTrackers {
    /// Extra damage for the root surface on the next update.
    pub(crate) fn add_root_damage(&mut self, r: Rect) {
        self.pending_root_damage = union_nonempty(self.pending_root_damage, r);
    }

    /// Damage the whole root surface on the next update.
    pub(crate) fn set_full_root_damage(&mut self) {
        self.force_full_root_damage = true;
    }

    pub(crate) fn is_tracking(&self, owner: LayerId) -> bool {
        self.surfaces.contains_key(&owner)
    }
}

/// Compute `damage_rect` for every surface of the last property pass.
///
/// Surfaces are processed child-first so that a child's damage is available,
/// mapped into the parent, when the parent is tracked.
pub(crate) fn update_damage(tree: &mut LayerTree) {
    let owners: Vec<LayerId> = tree.render_surface_layer_list.clone();
    let root = tree.root_layer_id();
    let mut previous = std::mem::take(&mut tree.damage.surfaces);
    let pending_root = std::mem::replace(&mut tree.damage.pending_root_damage, Rect::ZERO);
    let force_full = std::mem::replace(&mut tree.damage.force_full_root_damage, false);

    let mut next: HashMap<LayerId, SurfaceTracker> = HashMap::new();
    let mut results: HashMap<LayerId, Rect> = HashMap::new();

    for owner in owners.iter().rev() {
        let Some(surface) = tree
            .layers
            .get(owner)
            .and_then(|l| l.draw.render_surface.as_ref())
        else {
            continue;
        };
        let prev = previous.remove(owner);
        let is_new = prev.is_none();
        let prev = prev.unwrap_or_default();

        let mut damage = Rect::ZERO;
        let mut states: HashMap<LayerId, ContributorState> = HashMap::new();

        for id in &surface.layer_list {
            let Some(layer) = tree.layers.get(id) else {
                continue;
            };
            let (state, changed) = match layer.draw.render_surface.as_ref() {
                Some(child) if id != owner => {
                    let inner = results.get(id).copied().unwrap_or(Rect::ZERO);
                    let mut mapped = map_rect(child.draw_transform, inner);
                    if let Some(replica) = child.replica_draw_transform {
                        mapped = union_nonempty(mapped, map_rect(replica, inner));
                    }
                    if child.is_clipped {
                        mapped = intersect(mapped, child.clip_rect);
                    }
                    let state = ContributorState {
                        rect: child.drawable_content_rect,
                        opacity: child.draw_opacity,
                        transform: child.draw_transform,
                    };
                    (state, mapped)
                }
                _ => {
                    let dp = &layer.draw;
                    let in_content = map_rect(Affine::scale(dp.contents_scale), layer.props.update_rect);
                    let mut update = map_rect(dp.target_space_transform, in_content);
                    if dp.is_clipped {
                        update = intersect(update, dp.clip_rect);
                    }
                    let state = ContributorState {
                        rect: dp.drawable_content_rect,
                        opacity: dp.opacity,
                        transform: dp.target_space_transform,
                    };
                    (state, update)
                }
            };
            damage = union_nonempty(damage, changed);
            match prev.contributors.get(id) {
                None => damage = union_nonempty(damage, state.rect),
                Some(old) if *old != state => {
                    damage = union_nonempty(damage, union_nonempty(old.rect, state.rect));
                }
                Some(_) => {}
            }
            states.insert(*id, state);
        }
        for (id, old) in &prev.contributors {
            if !states.contains_key(id) {
                damage = union_nonempty(damage, old.rect);
            }
        }

        let content = surface.content_rect;
        if Some(*owner) == root {
            damage = union_nonempty(damage, pending_root);
            if force_full {
                damage = content;
            }
        }
        if is_new {
            damage = content;
        }
        results.insert(*owner, intersect(damage, content));
        next.insert(
            *owner,
            SurfaceTracker {
                contributors: states,
            },
        );
    }

    tree.damage.surfaces = next;
    for (owner, rect) in results {
        if let Some(surface) = tree
            .layers
            .get_mut(&owner)
            .and_then(|l| l.draw.render_surface.as_mut())
        {
            surface.damage_rect = rect;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/damage.rs"]
mod tests;
