use std::collections::{HashMap, HashSet};

use crate::foundation::core::{Color, LayerId};
use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::settings::LayerTreeSettings;
use crate::layer::layer::{Layer, LayerProps};
use crate::tree::layer_tree::LayerTree;

/// How a described layer hangs off its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSlot {
    /// Ordinary child, painted in list order.
    #[default]
    Child,
    /// Mask of the parent.
    Mask,
    /// Replica of the parent.
    Replica,
}

/// One layer of a [`TreeDescription`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerDescription {
    /// Layer id.
    pub id: LayerId,
    /// Parent (or owner, for masks and replicas). Exactly one layer has none.
    #[serde(default)]
    pub parent: Option<LayerId>,
    /// Relationship to `parent`.
    #[serde(default)]
    pub slot: LayerSlot,
    /// Producer-owned properties.
    #[serde(flatten)]
    pub props: LayerProps,
}

impl LayerDescription {
    /// A child of `parent` with default properties.
    pub fn child(id: LayerId, parent: LayerId) -> Self {
        Self {
            id,
            parent: Some(parent),
            slot: LayerSlot::Child,
            props: LayerProps::default(),
        }
    }
}

/// Flat, serializable form of a whole tree, as handed over by the producer at
/// commit time.
///
/// Layers reference their parent by id. A layer's children keep the order in
/// which they appear in `layers`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TreeDescription {
    /// All layers, in any order that lists children in paint order.
    pub layers: Vec<LayerDescription>,
    /// Layer whose children get the page scale.
    pub page_scale_layer: Option<LayerId>,
    /// Inner viewport scroll layer.
    pub inner_viewport_scroll_layer: Option<LayerId>,
    /// Outer viewport scroll layer.
    pub outer_viewport_scroll_layer: Option<LayerId>,
    /// Committed page scale.
    pub page_scale_factor: f64,
    /// Lower page-scale limit (0 means unlimited).
    pub min_page_scale_factor: f64,
    /// Upper page-scale limit (0 means unlimited).
    pub max_page_scale_factor: f64,
    /// Device pixels per DIP.
    pub device_scale_factor: f64,
    /// Color shown where no layer draws.
    pub background_color: Color,
    /// Leave uncovered pixels transparent.
    pub has_transparent_background: bool,
}

impl Default for TreeDescription {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            page_scale_layer: None,
            inner_viewport_scroll_layer: None,
            outer_viewport_scroll_layer: None,
            page_scale_factor: 1.0,
            min_page_scale_factor: 0.0,
            max_page_scale_factor: 0.0,
            device_scale_factor: 1.0,
            background_color: Color::WHITE,
            has_transparent_background: false,
        }
    }
}

impl TreeDescription {
    /// Parse a description from JSON.
    pub fn from_json(json: &str) -> StrataResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> StrataResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl LayerTree {
    /// Build a tree from a description.
    ///
    /// Fails on duplicate ids, on anything other than exactly one root, on a
    /// parent that does not exist, on a second mask or replica for the same
    /// owner, and on layers that cannot be reached from the root.
    pub fn from_description(
        desc: &TreeDescription,
        settings: LayerTreeSettings,
    ) -> StrataResult<Self> {
        let mut seen = HashSet::new();
        for l in &desc.layers {
            if !seen.insert(l.id) {
                return Err(StrataError::structure(format!("duplicate layer id {}", l.id)));
            }
        }

        let mut roots = desc.layers.iter().filter(|l| l.parent.is_none());
        let root = match (roots.next(), roots.next()) {
            (Some(r), None) => r,
            (None, _) => return Err(StrataError::structure("description has no root layer")),
            (Some(a), Some(b)) => {
                return Err(StrataError::structure(format!(
                    "description has several roots ({} and {})",
                    a.id, b.id
                )));
            }
        };
        if root.slot != LayerSlot::Child {
            return Err(StrataError::structure(format!(
                "root layer {} cannot be a mask or replica",
                root.id
            )));
        }

        let mut by_parent: HashMap<LayerId, Vec<&LayerDescription>> = HashMap::new();
        for l in &desc.layers {
            if let Some(p) = l.parent {
                if !seen.contains(&p) {
                    return Err(StrataError::structure(format!(
                        "layer {} names unknown parent {p}",
                        l.id
                    )));
                }
                by_parent.entry(p).or_default().push(l);
            }
        }

        let mut tree = LayerTree::new(settings);
        tree.set_root_layer(Layer::with_props(root.id, root.props.clone()));
        let mut queue = vec![root.id];
        while let Some(parent) = queue.pop() {
            let Some(kids) = by_parent.get(&parent) else {
                continue;
            };
            let mut has_mask = false;
            let mut has_replica = false;
            for l in kids {
                let layer = Layer::with_props(l.id, l.props.clone());
                match l.slot {
                    LayerSlot::Child => tree.add_child(parent, layer)?,
                    LayerSlot::Mask | LayerSlot::Replica => {
                        let taken = if l.slot == LayerSlot::Mask {
                            &mut has_mask
                        } else {
                            &mut has_replica
                        };
                        if std::mem::replace(taken, true) {
                            return Err(StrataError::structure(format!(
                                "layer {parent} has more than one {:?} layer",
                                l.slot
                            )));
                        }
                        if l.slot == LayerSlot::Mask {
                            tree.set_mask_layer(parent, Some(layer))?;
                        } else {
                            tree.set_replica_layer(parent, Some(layer))?;
                        }
                    }
                }
                queue.push(l.id);
            }
        }

        if tree.layer_count() != desc.layers.len() {
            let missing: Vec<String> = desc
                .layers
                .iter()
                .filter(|l| !tree.contains(l.id))
                .map(|l| l.id.to_string())
                .collect();
            return Err(StrataError::structure(format!(
                "layers not reachable from the root: {}",
                missing.join(", ")
            )));
        }

        tree.set_viewport_layer_roles(
            desc.page_scale_layer,
            desc.inner_viewport_scroll_layer,
            desc.outer_viewport_scroll_layer,
        );
        tree.set_page_scale_factor_and_limits(
            desc.page_scale_factor,
            desc.min_page_scale_factor,
            desc.max_page_scale_factor,
        );
        tree.set_device_scale_factor(desc.device_scale_factor);
        tree.set_background_color(desc.background_color);
        tree.set_has_transparent_background(desc.has_transparent_background);
        Ok(tree)
    }

    /// Flatten the tree back into a description. Parents precede their
    /// children, so the result round-trips through
    /// [`LayerTree::from_description`].
    pub fn to_description(&self) -> TreeDescription {
        let layers = self
            .layer_ids()
            .into_iter()
            .filter_map(|id| self.layers.get(&id))
            .map(|l| {
                let (parent, slot) = match l.owner {
                    Some(owner) => {
                        let slot = if self.layers.get(&owner).and_then(|o| o.mask_layer) == Some(l.id())
                        {
                            LayerSlot::Mask
                        } else {
                            LayerSlot::Replica
                        };
                        (Some(owner), slot)
                    }
                    None => (l.parent, LayerSlot::Child),
                };
                LayerDescription {
                    id: l.id(),
                    parent,
                    slot,
                    props: l.props.clone(),
                }
            })
            .collect();

        TreeDescription {
            layers,
            page_scale_layer: self.page_scale_layer_id(),
            inner_viewport_scroll_layer: self.inner_viewport_scroll_layer_id(),
            outer_viewport_scroll_layer: self.outer_viewport_scroll_layer_id(),
            page_scale_factor: self.page_scale_factor(),
            min_page_scale_factor: self.min_page_scale_factor(),
            max_page_scale_factor: self.max_page_scale_factor(),
            device_scale_factor: self.device_scale_factor(),
            background_color: self.background_color(),
            has_transparent_background: self.has_transparent_background(),
        }
    }

    /// The tree as a JSON value, for debugging and test expectations.
    pub fn as_json(&self) -> StrataResult<serde_json::Value> {
        Ok(serde_json::to_value(self.to_description())?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tree/sync.rs"]
mod tests;
