use crate::{
    core::geo::LatLng,
    layers::base::{Layer, LayerId, LayerInfo, LayerKind, LayerOwner},
};

use crate::prelude::HashMap;

struct LayerEntry {
    layer: Layer,
    owner: Option<LayerOwner>,
}

/// Stores the layers attached to a map, keeps them in stacking order and
/// records which component owns each one.
///
/// The ownership record is what lets callers tell their own layers apart
/// from foreign ones without inspecting rendered output.
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<LayerId, LayerEntry>,
    /// Layer IDs sorted by z-index, insertion order breaking ties
    render_order: Vec<LayerId>,
    next_id: u64,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
            next_id: 1,
        }
    }

    /// Adds a layer and returns its freshly allocated ID
    pub fn add_layer(&mut self, layer: Layer, owner: Option<LayerOwner>) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        let z_index = layer.z_index();

        self.layers.insert(id, LayerEntry { layer, owner });

        // Insert in sorted order by z-index
        let insert_pos = self
            .render_order
            .iter()
            .position(|other| {
                self.layers
                    .get(other)
                    .map(|entry| entry.layer.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, id);
        id
    }

    /// Removes a layer, returning it if it was present
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        self.render_order.retain(|other| *other != id);
        self.layers.remove(&id).map(|entry| entry.layer)
    }

    pub fn get_layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id).map(|entry| &entry.layer)
    }

    pub fn set_position(&mut self, id: LayerId, position: LatLng) -> bool {
        match self.layers.get_mut(&id) {
            Some(entry) => {
                entry.layer.set_position(position);
                true
            }
            None => false,
        }
    }

    pub fn owner(&self, id: LayerId) -> Option<LayerOwner> {
        self.layers.get(&id).and_then(|entry| entry.owner)
    }

    /// Layers tagged with `owner`, in render order
    pub fn owned_by(&self, owner: LayerOwner) -> Vec<LayerId> {
        self.render_order
            .iter()
            .copied()
            .filter(|id| self.owner(*id) == Some(owner))
            .collect()
    }

    /// Snapshot of every layer in render order
    pub fn infos(&self) -> Vec<LayerInfo> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|entry| Self::info(*id, entry)))
            .collect()
    }

    fn info(id: LayerId, entry: &LayerEntry) -> LayerInfo {
        let marker = entry.layer.as_marker();
        LayerInfo {
            id,
            kind: entry.layer.kind(),
            owner: entry.owner,
            position: entry.layer.position(),
            classes: marker.map(|m| m.classes()).unwrap_or_default(),
            image_src: marker.and_then(|m| m.image_src()).map(str::to_string),
            alt: marker.and_then(|m| m.alt()).map(str::to_string),
            background_color: None,
        }
    }

    pub fn count_kind(&self, kind: LayerKind) -> usize {
        self.layers
            .values()
            .filter(|entry| entry.layer.kind() == kind)
            .count()
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}
