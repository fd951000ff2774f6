use crate::{
    core::geo::LatLng,
    layers::{circle::Circle, marker::Marker},
};
use serde::{Deserialize, Serialize};

/// Handle to a layer attached to a map surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Marker,
    Circle,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Marker => write!(f, "marker"),
            LayerKind::Circle => write!(f, "circle"),
        }
    }
}

/// Ownership tag recorded by the map for every layer added through it.
/// Layers added without a tag are foreign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerOwner(pub &'static str);

impl LayerOwner {
    pub const LOCATION_INDICATOR: LayerOwner = LayerOwner("location-indicator");
}

impl std::fmt::Display for LayerOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Anything that can be attached to a map surface
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Marker(Marker),
    Circle(Circle),
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Marker(_) => LayerKind::Marker,
            Layer::Circle(_) => LayerKind::Circle,
        }
    }

    pub fn position(&self) -> LatLng {
        match self {
            Layer::Marker(marker) => marker.position(),
            Layer::Circle(circle) => circle.center(),
        }
    }

    pub fn set_position(&mut self, position: LatLng) {
        match self {
            Layer::Marker(marker) => marker.set_position(position),
            Layer::Circle(circle) => circle.set_center(position),
        }
    }

    pub fn z_index(&self) -> i32 {
        match self {
            Layer::Marker(marker) => marker.z_index_offset(),
            Layer::Circle(_) => 0,
        }
    }

    pub fn as_marker(&self) -> Option<&Marker> {
        match self {
            Layer::Marker(marker) => Some(marker),
            Layer::Circle(_) => None,
        }
    }

    pub fn as_circle(&self) -> Option<&Circle> {
        match self {
            Layer::Circle(circle) => Some(circle),
            Layer::Marker(_) => None,
        }
    }
}

impl From<Marker> for Layer {
    fn from(marker: Marker) -> Self {
        Layer::Marker(marker)
    }
}

impl From<Circle> for Layer {
    fn from(circle: Circle) -> Self {
        Layer::Circle(circle)
    }
}

/// Read-only view of a layer as seen while iterating over a map
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub id: LayerId,
    pub kind: LayerKind,
    pub owner: Option<LayerOwner>,
    pub position: LatLng,
    /// Classes on the rendered element
    pub classes: Vec<String>,
    /// Image source for image-icon markers
    pub image_src: Option<String>,
    pub alt: Option<String>,
    /// Inline background colour, when the surface tracks element styles
    pub background_color: Option<String>,
}

impl LayerInfo {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_owned_by(&self, owner: LayerOwner) -> bool {
        self.owner == Some(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_kind_display() {
        assert_eq!(LayerKind::Marker.to_string(), "marker");
        assert_eq!(LayerKind::Circle.to_string(), "circle");
        assert_eq!(LayerId(4).to_string(), "layer#4");
    }

    #[test]
    fn test_layer_position_round_trip() {
        let mut layer = Layer::from(Circle::new(LatLng::new(1.0, 2.0), 50.0));
        assert_eq!(layer.kind(), LayerKind::Circle);

        layer.set_position(LatLng::new(3.0, 4.0));
        assert_eq!(layer.position(), LatLng::new(3.0, 4.0));
        assert!(layer.as_marker().is_none());
    }
}
