//! The map surface: everything the overlays need from the mapping library
//! and the page it lives in.

pub mod headless;
pub mod style;

use crate::{
    core::geo::{LatLng, Size},
    layers::base::{Layer, LayerId, LayerInfo, LayerOwner},
    surface::style::{StylePatch, StyleProperty},
    Result,
};

/// Addresses page elements the way a CSS selector would
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// The map's rendering container
    Container,
    /// The element wrapping the map container
    ContainerParent,
    /// `#id`
    Id(String),
    /// `.class`, matching page elements and rendered layer elements alike
    Class(String),
    /// The rendered element of one layer
    Layer(LayerId),
}

impl Selector {
    pub fn id(id: impl Into<String>) -> Self {
        Selector::Id(id.into())
    }

    pub fn class(class: impl Into<String>) -> Self {
        Selector::Class(class.into())
    }

    /// Parses `#id` and `.class`; a bare word is taken as a class name.
    pub fn parse(selector: &str) -> Self {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            Selector::id(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            Selector::class(class)
        } else {
            Selector::class(selector)
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Container => write!(f, "<map container>"),
            Selector::ContainerParent => write!(f, "<map container parent>"),
            Selector::Id(id) => write!(f, "#{}", id),
            Selector::Class(class) => write!(f, ".{}", class),
            Selector::Layer(id) => write!(f, "<{}>", id),
        }
    }
}

/// A map display plus the page elements around it.
///
/// Implementations wrap the real mapping library. Every layer added here is
/// recorded with its owner so foreign layers can be told apart without
/// scraping rendered output.
pub trait MapSurface: Send {
    /// Attaches a layer, tagging it with `owner`
    fn add_layer(&mut self, layer: Layer, owner: Option<LayerOwner>) -> Result<LayerId>;

    /// Detaches a layer. Returns false when it was not attached.
    fn remove_layer(&mut self, id: LayerId) -> Result<bool>;

    fn set_layer_position(&mut self, id: LayerId, position: LatLng) -> Result<()>;

    /// Every layer currently on the map, in stacking order
    fn layers(&self) -> Vec<LayerInfo>;

    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()>;

    /// Rendered size of the map container, if it is laid out
    fn container_size(&self) -> Option<Size>;

    /// Applies `patch` to every element matching `selector`; returns the
    /// number of elements touched
    fn apply_style(&mut self, selector: &Selector, patch: &StylePatch) -> Result<usize>;

    /// Inline value of `property` on the first element matching `selector`
    fn inline_style(&self, selector: &Selector, property: StyleProperty) -> Option<String>;

    fn set_text(&mut self, selector: &Selector, text: &str) -> Result<usize>;

    fn set_disabled(&mut self, selector: &Selector, disabled: bool) -> Result<usize>;

    /// Checkbox state of the first matching element; `None` when there is no
    /// such checkbox
    fn is_checked(&self, selector: &Selector) -> Option<bool>;

    fn set_checked(&mut self, selector: &Selector, checked: bool) -> Result<usize>;

    /// True when at least one element matches
    fn contains(&self, selector: &Selector) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parse() {
        assert_eq!(Selector::parse("#track-up-toggle"), Selector::id("track-up-toggle"));
        assert_eq!(Selector::parse(".leaflet-control"), Selector::class("leaflet-control"));
        assert_eq!(Selector::parse(" popup "), Selector::class("popup"));
        assert_eq!(Selector::parse(".leaflet-popup").to_string(), ".leaflet-popup");
    }
}
