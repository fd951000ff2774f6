//! In-memory map surface
//!
//! Holds layers, a container, and a flat list of page elements with inline
//! styles. It renders nothing; tests and the demo inspect its state instead.

use crate::{
    constants,
    core::geo::{LatLng, Size},
    layers::{
        base::{Layer, LayerId, LayerInfo, LayerKind, LayerOwner},
        manager::LayerManager,
    },
    prelude::HashMap,
    surface::{
        style::{StylePatch, StyleProperty},
        MapSurface, Selector,
    },
    Error, Result,
};

type StyleMap = HashMap<StyleProperty, String>;

/// A page element outside the map's layer panes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageElement {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: String,
    pub disabled: bool,
    /// `Some` for checkboxes
    pub checked: Option<bool>,
    style: StyleMap,
}

impl PageElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn checkbox(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Id(id) => self.id.as_deref() == Some(id.as_str()),
            Selector::Class(class) => self.classes.iter().any(|c| c == class),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    Container,
    Parent,
    Element(usize),
    Layer(LayerId),
}

pub struct HeadlessMap {
    layers: LayerManager,
    center: LatLng,
    zoom: f64,
    container_size: Option<Size>,
    container_style: StyleMap,
    parent_style: StyleMap,
    layer_styles: HashMap<LayerId, StyleMap>,
    elements: Vec<PageElement>,
}

impl HeadlessMap {
    pub fn new(center: LatLng, zoom: f64, size: Size) -> Self {
        Self {
            layers: LayerManager::new(),
            center,
            zoom,
            container_size: Some(size),
            container_style: StyleMap::default(),
            parent_style: StyleMap::default(),
            layer_styles: HashMap::default(),
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: PageElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Zoom control and attribution, both `.leaflet-control`
    pub fn with_default_chrome(self) -> Self {
        self.with_element(
            PageElement::new()
                .with_class("leaflet-control")
                .with_class("leaflet-control-zoom"),
        )
        .with_element(
            PageElement::new()
                .with_class("leaflet-control")
                .with_class("leaflet-control-attribution")
                .with_text("© OpenStreetMap contributors"),
        )
    }

    /// The compact controls panel with the track-up checkbox and status label
    pub fn with_track_up_panel(self) -> Self {
        self.with_element(PageElement::new().with_class(constants::CONTROLS_PANEL_CLASS))
            .with_element(PageElement::new().with_class(constants::TRACK_UP_PANEL_CLASS))
            .with_element(
                PageElement::new()
                    .with_id(constants::TRACK_UP_TOGGLE_ID)
                    .checkbox(false),
            )
            .with_element(
                PageElement::new()
                    .with_id(constants::TRACK_UP_STATUS_ID)
                    .with_text("North Up"),
            )
    }

    pub fn with_locate_button(self) -> Self {
        self.with_element(
            PageElement::new()
                .with_id(constants::LOCATE_BUTTON_ID)
                .with_text(constants::LOCATE_BUTTON_LABEL),
        )
    }

    pub fn add_element(&mut self, element: PageElement) {
        self.elements.push(element);
    }

    pub fn set_container_size(&mut self, size: Option<Size>) {
        self.container_size = size;
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn layer_manager(&self) -> &LayerManager {
        &self.layers
    }

    pub fn markers(&self) -> Vec<LayerInfo> {
        self.layers_of(LayerKind::Marker)
    }

    pub fn circles(&self) -> Vec<LayerInfo> {
        self.layers_of(LayerKind::Circle)
    }

    fn layers_of(&self, kind: LayerKind) -> Vec<LayerInfo> {
        self.styled_infos()
            .into_iter()
            .filter(|info| info.kind == kind)
            .collect()
    }

    /// Layer infos with the element's inline background filled in
    fn styled_infos(&self) -> Vec<LayerInfo> {
        let mut infos = self.layers.infos();
        for info in &mut infos {
            info.background_color = self
                .layer_styles
                .get(&info.id)
                .and_then(|style| style.get(&StyleProperty::BackgroundColor))
                .cloned();
        }
        infos
    }

    /// Text of the first element matching `selector`
    pub fn text(&self, selector: &Selector) -> Option<&str> {
        self.first_element(selector).map(|e| e.text.as_str())
    }

    pub fn is_disabled(&self, selector: &Selector) -> Option<bool> {
        self.first_element(selector).map(|e| e.disabled)
    }

    /// All inline styles of every element matching `selector`
    pub fn styles_of(&self, selector: &Selector, property: StyleProperty) -> Vec<Option<String>> {
        self.targets(selector)
            .into_iter()
            .map(|target| {
                self.style_map(target)
                    .and_then(|style| style.get(&property).cloned())
            })
            .collect()
    }

    fn first_element(&self, selector: &Selector) -> Option<&PageElement> {
        self.elements.iter().find(|e| e.matches(selector))
    }

    fn targets(&self, selector: &Selector) -> Vec<Target> {
        match selector {
            Selector::Container => vec![Target::Container],
            Selector::ContainerParent => vec![Target::Parent],
            Selector::Layer(id) => {
                if self.layers.contains(*id) {
                    vec![Target::Layer(*id)]
                } else {
                    Vec::new()
                }
            }
            Selector::Id(_) | Selector::Class(_) => {
                let mut targets: Vec<Target> = self
                    .elements
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.matches(selector))
                    .map(|(index, _)| Target::Element(index))
                    .collect();
                if let Selector::Class(class) = selector {
                    targets.extend(
                        self.layers
                            .infos()
                            .into_iter()
                            .filter(|info| info.has_class(class))
                            .map(|info| Target::Layer(info.id)),
                    );
                }
                targets
            }
        }
    }

    fn style_map(&self, target: Target) -> Option<&StyleMap> {
        match target {
            Target::Container => Some(&self.container_style),
            Target::Parent => Some(&self.parent_style),
            Target::Element(index) => self.elements.get(index).map(|e| &e.style),
            Target::Layer(id) => self.layer_styles.get(&id),
        }
    }

    fn style_map_mut(&mut self, target: Target) -> Option<&mut StyleMap> {
        match target {
            Target::Container => Some(&mut self.container_style),
            Target::Parent => Some(&mut self.parent_style),
            Target::Element(index) => self.elements.get_mut(index).map(|e| &mut e.style),
            Target::Layer(id) => Some(self.layer_styles.entry(id).or_default()),
        }
    }

    fn for_each_element<F>(&mut self, selector: &Selector, mut f: F) -> usize
    where
        F: FnMut(&mut PageElement),
    {
        let mut touched = 0;
        for element in self.elements.iter_mut().filter(|e| e.matches(selector)) {
            f(element);
            touched += 1;
        }
        touched
    }
}

impl MapSurface for HeadlessMap {
    fn add_layer(&mut self, layer: Layer, owner: Option<LayerOwner>) -> Result<LayerId> {
        let position = layer.position();
        if !position.is_valid() {
            return Err(Error::InvalidCoordinates(position.to_string()));
        }
        Ok(self.layers.add_layer(layer, owner))
    }

    fn remove_layer(&mut self, id: LayerId) -> Result<bool> {
        self.layer_styles.remove(&id);
        Ok(self.layers.remove_layer(id).is_some())
    }

    fn set_layer_position(&mut self, id: LayerId, position: LatLng) -> Result<()> {
        if !position.is_valid() {
            return Err(Error::InvalidCoordinates(position.to_string()));
        }
        if self.layers.set_position(id, position) {
            Ok(())
        } else {
            Err(Error::LayerNotFound(id))
        }
    }

    fn layers(&self) -> Vec<LayerInfo> {
        self.styled_infos()
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        if !center.is_valid() {
            return Err(Error::InvalidCoordinates(center.to_string()));
        }
        self.center = center;
        self.zoom = zoom;
        Ok(())
    }

    fn container_size(&self) -> Option<Size> {
        self.container_size
    }

    fn apply_style(&mut self, selector: &Selector, patch: &StylePatch) -> Result<usize> {
        let targets = self.targets(selector);
        for target in &targets {
            if let Some(style) = self.style_map_mut(*target) {
                for (property, value) in patch.entries() {
                    match value {
                        Some(value) => {
                            style.insert(*property, value.clone());
                        }
                        None => {
                            style.remove(property);
                        }
                    }
                }
            }
        }
        Ok(targets.len())
    }

    fn inline_style(&self, selector: &Selector, property: StyleProperty) -> Option<String> {
        self.targets(selector)
            .into_iter()
            .next()
            .and_then(|target| self.style_map(target))
            .and_then(|style| style.get(&property).cloned())
    }

    fn set_text(&mut self, selector: &Selector, text: &str) -> Result<usize> {
        Ok(self.for_each_element(selector, |e| e.text = text.to_string()))
    }

    fn set_disabled(&mut self, selector: &Selector, disabled: bool) -> Result<usize> {
        Ok(self.for_each_element(selector, |e| e.disabled = disabled))
    }

    fn is_checked(&self, selector: &Selector) -> Option<bool> {
        self.elements
            .iter()
            .find(|e| e.matches(selector) && e.checked.is_some())
            .and_then(|e| e.checked)
    }

    fn set_checked(&mut self, selector: &Selector, checked: bool) -> Result<usize> {
        Ok(self.for_each_element(selector, |e| {
            if e.checked.is_some() {
                e.checked = Some(checked);
            }
        }))
    }

    fn contains(&self, selector: &Selector) -> bool {
        !self.targets(selector).is_empty()
    }
}
