//! Custom "current location" indicator
//!
//! Owns one marker + accuracy circle pair, scrubs foreign location markers
//! off the map, and tells the rotation controller which elements it must
//! leave untransformed.

use crate::{
    core::{config::IndicatorConfig, geo::LatLng},
    geolocation::{GeolocationError, PositionSample},
    layers::{
        base::{LayerId, LayerInfo, LayerKind, LayerOwner},
        circle::{Circle, PathStyle},
        marker::{Icon, Marker},
    },
    surface::{
        style::{strip_rotation, StylePatch, StyleProperty},
        MapSurface, Selector,
    },
    Error, Result,
};
use std::sync::Arc;

/// Decides which foreign markers count as "default location markers"
#[derive(Clone)]
pub enum SuppressionPolicy {
    /// Every marker this indicator does not own
    Unowned,
    /// Keyword match on image source, alt text, classes and a blue fill
    Heuristic,
    /// Caller-supplied predicate
    Custom(Arc<dyn Fn(&LayerInfo) -> bool + Send + Sync>),
}

impl SuppressionPolicy {
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&LayerInfo) -> bool + Send + Sync + 'static,
    {
        SuppressionPolicy::Custom(Arc::new(predicate))
    }

    fn matches(&self, layer: &LayerInfo) -> bool {
        match self {
            SuppressionPolicy::Unowned => true,
            SuppressionPolicy::Heuristic => looks_like_location_marker(layer),
            SuppressionPolicy::Custom(predicate) => predicate(layer),
        }
    }
}

impl Default for SuppressionPolicy {
    fn default() -> Self {
        SuppressionPolicy::Unowned
    }
}

impl std::fmt::Debug for SuppressionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuppressionPolicy::Unowned => write!(f, "Unowned"),
            SuppressionPolicy::Heuristic => write!(f, "Heuristic"),
            SuppressionPolicy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Stock location markers: an arrow image, "location" alt text, a
/// user-location class, or the plain blue dot some locate plugins draw
pub fn looks_like_location_marker(layer: &LayerInfo) -> bool {
    layer
        .image_src
        .as_deref()
        .is_some_and(|src| src.contains("arrow"))
        || layer
            .alt
            .as_deref()
            .is_some_and(|alt| alt.contains("location"))
        || layer.classes.iter().any(|c| c.contains("user-location"))
        || layer
            .background_color
            .as_deref()
            .is_some_and(|color| color.trim().eq_ignore_ascii_case("blue"))
}

/// Elements a transform pass must pin to identity, and how
pub trait Exemptions {
    fn exempt_selectors(&self) -> Vec<Selector>;

    /// Style forced onto every exempt element
    fn exempt_patch(&self) -> StylePatch {
        StylePatch::untransformed()
    }
}

/// Exempts nothing
impl Exemptions for () {
    fn exempt_selectors(&self) -> Vec<Selector> {
        Vec::new()
    }
}

pub struct LocationIndicator {
    config: IndicatorConfig,
    policy: SuppressionPolicy,
    marker: Option<LayerId>,
    circle: Option<LayerId>,
    position: Option<LatLng>,
}

impl LocationIndicator {
    pub fn new(config: IndicatorConfig) -> Self {
        Self {
            config,
            policy: SuppressionPolicy::default(),
            marker: None,
            circle: None,
            position: None,
        }
    }

    pub fn with_policy(mut self, policy: SuppressionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn exists(&self) -> bool {
        self.marker.is_some() || self.circle.is_some()
    }

    pub fn marker_id(&self) -> Option<LayerId> {
        self.marker
    }

    pub fn circle_id(&self) -> Option<LayerId> {
        self.circle
    }

    pub fn position(&self) -> Option<LatLng> {
        self.position
    }

    /// Replaces any existing indicator with a fresh marker and circle at
    /// `position`.
    pub fn create(
        &mut self,
        map: &mut dyn MapSurface,
        position: LatLng,
        heading: Option<f64>,
    ) -> Result<()> {
        if !position.is_valid() {
            return Err(Error::InvalidCoordinates(position.to_string()));
        }
        self.remove(map)?;

        let owner = Some(LayerOwner::LOCATION_INDICATOR);
        let marker = map.add_layer(self.build_marker(position).into(), owner)?;
        self.marker = Some(marker);
        self.position = Some(position);

        let circle = map.add_layer(self.build_circle(position).into(), owner)?;
        self.circle = Some(circle);

        map.apply_style(
            &Selector::Layer(marker),
            &StylePatch::new()
                .set(StyleProperty::ZIndex, self.config.z_index.to_string())
                .set(StyleProperty::Position, "relative"),
        )?;

        log::info!(
            "🎯 Location indicator created at {} (heading {:?})",
            position,
            heading
        );
        Ok(())
    }

    /// Moves the existing pair without recreating it. Returns false when
    /// there is no indicator to move.
    pub fn update(&mut self, map: &mut dyn MapSurface, position: LatLng) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        if !position.is_valid() {
            return Err(Error::InvalidCoordinates(position.to_string()));
        }
        if let Some(marker) = self.marker {
            map.set_layer_position(marker, position)?;
        }
        if let Some(circle) = self.circle {
            map.set_layer_position(circle, position)?;
        }
        self.position = Some(position);
        log::debug!("🎯 Location indicator moved to {}", position);
        Ok(true)
    }

    /// Detaches both layers. Safe to call when nothing is attached.
    pub fn remove(&mut self, map: &mut dyn MapSurface) -> Result<()> {
        if let Some(marker) = self.marker.take() {
            map.remove_layer(marker)?;
        }
        if let Some(circle) = self.circle.take() {
            map.remove_layer(circle)?;
        }
        self.position = None;
        Ok(())
    }

    /// Removes foreign markers the suppression policy flags. Returns how
    /// many were removed.
    pub fn suppress_default_markers(&self, map: &mut dyn MapSurface) -> Result<usize> {
        let doomed: Vec<LayerId> = map
            .layers()
            .into_iter()
            .filter(|layer| layer.kind == LayerKind::Marker)
            .filter(|layer| !self.owns(layer))
            .filter(|layer| self.policy.matches(layer))
            .map(|layer| layer.id)
            .collect();

        let mut removed = 0;
        for id in doomed {
            if map.remove_layer(id)? {
                log::debug!("🗑️ Removed default location marker {}", id);
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn owns(&self, layer: &LayerInfo) -> bool {
        layer.is_owned_by(LayerOwner::LOCATION_INDICATOR)
            || Some(layer.id) == self.marker
            || Some(layer.id) == self.circle
            || layer.has_class(&self.config.icon_class)
    }

    /// Forces the marker element visible and strips any rotation from its
    /// inline transform. Returns false when there is no marker.
    pub fn reassert_visibility(&self, map: &mut dyn MapSurface) -> Result<bool> {
        let Some(marker) = self.marker else {
            return Ok(false);
        };
        let selector = Selector::Layer(marker);

        let mut patch = self.visibility_patch();
        if let Some(transform) = map.inline_style(&selector, StyleProperty::Transform) {
            if transform.contains("rotate(") {
                let stripped = strip_rotation(&transform);
                patch = if stripped.is_empty() {
                    patch.clear(StyleProperty::Transform)
                } else {
                    patch.set(StyleProperty::Transform, stripped)
                };
            }
        }
        map.apply_style(&selector, &patch)?;
        Ok(true)
    }

    fn visibility_patch(&self) -> StylePatch {
        StylePatch::new()
            .set(StyleProperty::Visibility, "visible")
            .set(StyleProperty::Opacity, "1")
            .set(StyleProperty::Display, "block")
            .set(StyleProperty::ZIndex, self.config.z_index.to_string())
    }

    /// Position-success listener: scrub foreign markers, then move the
    /// indicator, creating it on the first fix or after its layers were
    /// removed from under it.
    pub fn on_position(&mut self, map: &mut dyn MapSurface, sample: &PositionSample) -> Result<()> {
        self.suppress_default_markers(map)?;
        let position = sample.lat_lng();
        if self.is_detached(map) {
            log::warn!("⚠️ Location indicator layers were removed, recreating");
            self.remove(map)?;
        }
        if !self.update(map, position)? {
            self.create(map, position, sample.heading)?;
        }
        Ok(())
    }

    /// True when a layer this indicator holds is no longer on the map
    fn is_detached(&self, map: &dyn MapSurface) -> bool {
        [self.marker, self.circle]
            .into_iter()
            .flatten()
            .any(|id| !map.contains(&Selector::Layer(id)))
    }

    /// Disables the locate button while a one-shot request is in flight
    pub fn begin_locate(&self, map: &mut dyn MapSurface) -> Result<()> {
        map.set_disabled(&self.locate_button(), true)?;
        Ok(())
    }

    /// Completes a one-shot request: centre the map on the fix, place the
    /// indicator, restore the button.
    pub fn finish_locate(&mut self, map: &mut dyn MapSurface, sample: &PositionSample) -> Result<()> {
        let outcome = self.place_locate_fix(map, sample);
        self.restore_locate_button(map)?;
        outcome
    }

    fn place_locate_fix(&mut self, map: &mut dyn MapSurface, sample: &PositionSample) -> Result<()> {
        self.suppress_default_markers(map)?;
        let position = sample.lat_lng();
        map.set_view(position, self.config.locate_zoom)?;
        self.create(map, position, sample.heading)
    }

    /// A one-shot request failed; the button comes back either way
    pub fn fail_locate(&self, map: &mut dyn MapSurface, error: GeolocationError) -> Result<()> {
        log::error!("❌ Geolocation error: {} (code {})", error, error.code());
        self.restore_locate_button(map)
    }

    /// Re-enables the locate button and restores its label
    pub fn restore_locate_button(&self, map: &mut dyn MapSurface) -> Result<()> {
        let button = self.locate_button();
        map.set_text(&button, &self.config.locate_button_label)?;
        map.set_disabled(&button, false)?;
        Ok(())
    }

    fn locate_button(&self) -> Selector {
        Selector::id(self.config.locate_button_id.as_str())
    }

    fn build_marker(&self, position: LatLng) -> Marker {
        let config = &self.config;
        let html = format!(
            concat!(
                "<div style=\"width: {size}px; height: {size}px; background: {color}; ",
                "border: {border}px solid #FFFFFF; border-radius: 50%; ",
                "box-shadow: 0 0 10px rgba(255, 68, 68, 0.8); position: relative; z-index: {z};\">",
                "<div style=\"width: 8px; height: 8px; background: #FFFFFF; border-radius: 50%; ",
                "position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%);\"></div>",
                "</div>"
            ),
            size = config.glyph_size_px,
            color = config.color,
            border = config.border_px,
            z = config.z_index,
        );

        Marker::new(position)
            .with_icon(Icon::Div {
                class_name: config.icon_class.clone(),
                html,
                size: config.icon_size,
                anchor: config.icon_anchor,
            })
            .with_z_index_offset(config.z_index)
            .with_class(config.element_class.clone())
    }

    fn build_circle(&self, position: LatLng) -> Circle {
        Circle::new(position, self.config.accuracy_radius).with_style(PathStyle {
            color: self.config.color.clone(),
            weight: 2.0,
            opacity: 0.3,
            fill_color: self.config.color.clone(),
            fill_opacity: 0.1,
        })
    }
}

impl Default for LocationIndicator {
    fn default() -> Self {
        Self::new(IndicatorConfig::default())
    }
}

impl Exemptions for LocationIndicator {
    fn exempt_selectors(&self) -> Vec<Selector> {
        let mut selectors = vec![
            Selector::class(self.config.icon_class.as_str()),
            Selector::class(self.config.element_class.as_str()),
        ];
        if let Some(marker) = self.marker {
            selectors.push(Selector::Layer(marker));
        }
        selectors
    }

    fn exempt_patch(&self) -> StylePatch {
        self.visibility_patch().set(StyleProperty::Transform, "none")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::geo::Size, surface::headless::HeadlessMap};

    fn map() -> HeadlessMap {
        HeadlessMap::new(LatLng::new(40.0, -74.0), 14.0, Size::new(800.0, 600.0))
            .with_locate_button()
    }

    fn arrow_marker() -> Marker {
        Marker::new(LatLng::new(40.0, -74.0))
            .with_icon(Icon::Image {
                url: "img/location-arrow.png".to_string(),
                size: (32, 32),
                anchor: (16, 16),
            })
            .with_alt("Your location")
    }

    #[test]
    fn test_create_tags_marker_for_exemption() {
        let mut map = map();
        let mut indicator = LocationIndicator::default();
        indicator.create(&mut map, LatLng::new(40.0, -74.0), None).unwrap();

        let marker = map.markers().pop().unwrap();
        assert!(marker.has_class("custom-location-indicator"));
        assert!(marker.has_class("custom-user-location"));
        assert!(marker.is_owned_by(LayerOwner::LOCATION_INDICATOR));
        assert_eq!(
            map.inline_style(&Selector::Layer(marker.id), StyleProperty::ZIndex),
            Some("1000".to_string())
        );

        let circle = map.layer_manager().get_layer(indicator.circle_id().unwrap()).unwrap();
        assert_eq!(circle.as_circle().unwrap().radius(), 50.0);
    }

    #[test]
    fn test_update_without_indicator_is_noop() {
        let mut map = map();
        let mut indicator = LocationIndicator::default();
        assert!(!indicator.update(&mut map, LatLng::new(1.0, 1.0)).unwrap());
        assert!(map.layers().is_empty());
    }

    #[test]
    fn test_invalid_position_rejected_before_teardown() {
        let mut map = map();
        let mut indicator = LocationIndicator::default();
        indicator.create(&mut map, LatLng::new(40.0, -74.0), None).unwrap();

        let result = indicator.create(&mut map, LatLng::new(f64::NAN, 0.0), None);
        assert!(matches!(result, Err(Error::InvalidCoordinates(_))));
        assert!(indicator.exists());
        assert_eq!(map.layers().len(), 2);
    }

    #[test]
    fn test_heuristic_policy_spares_unrelated_markers() {
        let mut map = map();
        map.add_layer(arrow_marker().into(), None).unwrap();
        let poi = map
            .add_layer(Marker::new(LatLng::new(40.1, -74.1)).with_alt("Coffee").into(), None)
            .unwrap();

        let indicator = LocationIndicator::default().with_policy(SuppressionPolicy::Heuristic);
        assert_eq!(indicator.suppress_default_markers(&mut map).unwrap(), 1);

        let remaining: Vec<LayerId> = map.markers().iter().map(|m| m.id).collect();
        assert_eq!(remaining, vec![poi]);
    }

    #[test]
    fn test_heuristic_policy_removes_blue_dot() {
        let mut map = map();
        let dot = map
            .add_layer(Marker::new(LatLng::new(40.0, -74.0)).into(), None)
            .unwrap();
        map.apply_style(
            &Selector::Layer(dot),
            &StylePatch::new().set(StyleProperty::BackgroundColor, "blue"),
        )
        .unwrap();
        let teal = map
            .add_layer(Marker::new(LatLng::new(40.1, -74.1)).into(), None)
            .unwrap();
        map.apply_style(
            &Selector::Layer(teal),
            &StylePatch::new().set(StyleProperty::BackgroundColor, "teal"),
        )
        .unwrap();

        let indicator = LocationIndicator::default().with_policy(SuppressionPolicy::Heuristic);
        assert_eq!(indicator.suppress_default_markers(&mut map).unwrap(), 1);

        let remaining: Vec<LayerId> = map.markers().iter().map(|m| m.id).collect();
        assert_eq!(remaining, vec![teal]);
    }

    #[test]
    fn test_heuristic_policy_spares_indicator_icon_class() {
        let mut map = map();
        let styled = map
            .add_layer(
                arrow_marker()
                    .with_class(crate::constants::INDICATOR_ICON_CLASS)
                    .into(),
                None,
            )
            .unwrap();

        let indicator = LocationIndicator::default().with_policy(SuppressionPolicy::Heuristic);
        assert_eq!(indicator.suppress_default_markers(&mut map).unwrap(), 0);

        let markers = map.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, styled);
        assert!(markers[0].owner.is_none());
    }

    #[test]
    fn test_position_fix_recreates_externally_removed_layers() {
        let mut map = map();
        let mut indicator = LocationIndicator::default();
        indicator.create(&mut map, LatLng::new(40.0, -74.0), None).unwrap();

        // Another script clears the map out from under the indicator
        for layer in map.layers() {
            map.remove_layer(layer.id).unwrap();
        }
        assert!(indicator.exists());

        for _ in 0..2 {
            indicator
                .on_position(&mut map, &PositionSample::new(40.1, -74.1))
                .unwrap();
        }

        assert!(indicator.exists());
        assert_eq!(indicator.position(), Some(LatLng::new(40.1, -74.1)));
        let markers = map.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, indicator.marker_id().unwrap());
        assert_eq!(markers[0].position, LatLng::new(40.1, -74.1));
        assert_eq!(map.circles().len(), 1);
        assert_eq!(map.circles()[0].position, LatLng::new(40.1, -74.1));
    }

    #[test]
    fn test_position_fix_recreates_when_only_circle_is_gone() {
        let mut map = map();
        let mut indicator = LocationIndicator::default();
        indicator.create(&mut map, LatLng::new(40.0, -74.0), None).unwrap();
        map.remove_layer(indicator.circle_id().unwrap()).unwrap();

        indicator
            .on_position(&mut map, &PositionSample::new(40.2, -74.2))
            .unwrap();

        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.circles().len(), 1);
        assert_eq!(map.circles()[0].id, indicator.circle_id().unwrap());
    }

    #[test]
    fn test_custom_policy() {
        let mut map = map();
        map.add_layer(arrow_marker().into(), None).unwrap();
        map.add_layer(Marker::new(LatLng::new(40.1, -74.1)).with_class("blue-dot").into(), None)
            .unwrap();

        let indicator = LocationIndicator::default()
            .with_policy(SuppressionPolicy::custom(|layer| layer.has_class("blue-dot")));
        assert_eq!(indicator.suppress_default_markers(&mut map).unwrap(), 1);
        assert_eq!(map.markers().len(), 1);
        assert!(map.markers()[0].image_src.is_some());
    }

    #[test]
    fn test_suppression_never_touches_circles_or_own_layers() {
        let mut map = map();
        map.add_layer(Circle::new(LatLng::new(40.0, -74.0), 10.0).into(), None)
            .unwrap();
        let mut indicator = LocationIndicator::default();
        indicator.create(&mut map, LatLng::new(40.0, -74.0), None).unwrap();

        assert_eq!(indicator.suppress_default_markers(&mut map).unwrap(), 0);
        assert_eq!(map.layers().len(), 3);
    }

    #[test]
    fn test_reassert_strips_rotation() {
        let mut map = map();
        let mut indicator = LocationIndicator::default();
        assert!(!indicator.reassert_visibility(&mut map).unwrap());

        indicator.create(&mut map, LatLng::new(40.0, -74.0), None).unwrap();
        let selector = Selector::Layer(indicator.marker_id().unwrap());
        map.apply_style(
            &selector,
            &StylePatch::new()
                .set(StyleProperty::Transform, "translate3d(5px, 6px, 0px) rotate(30deg)")
                .set(StyleProperty::Visibility, "hidden")
                .set(StyleProperty::Opacity, "0"),
        )
        .unwrap();

        assert!(indicator.reassert_visibility(&mut map).unwrap());
        assert_eq!(
            map.inline_style(&selector, StyleProperty::Transform),
            Some("translate3d(5px, 6px, 0px)".to_string())
        );
        assert_eq!(
            map.inline_style(&selector, StyleProperty::Visibility),
            Some("visible".to_string())
        );
        assert_eq!(map.inline_style(&selector, StyleProperty::Opacity), Some("1".to_string()));
        assert_eq!(
            map.inline_style(&selector, StyleProperty::Display),
            Some("block".to_string())
        );
    }

    #[test]
    fn test_locate_flow_centres_map_and_restores_button() {
        let mut map = map();
        let button = Selector::id("track-location-btn");
        map.set_text(&button, "Locating...").unwrap();
        let mut indicator = LocationIndicator::default();

        indicator.begin_locate(&mut map).unwrap();
        assert_eq!(map.is_disabled(&button), Some(true));

        indicator
            .finish_locate(&mut map, &PositionSample::new(51.5, -0.12))
            .unwrap();
        assert_eq!(map.center(), LatLng::new(51.5, -0.12));
        assert_eq!(map.zoom(), 16.0);
        assert_eq!(map.is_disabled(&button), Some(false));
        assert_eq!(map.text(&button), Some("📍 Where Am I"));
        assert_eq!(indicator.position(), Some(LatLng::new(51.5, -0.12)));
    }

    #[test]
    fn test_failed_locate_restores_button() {
        let mut map = map();
        let button = Selector::id("track-location-btn");
        let indicator = LocationIndicator::default();

        indicator.begin_locate(&mut map).unwrap();
        indicator
            .fail_locate(&mut map, GeolocationError::PermissionDenied)
            .unwrap();
        assert_eq!(map.is_disabled(&button), Some(false));
        assert!(!indicator.exists());
    }
}
