//! Track-up (heading-up) map rotation
//!
//! A two-state machine. In North-Up the map container and chrome carry no
//! transform. In Track-Up the container is rotated by the negated heading
//! and scaled so no blank corners show, chrome is counter-transformed to
//! stay upright, and the driver re-applies the transform on a timer.

pub mod heading;
pub mod rotation;

use crate::{
    core::config::TrackUpConfig,
    geolocation::PositionEvent,
    indicator::Exemptions,
    surface::{
        style::{StylePatch, StyleProperty, Transform},
        MapSurface, Selector,
    },
    Error, Result,
};
use heading::{HeadingState, HeadingUpdate};
use rotation::RotationTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackUpStatus {
    TrackUpActive,
    NorthUp,
    GpsError,
}

impl TrackUpStatus {
    pub fn label(self) -> &'static str {
        match self {
            TrackUpStatus::TrackUpActive => "Track Up Active",
            TrackUpStatus::NorthUp => "North Up",
            TrackUpStatus::GpsError => "GPS Error",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            TrackUpStatus::TrackUpActive => "#2196F3",
            TrackUpStatus::NorthUp => "#666",
            TrackUpStatus::GpsError => "#f44336",
        }
    }

    pub fn font_weight(self) -> &'static str {
        match self {
            TrackUpStatus::TrackUpActive => "bold",
            _ => "normal",
        }
    }
}

impl std::fmt::Display for TrackUpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub struct TrackUpController {
    config: TrackUpConfig,
    state: HeadingState,
    status: TrackUpStatus,
    /// Last transform successfully applied to the container
    applied: Option<RotationTransform>,
}

impl TrackUpController {
    pub fn new(config: TrackUpConfig) -> Self {
        Self {
            config,
            state: HeadingState::new(),
            status: TrackUpStatus::NorthUp,
            applied: None,
        }
    }

    pub fn config(&self) -> &TrackUpConfig {
        &self.config
    }

    /// Checks that the page hosts the track-up panel, checkbox and status
    /// label. A missing element aborts setup of this controller only.
    pub fn attach(&mut self, map: &dyn MapSurface) -> Result<()> {
        let required = [
            Selector::class(self.config.panel_class.as_str()),
            self.toggle_selector(),
            self.status_selector(),
        ];
        for selector in &required {
            if !map.contains(selector) {
                log::error!("❌ Track Up: {} not found, track-up disabled", selector);
                return Err(Error::MissingElement(selector.to_string()));
            }
        }
        log::info!("✅ Track Up: controls attached");
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.state.track_up_enabled()
    }

    pub fn current_heading(&self) -> f64 {
        self.state.current_heading()
    }

    pub fn heading_state(&self) -> &HeadingState {
        &self.state
    }

    pub fn status(&self) -> TrackUpStatus {
        self.status
    }

    /// Transform currently on the container, `None` in North-Up
    pub fn applied_rotation(&self) -> Option<RotationTransform> {
        self.applied
    }

    /// Whether the periodic re-application timer should be running
    pub fn wants_reapply(&self) -> bool {
        self.is_enabled()
    }

    /// Switches between North-Up and Track-Up
    pub fn set_enabled(&mut self, enabled: bool, map: &mut dyn MapSurface, exemptions: &dyn Exemptions) {
        self.state.set_track_up_enabled(enabled);
        if enabled {
            self.set_status(map, TrackUpStatus::TrackUpActive);
            self.update_map_rotation(map, exemptions);
        } else {
            self.set_status(map, TrackUpStatus::NorthUp);
            self.reset_map_rotation(map, exemptions);
        }
        log::info!(
            "🧭 Track Up: Mode {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Flips the checkbox and the mode together. Does nothing if the page
    /// has no checkbox. Returns the new mode.
    pub fn toggle(&mut self, map: &mut dyn MapSurface, exemptions: &dyn Exemptions) -> bool {
        let toggle = self.toggle_selector();
        let Some(checked) = map.is_checked(&toggle) else {
            log::warn!("Track Up: {} is not a checkbox, toggle ignored", toggle);
            return self.is_enabled();
        };
        if let Err(e) = map.set_checked(&toggle, !checked) {
            log::error!("❌ Track Up: failed to flip {}: {}", toggle, e);
            return self.is_enabled();
        }
        self.set_enabled(!checked, map, exemptions);
        self.is_enabled()
    }

    /// `change` handler for the checkbox: adopt whatever it now shows
    pub fn on_toggle_input(&mut self, map: &mut dyn MapSurface, exemptions: &dyn Exemptions) {
        if let Some(checked) = map.is_checked(&self.toggle_selector()) {
            self.set_enabled(checked, map, exemptions);
        }
    }

    /// Feeds one event from the continuous watch.
    ///
    /// The heading state is updated before any rotation that the same
    /// sample triggers.
    pub fn on_position(
        &mut self,
        event: &PositionEvent,
        map: &mut dyn MapSurface,
        exemptions: &dyn Exemptions,
    ) -> Option<HeadingUpdate> {
        match event {
            Ok(sample) => {
                let update = self.state.ingest(sample, self.config.movement_threshold);
                if let HeadingUpdate::Accepted(heading) = update {
                    log::debug!(
                        "🧭 Track Up: Heading updated: {:.1}°, Speed: {} m/s",
                        heading,
                        sample
                            .speed
                            .map(|s| format!("{:.1}", s))
                            .unwrap_or_else(|| "unknown".to_string())
                    );
                }
                if self.is_enabled() && update.triggers_rotation() {
                    self.update_map_rotation(map, exemptions);
                }
                Some(update)
            }
            Err(error) => {
                log::error!("❌ Track Up: Geolocation error: {}", error);
                self.set_status(map, TrackUpStatus::GpsError);
                None
            }
        }
    }

    /// Periodic re-application; a no-op in North-Up
    pub fn tick(&mut self, map: &mut dyn MapSurface, exemptions: &dyn Exemptions) {
        if self.is_enabled() {
            self.update_map_rotation(map, exemptions);
        }
    }

    /// Rotates the container to the current heading. Failures are logged
    /// and the next sample or tick tries again.
    pub fn update_map_rotation(&mut self, map: &mut dyn MapSurface, exemptions: &dyn Exemptions) {
        if !self.is_enabled() {
            return;
        }
        match self.apply_rotation(map, exemptions) {
            Ok(rotation) => {
                log::debug!(
                    "🧭 Track Up: Map rotated to {:.1}° with scale {:.2}",
                    rotation.angle_deg,
                    rotation.scale
                );
                self.applied = Some(rotation);
            }
            Err(e) => log::error!("❌ Track Up: Error updating map rotation: {}", e),
        }
    }

    fn apply_rotation(
        &self,
        map: &mut dyn MapSurface,
        exemptions: &dyn Exemptions,
    ) -> Result<RotationTransform> {
        let size = map
            .container_size()
            .ok_or_else(|| Error::MissingElement(Selector::Container.to_string()))?;
        let rotation = RotationTransform::for_heading(
            self.state.current_heading(),
            size,
            self.config.scale_margin,
        );

        map.apply_style(&Selector::Container, &StylePatch::transform(rotation.transform()))?;
        map.apply_style(
            &Selector::ContainerParent,
            &StylePatch::new()
                .set(StyleProperty::Overflow, "hidden")
                .set(StyleProperty::Position, "relative")
                .set(StyleProperty::ZIndex, "1")
                .set(StyleProperty::BackgroundColor, self.config.backdrop_color.as_str()),
        )?;
        self.counter_rotate(map, rotation.counter(), exemptions)?;
        Ok(rotation)
    }

    /// Returns the container, its parent and all chrome to identity.
    pub fn reset_map_rotation(&mut self, map: &mut dyn MapSurface, exemptions: &dyn Exemptions) {
        match self.clear_rotation(map, exemptions) {
            Ok(()) => {
                self.applied = None;
                log::info!("🧭 Track Up: Map rotation reset to North Up");
            }
            Err(e) => log::error!("❌ Track Up: Error resetting map rotation: {}", e),
        }
    }

    fn clear_rotation(&self, map: &mut dyn MapSurface, exemptions: &dyn Exemptions) -> Result<()> {
        map.apply_style(&Selector::Container, &StylePatch::untransformed())?;
        map.apply_style(
            &Selector::ContainerParent,
            &StylePatch::new()
                .clear(StyleProperty::Overflow)
                .clear(StyleProperty::Position)
                .clear(StyleProperty::ZIndex)
                .clear(StyleProperty::BackgroundColor),
        )?;
        self.counter_rotate(map, Transform::identity(), exemptions)
    }

    /// Applies `counter` to every chrome element, then pins exempt elements
    /// and panels to identity.
    ///
    /// Exemptions are applied last so they win over any chrome selector that
    /// happens to match them too.
    pub fn counter_rotate(
        &self,
        map: &mut dyn MapSurface,
        counter: Transform,
        exemptions: &dyn Exemptions,
    ) -> Result<()> {
        let chrome = StylePatch::transform(counter);
        for selector in &self.config.chrome_selectors {
            map.apply_style(&Selector::parse(selector), &chrome)?;
        }

        let exempt = exemptions.exempt_patch();
        for selector in exemptions.exempt_selectors() {
            map.apply_style(&selector, &exempt)?;
        }

        let pinned = StylePatch::untransformed();
        for selector in &self.config.panel_selectors {
            map.apply_style(&Selector::parse(selector), &pinned)?;
        }
        Ok(())
    }

    fn set_status(&mut self, map: &mut dyn MapSurface, status: TrackUpStatus) {
        self.status = status;
        let selector = self.status_selector();
        let outcome = map.set_text(&selector, status.label()).and_then(|_| {
            map.apply_style(
                &selector,
                &StylePatch::new()
                    .set(StyleProperty::Color, status.color())
                    .set(StyleProperty::FontWeight, status.font_weight()),
            )
        });
        if let Err(e) = outcome {
            log::warn!("Track Up: could not update status label: {}", e);
        }
    }

    /// Leaves track-up and resets the map. Safe to call repeatedly, and
    /// when track-up was never enabled.
    pub fn cleanup(&mut self, map: &mut dyn MapSurface, exemptions: &dyn Exemptions) {
        self.state.set_track_up_enabled(false);
        self.reset_map_rotation(map, exemptions);
    }

    fn toggle_selector(&self) -> Selector {
        Selector::id(self.config.toggle_id.as_str())
    }

    fn status_selector(&self) -> Selector {
        Selector::id(self.config.status_id.as_str())
    }
}

impl Default for TrackUpController {
    fn default() -> Self {
        Self::new(TrackUpConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::{LatLng, Size},
        geolocation::{GeolocationError, PositionSample},
        surface::headless::HeadlessMap,
    };

    fn map() -> HeadlessMap {
        HeadlessMap::new(LatLng::new(37.7749, -122.4194), 12.0, Size::new(800.0, 600.0))
            .with_default_chrome()
            .with_track_up_panel()
    }

    fn heading(h: f64) -> PositionEvent {
        Ok(PositionSample::new(37.7749, -122.4194).with_heading(h).with_speed(4.0))
    }

    #[test]
    fn test_attach_requires_panel_elements() {
        let mut controller = TrackUpController::default();
        assert!(controller.attach(&map()).is_ok());

        let bare = HeadlessMap::new(LatLng::default(), 3.0, Size::new(100.0, 100.0));
        let result = controller.attach(&bare);
        assert!(matches!(result, Err(Error::MissingElement(_))));
    }

    #[test]
    fn test_rotation_follows_heading_only_in_track_up() {
        let mut map = map();
        let mut controller = TrackUpController::default();

        controller.on_position(&heading(45.0), &mut map, &());
        assert_eq!(map.inline_style(&Selector::Container, StyleProperty::Transform), None);

        controller.set_enabled(true, &mut map, &());
        let transform = map
            .inline_style(&Selector::Container, StyleProperty::Transform)
            .unwrap();
        assert!(transform.starts_with("rotate(-45deg) scale("));

        controller.on_position(&heading(180.0), &mut map, &());
        let transform = map
            .inline_style(&Selector::Container, StyleProperty::Transform)
            .unwrap();
        assert!(transform.starts_with("rotate(-180deg) scale("));
        assert_eq!(
            map.inline_style(&Selector::Container, StyleProperty::TransformOrigin),
            Some("center center".to_string())
        );
    }

    #[test]
    fn test_parent_containment_applied_and_cleared() {
        let mut map = map();
        let mut controller = TrackUpController::default();
        controller.set_enabled(true, &mut map, &());

        let parent = |map: &HeadlessMap, property| map.inline_style(&Selector::ContainerParent, property);
        assert_eq!(parent(&map, StyleProperty::Overflow), Some("hidden".to_string()));
        assert_eq!(parent(&map, StyleProperty::Position), Some("relative".to_string()));
        assert_eq!(parent(&map, StyleProperty::ZIndex), Some("1".to_string()));
        assert_eq!(parent(&map, StyleProperty::BackgroundColor), Some("#f0f0f0".to_string()));

        controller.set_enabled(false, &mut map, &());
        assert_eq!(parent(&map, StyleProperty::Overflow), None);
        assert_eq!(parent(&map, StyleProperty::BackgroundColor), None);
    }

    #[test]
    fn test_chrome_counter_rotated_and_panels_pinned() {
        let mut map = map();
        let mut controller = TrackUpController::default();
        controller.on_position(&heading(90.0), &mut map, &());
        controller.set_enabled(true, &mut map, &());

        let scale = controller.applied_rotation().unwrap().scale;
        let expected = Transform::new(90.0, 1.0 / scale).to_css();
        for value in map.styles_of(&Selector::class("leaflet-control"), StyleProperty::Transform) {
            assert_eq!(value, Some(expected.clone()));
        }
        assert_eq!(
            map.inline_style(&Selector::class("track-up-container-compact"), StyleProperty::Transform),
            Some("none".to_string())
        );
        assert_eq!(
            map.inline_style(&Selector::class("controls-compact"), StyleProperty::Transform),
            Some("none".to_string())
        );
    }

    #[test]
    fn test_status_label_styles() {
        let mut map = map();
        let mut controller = TrackUpController::default();
        let status = Selector::id("track-up-status");

        controller.set_enabled(true, &mut map, &());
        assert_eq!(map.text(&status), Some("Track Up Active"));
        assert_eq!(map.inline_style(&status, StyleProperty::Color), Some("#2196F3".to_string()));
        assert_eq!(map.inline_style(&status, StyleProperty::FontWeight), Some("bold".to_string()));

        controller.on_position(&Err(GeolocationError::Timeout), &mut map, &());
        assert_eq!(controller.status(), TrackUpStatus::GpsError);
        assert_eq!(map.text(&status), Some("GPS Error"));
        assert_eq!(map.inline_style(&status, StyleProperty::Color), Some("#f44336".to_string()));

        controller.set_enabled(false, &mut map, &());
        assert_eq!(map.text(&status), Some("North Up"));
        assert_eq!(map.inline_style(&status, StyleProperty::FontWeight), Some("normal".to_string()));
    }

    #[test]
    fn test_missing_container_size_is_logged_not_fatal() {
        let mut map = map();
        map.set_container_size(None);
        let mut controller = TrackUpController::default();

        controller.set_enabled(true, &mut map, &());
        assert!(controller.is_enabled());
        assert!(controller.applied_rotation().is_none());

        map.set_container_size(Some(Size::new(400.0, 400.0)));
        controller.tick(&mut map, &());
        assert!(controller.applied_rotation().is_some());
    }

    #[test]
    fn test_toggle_flips_checkbox() {
        let mut map = map();
        let mut controller = TrackUpController::default();
        let toggle = Selector::id("track-up-toggle");

        assert!(controller.toggle(&mut map, &()));
        assert_eq!(map.is_checked(&toggle), Some(true));
        assert!(!controller.toggle(&mut map, &()));
        assert_eq!(map.is_checked(&toggle), Some(false));

        map.set_checked(&toggle, true).unwrap();
        controller.on_toggle_input(&mut map, &());
        assert!(controller.is_enabled());
    }

    #[test]
    fn test_cleanup_without_activation() {
        let mut map = map();
        let mut controller = TrackUpController::default();
        controller.cleanup(&mut map, &());
        controller.cleanup(&mut map, &());

        assert!(!controller.is_enabled());
        assert_eq!(
            map.inline_style(&Selector::Container, StyleProperty::Transform),
            Some("none".to_string())
        );
    }
}
