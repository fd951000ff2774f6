//! Configuration for the navigation overlays
//!
//! Mirrors the map performance profiles: a preset enum resolves to a full
//! options struct, and every section can also be loaded from JSON with
//! missing fields falling back to their defaults.

use crate::{constants, geolocation::PositionOptions, Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationProfile {
    Balanced,
    BatterySaver,
    Responsive,
    Custom(NavigationConfig),
}

impl NavigationProfile {
    pub fn resolve(&self) -> NavigationConfig {
        match self {
            Self::Balanced => NavigationConfig::default(),
            Self::BatterySaver => NavigationConfig {
                track_up: TrackUpConfig {
                    reapply_interval_ms: 3_000,
                    ..TrackUpConfig::default()
                },
                geolocation: GeolocationConfig {
                    watch: PositionOptions {
                        enable_high_accuracy: false,
                        timeout_ms: constants::GEOLOCATION_TIMEOUT_MS,
                        maximum_age_ms: 5_000,
                    },
                    ..GeolocationConfig::default()
                },
                ..NavigationConfig::default()
            },
            Self::Responsive => NavigationConfig {
                track_up: TrackUpConfig {
                    reapply_interval_ms: 500,
                    ..TrackUpConfig::default()
                },
                geolocation: GeolocationConfig {
                    watch: PositionOptions {
                        enable_high_accuracy: true,
                        timeout_ms: constants::GEOLOCATION_TIMEOUT_MS,
                        maximum_age_ms: 0,
                    },
                    ..GeolocationConfig::default()
                },
                ..NavigationConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

impl Default for NavigationProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub indicator: IndicatorConfig,
    pub track_up: TrackUpConfig,
    pub geolocation: GeolocationConfig,
}

impl NavigationConfig {
    /// Parses a (possibly partial) JSON document and validates the result.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let indicator = &self.indicator;
        if !(indicator.accuracy_radius.is_finite() && indicator.accuracy_radius > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "accuracy_radius must be positive, got {}",
                indicator.accuracy_radius
            )));
        }
        if indicator.icon_class.is_empty() || indicator.element_class.is_empty() {
            return Err(Error::InvalidConfig(
                "indicator classes must not be empty".to_string(),
            ));
        }
        if indicator.reassert_interval_ms == Some(0) {
            return Err(Error::InvalidConfig(
                "reassert_interval_ms must be positive when set".to_string(),
            ));
        }

        let track_up = &self.track_up;
        if !(track_up.movement_threshold.is_finite() && track_up.movement_threshold >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "movement_threshold must be non-negative, got {}",
                track_up.movement_threshold
            )));
        }
        // Anything below 1.0 would expose blank corners at 45°.
        if !(track_up.scale_margin.is_finite() && track_up.scale_margin >= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "scale_margin must be at least 1.0, got {}",
                track_up.scale_margin
            )));
        }
        if track_up.reapply_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "reapply_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Appearance and behaviour of the custom location indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub glyph_size_px: u32,
    pub border_px: u32,
    pub icon_size: (u32, u32),
    pub icon_anchor: (u32, u32),
    pub color: String,
    pub z_index: i32,
    /// Accuracy circle radius in metres
    pub accuracy_radius: f64,
    pub icon_class: String,
    pub element_class: String,
    pub suppression_delay_ms: u64,
    /// Periodic visibility reassertion. Track-up already restores the marker
    /// on every reapply tick, so this mainly covers North-Up; `None` turns it off.
    pub reassert_interval_ms: Option<u64>,
    /// Move the indicator with the continuous watch as well as with host fixes
    pub follow_watch: bool,
    pub locate_zoom: f64,
    pub locate_button_id: String,
    pub locate_button_label: String,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            glyph_size_px: constants::INDICATOR_GLYPH_PX,
            border_px: constants::INDICATOR_BORDER_PX,
            icon_size: constants::INDICATOR_ICON_SIZE,
            icon_anchor: constants::INDICATOR_ICON_ANCHOR,
            color: constants::INDICATOR_COLOR.to_string(),
            z_index: constants::INDICATOR_Z_INDEX,
            accuracy_radius: constants::ACCURACY_RADIUS_M,
            icon_class: constants::INDICATOR_ICON_CLASS.to_string(),
            element_class: constants::INDICATOR_ELEMENT_CLASS.to_string(),
            suppression_delay_ms: constants::SUPPRESSION_DELAY_MS,
            reassert_interval_ms: Some(constants::REASSERT_INTERVAL_MS),
            follow_watch: true,
            locate_zoom: constants::LOCATE_ZOOM,
            locate_button_id: constants::LOCATE_BUTTON_ID.to_string(),
            locate_button_label: constants::LOCATE_BUTTON_LABEL.to_string(),
        }
    }
}

/// Track-up rotation tuning and the page elements it drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackUpConfig {
    pub movement_threshold: f64,
    pub scale_margin: f64,
    pub reapply_interval_ms: u64,
    pub chrome_selectors: Vec<String>,
    pub panel_selectors: Vec<String>,
    pub panel_class: String,
    pub toggle_id: String,
    pub status_id: String,
    pub backdrop_color: String,
}

impl Default for TrackUpConfig {
    fn default() -> Self {
        Self {
            movement_threshold: constants::MOVEMENT_SPEED_THRESHOLD,
            scale_margin: constants::ROTATION_SCALE_MARGIN,
            reapply_interval_ms: constants::REAPPLY_INTERVAL_MS,
            chrome_selectors: constants::CHROME_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            panel_selectors: constants::PANEL_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            panel_class: constants::TRACK_UP_PANEL_CLASS.to_string(),
            toggle_id: constants::TRACK_UP_TOGGLE_ID.to_string(),
            status_id: constants::TRACK_UP_STATUS_ID.to_string(),
            backdrop_color: constants::MAP_BACKDROP_COLOR.to_string(),
        }
    }
}

/// Geolocation request options for the two acquisition paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub watch: PositionOptions,
    pub one_shot: PositionOptions,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            watch: PositionOptions::watch(),
            one_shot: PositionOptions::one_shot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = NavigationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.indicator.accuracy_radius, 50.0);
        assert_eq!(config.track_up.scale_margin, 1.2);
        assert_eq!(config.geolocation.watch.maximum_age_ms, 1_000);
        assert_eq!(config.geolocation.one_shot.maximum_age_ms, 60_000);
    }

    #[test]
    fn test_visibility_reassertion_on_by_default() {
        let config = NavigationConfig::default();
        assert_eq!(config.indicator.reassert_interval_ms, Some(1000));

        let off = NavigationConfig::from_json_str(r#"{ "indicator": { "reassert_interval_ms": null } }"#)
            .unwrap();
        assert_eq!(off.indicator.reassert_interval_ms, None);
        assert!(off.validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = NavigationConfig::from_json_str(
            r##"{ "track_up": { "reapply_interval_ms": 250 }, "indicator": { "color": "#00AAFF" } }"##,
        )
        .unwrap();

        assert_eq!(config.track_up.reapply_interval_ms, 250);
        assert_eq!(config.track_up.movement_threshold, 0.5);
        assert_eq!(config.indicator.color, "#00AAFF");
        assert_eq!(config.indicator.icon_class, "custom-location-indicator");
    }

    #[test]
    fn test_invalid_scale_margin_rejected() {
        let result = NavigationConfig::from_json_str(r#"{ "track_up": { "scale_margin": 0.9 } }"#);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let result = NavigationConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_profiles_resolve() {
        let saver = NavigationProfile::BatterySaver.resolve();
        assert_eq!(saver.track_up.reapply_interval_ms, 3_000);
        assert!(!saver.geolocation.watch.enable_high_accuracy);

        let responsive = NavigationProfile::Responsive.resolve();
        assert_eq!(responsive.track_up.reapply_interval_ms, 500);

        let custom = NavigationProfile::Custom(saver.clone()).resolve();
        assert_eq!(custom, saver);
        assert_eq!(NavigationProfile::default().resolve(), NavigationConfig::default());
    }
}
