//! # maplet-nav
//!
//! Navigation overlays for maplet map surfaces: a custom "current location"
//! indicator that survives whatever else happens to the map, and a track-up
//! (heading-up) mode that rotates the map frame with the direction of travel
//! while keeping controls upright.
//!
//! The mapping library and the platform geolocation facility are external
//! collaborators, reached through [`MapSurface`] and [`Geolocation`].
//! [`HeadlessMap`] and [`SimulatedGeolocation`] are in-memory implementations
//! used by tests and the demo binary.

pub mod core;
pub mod geolocation;
pub mod indicator;
pub mod layers;
pub mod prelude;
pub mod surface;
pub mod track_up;

#[cfg(feature = "tokio-runtime")]
pub mod driver;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{GeolocationConfig, IndicatorConfig, NavigationConfig, NavigationProfile, TrackUpConfig},
    geo::{LatLng, Point, Size},
    ready::{map_ready, MapReady, MapReadyNotifier, SharedMap},
};

pub use geolocation::{
    bus::{PositionBus, PositionSubscription},
    simulated::SimulatedGeolocation,
    Geolocation, GeolocationError, PositionEvent, PositionOptions, PositionSample, PositionWatch,
};

pub use indicator::{Exemptions, LocationIndicator, SuppressionPolicy};

pub use layers::{
    base::{Layer, LayerId, LayerInfo, LayerKind, LayerOwner},
    circle::{Circle, PathStyle},
    manager::LayerManager,
    marker::{Icon, Marker},
};

pub use surface::{
    headless::HeadlessMap,
    style::{StylePatch, StyleProperty, Transform},
    MapSurface, Selector,
};

pub use track_up::{
    heading::{HeadingState, HeadingUpdate},
    rotation::RotationTransform,
    TrackUpController, TrackUpStatus,
};

#[cfg(feature = "tokio-runtime")]
pub use driver::{Navigation, NavigationHandle};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("Missing element: {0}")]
    MissingElement(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("Map is not available")]
    MapUnavailable,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = NavError;

/// Installs `env_logger` as the `log` backend, honouring `RUST_LOG`.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
