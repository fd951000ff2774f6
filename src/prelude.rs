//! Prelude module for common maplet-nav types and traits
//!
//! Re-exports the most commonly used types so applications can write
//! `use maplet_nav::prelude::*;`

pub use crate::core::{
    config::{GeolocationConfig, IndicatorConfig, NavigationConfig, NavigationProfile, TrackUpConfig},
    geo::{LatLng, Point, Size},
    ready::{map_ready, MapReady, MapReadyNotifier, SharedMap},
};

pub use crate::geolocation::{
    bus::PositionBus, simulated::SimulatedGeolocation, Geolocation, GeolocationError,
    PositionEvent, PositionOptions, PositionSample,
};

pub use crate::indicator::{Exemptions, LocationIndicator, SuppressionPolicy};

pub use crate::layers::{
    base::{Layer, LayerId, LayerInfo, LayerKind, LayerOwner},
    circle::Circle,
    marker::{Icon, Marker},
};

pub use crate::surface::{
    headless::HeadlessMap,
    style::{StylePatch, StyleProperty, Transform},
    MapSurface, Selector,
};

pub use crate::track_up::{TrackUpController, TrackUpStatus};

#[cfg(feature = "tokio-runtime")]
pub use crate::driver::{Navigation, NavigationHandle};

pub use crate::{Error as NavError, Result};

pub use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
