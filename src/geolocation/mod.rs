//! Geolocation data model and the provider seam
//!
//! Positions come from the platform (browser, GNSS daemon, simulator) through
//! the [`Geolocation`] trait. Both acquisition paths exist: a one-shot
//! request and a continuous watch delivered as a stream.

pub mod bus;
pub mod simulated;

use crate::{
    constants,
    core::geo::LatLng,
};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// One fix reported by the geolocation provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Degrees clockwise from true north; absent while stationary on most devices
    pub heading: Option<f64>,
    /// Metres per second
    pub speed: Option<f64>,
    /// Radius of uncertainty in metres
    pub accuracy: Option<f64>,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl PositionSample {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            heading: None,
            speed: None,
            accuracy: None,
            timestamp_ms: 0,
        }
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Failure modes reported by a geolocation provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("timed out")]
    Timeout,

    #[error("geolocation not supported")]
    Unsupported,
}

impl GeolocationError {
    /// Numeric code as reported by the W3C Geolocation API (0 when the API
    /// itself is missing)
    pub fn code(self) -> u16 {
        match self {
            GeolocationError::PermissionDenied => 1,
            GeolocationError::PositionUnavailable => 2,
            GeolocationError::Timeout => 3,
            GeolocationError::Unsupported => 0,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeolocationError::PermissionDenied,
            2 => GeolocationError::PositionUnavailable,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::Unsupported,
        }
    }
}

/// Outcome of one delivery from a provider
pub type PositionEvent = std::result::Result<PositionSample, GeolocationError>;

/// Continuous position subscription; dropping it cancels the watch
pub type PositionWatch = BoxStream<'static, PositionEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
}

impl PositionOptions {
    /// Options for the continuous heading watch
    pub fn watch() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: constants::GEOLOCATION_TIMEOUT_MS,
            maximum_age_ms: constants::WATCH_MAXIMUM_AGE_MS,
        }
    }

    /// Options for a one-shot "where am I" request
    pub fn one_shot() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: constants::GEOLOCATION_TIMEOUT_MS,
            maximum_age_ms: constants::ONE_SHOT_MAXIMUM_AGE_MS,
        }
    }
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self::watch()
    }
}

#[async_trait]
pub trait Geolocation: Send + Sync {
    /// Requests a single fix
    async fn current_position(&self, options: &PositionOptions) -> PositionEvent;

    /// Starts a continuous watch
    fn watch_position(&self, options: &PositionOptions) -> PositionWatch;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_round_trip() {
        for error in [
            GeolocationError::PermissionDenied,
            GeolocationError::PositionUnavailable,
            GeolocationError::Timeout,
        ] {
            assert_eq!(GeolocationError::from_code(error.code()), error);
        }
        assert_eq!(GeolocationError::from_code(9), GeolocationError::Unsupported);
    }

    #[test]
    fn test_sample_builder() {
        let sample = PositionSample::new(40.0, -74.0)
            .with_heading(90.0)
            .with_speed(3.0)
            .at(1_700_000_000_000);

        assert_eq!(sample.lat_lng(), LatLng::new(40.0, -74.0));
        assert_eq!(sample.heading, Some(90.0));
        assert_eq!(sample.accuracy, None);
    }
}
