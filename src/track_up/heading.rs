use crate::geolocation::PositionSample;
use serde::{Deserialize, Serialize};

/// What a sample did to the heading state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingUpdate {
    /// A motion-derived heading was taken over
    Accepted(f64),
    /// The sample carried no usable heading; the last valid one stands in
    Fallback(f64),
    /// A heading was reported while stationary and ignored
    Stationary,
}

impl HeadingUpdate {
    /// Whether the map should be re-rotated after this sample
    pub fn triggers_rotation(&self) -> bool {
        !matches!(self, HeadingUpdate::Stationary)
    }

    pub fn heading(&self) -> Option<f64> {
        match self {
            HeadingUpdate::Accepted(h) | HeadingUpdate::Fallback(h) => Some(*h),
            HeadingUpdate::Stationary => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadingState {
    current_heading: f64,
    last_valid_heading: f64,
    track_up_enabled: bool,
}

impl HeadingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one sample into the state.
    ///
    /// Finite headings are accepted when speed is unknown or above
    /// `speed_threshold`; headings reported while slower are dropped because
    /// compasses drift at rest. Samples without a finite heading fall back
    /// to the last valid one so a GPS hiccup never snaps the map north.
    pub fn ingest(&mut self, sample: &PositionSample, speed_threshold: f64) -> HeadingUpdate {
        match sample.heading.filter(|h| h.is_finite()) {
            Some(heading) => {
                let moving = match sample.speed {
                    None => true,
                    Some(speed) => speed > speed_threshold,
                };
                if moving {
                    self.current_heading = heading;
                    self.last_valid_heading = heading;
                    HeadingUpdate::Accepted(heading)
                } else {
                    HeadingUpdate::Stationary
                }
            }
            None => {
                self.current_heading = self.last_valid_heading;
                HeadingUpdate::Fallback(self.last_valid_heading)
            }
        }
    }

    pub fn current_heading(&self) -> f64 {
        self.current_heading
    }

    pub fn last_valid_heading(&self) -> f64 {
        self.last_valid_heading
    }

    pub fn track_up_enabled(&self) -> bool {
        self.track_up_enabled
    }

    pub(crate) fn set_track_up_enabled(&mut self, enabled: bool) {
        self.track_up_enabled = enabled;
    }
}
