use crate::geolocation::{
    bus::PositionBus, Geolocation, GeolocationError, PositionEvent, PositionOptions,
    PositionWatch,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::{Arc, Mutex, PoisonError};

/// Scriptable geolocation provider.
///
/// `push` feeds every active watch; `set_current` decides what the next
/// one-shot request resolves to.
#[derive(Clone)]
pub struct SimulatedGeolocation {
    watches: PositionBus,
    current: Arc<Mutex<PositionEvent>>,
}

impl SimulatedGeolocation {
    pub fn new() -> Self {
        Self {
            watches: PositionBus::new(),
            current: Arc::new(Mutex::new(Err(GeolocationError::PositionUnavailable))),
        }
    }

    pub fn set_current(&self, event: PositionEvent) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = event;
    }

    /// Delivers `event` to every active watch; returns the number reached
    pub fn push(&self, event: PositionEvent) -> usize {
        log::debug!("📡 simulated fix: {:?}", event);
        self.watches.publish(event)
    }

    /// Watches that have not been cancelled
    pub fn active_watches(&self) -> usize {
        self.watches.listener_count()
    }
}

impl Default for SimulatedGeolocation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geolocation for SimulatedGeolocation {
    async fn current_position(&self, _options: &PositionOptions) -> PositionEvent {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn watch_position(&self, _options: &PositionOptions) -> PositionWatch {
        self.watches.subscribe().boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::PositionSample;
    use futures::executor::block_on;

    #[test]
    fn test_one_shot_returns_scripted_fix() {
        let geo = SimulatedGeolocation::new();
        let options = PositionOptions::one_shot();
        assert_eq!(
            block_on(geo.current_position(&options)),
            Err(GeolocationError::PositionUnavailable)
        );

        geo.set_current(Ok(PositionSample::new(40.0, -74.0)));
        assert_eq!(
            block_on(geo.current_position(&options)),
            Ok(PositionSample::new(40.0, -74.0))
        );
    }

    #[test]
    fn test_dropping_watch_cancels_it() {
        let geo = SimulatedGeolocation::new();
        let mut watch = geo.watch_position(&PositionOptions::watch());
        assert_eq!(geo.active_watches(), 1);

        geo.push(Ok(PositionSample::new(1.0, 1.0).with_heading(45.0)));
        let event = block_on(watch.next()).unwrap().unwrap();
        assert_eq!(event.heading, Some(45.0));

        drop(watch);
        assert_eq!(geo.active_watches(), 0);
    }
}
