//! Async glue between the controllers, the map and the position sources
//!
//! [`Navigation`] waits for the map-ready signal, attaches both controllers
//! and spawns one tokio task. That task multiplexes the geolocation watch,
//! the host page's position bus, the re-application timer, delayed
//! re-suppression and shutdown. [`NavigationHandle`] is what the page talks
//! to.
//!
//! Lock order is always controllers, then map.

use crate::{
    core::{
        config::NavigationConfig,
        geo::LatLng,
        ready::{MapReady, SharedMap},
    },
    geolocation::{
        bus::{PositionBus, PositionSubscription},
        Geolocation, PositionEvent, PositionWatch,
    },
    indicator::{LocationIndicator, SuppressionPolicy},
    surface::MapSurface,
    track_up::{TrackUpController, TrackUpStatus},
    Error, Result,
};
use futures::{future, Stream, StreamExt};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{self, Instant, Interval, MissedTickBehavior},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Controllers {
    indicator: LocationIndicator,
    /// `None` when the page lacks the track-up controls
    track_up: Option<TrackUpController>,
}

impl Controllers {
    fn wants_reapply(&self) -> bool {
        self.track_up
            .as_ref()
            .is_some_and(TrackUpController::wants_reapply)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Track-up mode may have changed; arm or disarm the re-application timer
    SyncTimers,
    /// Run default-marker suppression again after the configured delay
    Resuppress,
}

/// Builder for a navigation session
pub struct Navigation<M> {
    ready: MapReady<M>,
    geolocation: Arc<dyn Geolocation>,
    host_positions: Option<PositionBus>,
    config: NavigationConfig,
    policy: SuppressionPolicy,
}

impl<M: MapSurface + 'static> Navigation<M> {
    pub fn new(ready: MapReady<M>, geolocation: Arc<dyn Geolocation>) -> Self {
        Self {
            ready,
            geolocation,
            host_positions: None,
            config: NavigationConfig::default(),
            policy: SuppressionPolicy::default(),
        }
    }

    pub fn with_config(mut self, config: NavigationConfig) -> Self {
        self.config = config;
        self
    }

    /// Listen to the host page's own position events as well
    pub fn with_host_positions(mut self, bus: PositionBus) -> Self {
        self.host_positions = Some(bus);
        self
    }

    pub fn with_suppression_policy(mut self, policy: SuppressionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Waits for the map, attaches the controllers and starts the event
    /// loop.
    ///
    /// A page without track-up controls still gets the location indicator.
    pub async fn start(self) -> Result<NavigationHandle<M>> {
        self.config.validate()?;
        let map = self.ready.wait().await?;
        log::info!("🗺️ Map ready, starting navigation overlays");

        let indicator = LocationIndicator::new(self.config.indicator.clone()).with_policy(self.policy);
        let mut track_up = TrackUpController::new(self.config.track_up.clone());

        let track_up = {
            let mut surface = lock(&map);
            if let Err(e) = indicator.suppress_default_markers(&mut *surface) {
                log::warn!("Initial marker suppression failed: {}", e);
            }
            track_up.attach(&*surface).ok().map(|()| track_up)
        };

        let watch = if track_up.is_some() || self.config.indicator.follow_watch {
            Some(self.geolocation.watch_position(&self.config.geolocation.watch))
        } else {
            None
        };

        let controllers = Arc::new(Mutex::new(Controllers { indicator, track_up }));
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = oneshot::channel();

        let event_loop = EventLoop {
            map: map.clone(),
            controllers: controllers.clone(),
            config: self.config.clone(),
            watch,
            host: self.host_positions.as_ref().map(PositionBus::subscribe),
            commands: command_rx,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(event_loop.run());

        Ok(NavigationHandle {
            map,
            controllers,
            geolocation: self.geolocation,
            config: self.config,
            commands,
            shutdown: Mutex::new(Some(shutdown)),
            task: Mutex::new(Some(task)),
        })
    }
}

/// Page-facing control surface of a running navigation session
pub struct NavigationHandle<M> {
    map: SharedMap<M>,
    controllers: Arc<Mutex<Controllers>>,
    geolocation: Arc<dyn Geolocation>,
    config: NavigationConfig,
    commands: mpsc::UnboundedSender<Command>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<M: MapSurface + 'static> NavigationHandle<M> {
    pub fn map(&self) -> SharedMap<M> {
        self.map.clone()
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Runs `f` with the map locked
    pub fn with_map<R>(&self, f: impl FnOnce(&mut M) -> R) -> R {
        f(&mut lock(&self.map))
    }

    pub fn is_running(&self) -> bool {
        lock(&self.task)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn create_indicator(&self, position: LatLng, heading: Option<f64>) -> Result<()> {
        let mut controllers = lock(&self.controllers);
        let mut map = lock(&self.map);
        controllers.indicator.create(&mut *map, position, heading)
    }

    pub fn update_indicator(&self, position: LatLng) -> Result<bool> {
        let mut controllers = lock(&self.controllers);
        let mut map = lock(&self.map);
        controllers.indicator.update(&mut *map, position)
    }

    pub fn remove_indicator(&self) -> Result<()> {
        let mut controllers = lock(&self.controllers);
        let mut map = lock(&self.map);
        controllers.indicator.remove(&mut *map)
    }

    pub fn indicator_position(&self) -> Option<LatLng> {
        lock(&self.controllers).indicator.position()
    }

    pub fn suppress_default_markers(&self) -> Result<usize> {
        let controllers = lock(&self.controllers);
        let mut map = lock(&self.map);
        controllers.indicator.suppress_default_markers(&mut *map)
    }

    pub fn track_up_available(&self) -> bool {
        lock(&self.controllers).track_up.is_some()
    }

    /// Flips the track-up checkbox and mode. Returns the new mode; always
    /// false when the page has no track-up controls.
    pub fn toggle_track_up(&self) -> bool {
        let enabled = self.with_track_up(|track_up, indicator, map| track_up.toggle(map, indicator));
        self.sync_timers();
        enabled.unwrap_or(false)
    }

    pub fn set_track_up(&self, enabled: bool) {
        self.with_track_up(|track_up, indicator, map| track_up.set_enabled(enabled, map, indicator));
        self.sync_timers();
    }

    /// The checkbox `change` handler
    pub fn on_toggle_input(&self) {
        self.with_track_up(|track_up, indicator, map| track_up.on_toggle_input(map, indicator));
        self.sync_timers();
    }

    pub fn is_track_up_enabled(&self) -> bool {
        lock(&self.controllers)
            .track_up
            .as_ref()
            .is_some_and(TrackUpController::is_enabled)
    }

    pub fn current_heading(&self) -> Option<f64> {
        lock(&self.controllers)
            .track_up
            .as_ref()
            .map(TrackUpController::current_heading)
    }

    pub fn track_up_status(&self) -> Option<TrackUpStatus> {
        lock(&self.controllers)
            .track_up
            .as_ref()
            .map(TrackUpController::status)
    }

    fn with_track_up<R>(
        &self,
        f: impl FnOnce(&mut TrackUpController, &LocationIndicator, &mut M) -> R,
    ) -> Option<R> {
        let mut controllers = lock(&self.controllers);
        let Controllers { indicator, track_up } = &mut *controllers;
        let Some(track_up) = track_up.as_mut() else {
            log::warn!("Track Up: controls unavailable, request ignored");
            return None;
        };
        let mut map = lock(&self.map);
        Some(f(track_up, indicator, &mut *map))
    }

    fn sync_timers(&self) {
        // A closed channel means the loop already stopped; nothing to arm.
        let _ = self.commands.send(Command::SyncTimers);
    }

    /// "Where Am I": one-shot fix, centre the map on it and place the
    /// indicator. The locate button is restored whatever the outcome.
    pub async fn locate(&self) -> Result<LatLng> {
        {
            let controllers = lock(&self.controllers);
            let mut map = lock(&self.map);
            controllers.indicator.begin_locate(&mut *map)?;
        }
        log::info!("📍 Requesting current position");

        let event = self
            .geolocation
            .current_position(&self.config.geolocation.one_shot)
            .await;

        let mut controllers = lock(&self.controllers);
        let mut map = lock(&self.map);
        match event {
            Ok(sample) => {
                controllers.indicator.finish_locate(&mut *map, &sample)?;
                let _ = self.commands.send(Command::Resuppress);
                Ok(sample.lat_lng())
            }
            Err(error) => {
                controllers.indicator.fail_locate(&mut *map, error)?;
                Err(Error::Geolocation(error))
            }
        }
    }

    /// Stops the event loop (which drops the watch) and returns the map to
    /// North-Up. Calling it again does nothing.
    pub async fn cleanup(&self) {
        let shutdown = lock(&self.shutdown).take();
        let task = lock(&self.task).take();
        if shutdown.is_none() && task.is_none() {
            return;
        }
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
        }
        if let Some(task) = task {
            if let Err(e) = task.await {
                log::error!("❌ Navigation task ended abnormally: {}", e);
            }
        }

        let mut controllers = lock(&self.controllers);
        let Controllers { indicator, track_up } = &mut *controllers;
        if let Some(track_up) = track_up.as_mut() {
            let mut map = lock(&self.map);
            track_up.cleanup(&mut *map, &*indicator);
        }
        log::info!("🧹 Navigation overlays cleaned up");
    }
}

impl<M> Drop for NavigationHandle<M> {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
    }
}

struct EventLoop<M> {
    map: SharedMap<M>,
    controllers: Arc<Mutex<Controllers>>,
    config: NavigationConfig,
    watch: Option<PositionWatch>,
    host: Option<PositionSubscription>,
    commands: mpsc::UnboundedReceiver<Command>,
    shutdown: oneshot::Receiver<()>,
}

impl<M: MapSurface + 'static> EventLoop<M> {
    async fn run(mut self) {
        let mut reapply: Option<Interval> = None;
        let mut reassert = self
            .config
            .indicator
            .reassert_interval_ms
            .map(|ms| delayed_interval(Duration::from_millis(ms)));
        let mut resuppress_at: Option<Instant> = None;
        let resuppress_delay = Duration::from_millis(self.config.indicator.suppression_delay_ms);

        self.sync_reapply(&mut reapply);

        loop {
            tokio::select! {
                _ = &mut self.shutdown => break,

                event = next_event(&mut self.watch) => match event {
                    Some(event) => {
                        if self.on_watch_event(&event) {
                            resuppress_at = Some(Instant::now() + resuppress_delay);
                        }
                    }
                    None => {
                        log::warn!("Geolocation watch ended");
                        self.watch = None;
                    }
                },

                event = next_event(&mut self.host) => match event {
                    Some(event) => {
                        if self.on_host_event(&event) {
                            resuppress_at = Some(Instant::now() + resuppress_delay);
                        }
                    }
                    None => self.host = None,
                },

                Some(command) = self.commands.recv() => match command {
                    Command::SyncTimers => self.sync_reapply(&mut reapply),
                    Command::Resuppress => {
                        resuppress_at = Some(Instant::now() + resuppress_delay);
                    }
                },

                _ = maybe_tick(&mut reapply) => self.reapply(),

                _ = maybe_sleep(resuppress_at) => {
                    resuppress_at = None;
                    self.resuppress();
                }

                _ = maybe_tick(&mut reassert) => self.reassert(),
            }
        }
        log::debug!("Navigation event loop stopped");
    }

    fn sync_reapply(&self, reapply: &mut Option<Interval>) {
        let wanted = lock(&self.controllers).wants_reapply();
        match (wanted, reapply.is_some()) {
            (true, false) => {
                let period = Duration::from_millis(self.config.track_up.reapply_interval_ms);
                *reapply = Some(delayed_interval(period));
                log::debug!("🧭 Track Up: re-application timer armed");
            }
            (false, true) => {
                *reapply = None;
                log::debug!("🧭 Track Up: re-application timer disarmed");
            }
            _ => {}
        }
    }

    /// Returns true when a delayed re-suppression should follow
    fn on_watch_event(&self, event: &PositionEvent) -> bool {
        let mut controllers = lock(&self.controllers);
        let Controllers { indicator, track_up } = &mut *controllers;
        let mut map = lock(&self.map);

        if let Some(track_up) = track_up.as_mut() {
            track_up.on_position(event, &mut *map, &*indicator);
        }
        match event {
            Ok(sample) if self.config.indicator.follow_watch => {
                if let Err(e) = indicator.on_position(&mut *map, sample) {
                    log::error!("❌ Failed to place location indicator: {}", e);
                }
                true
            }
            Ok(_) => false,
            Err(error) => {
                log::error!("❌ Geolocation watch error: {} (code {})", error, error.code());
                if let Err(e) = indicator.restore_locate_button(&mut *map) {
                    log::warn!("Could not re-enable locate button: {}", e);
                }
                false
            }
        }
    }

    fn on_host_event(&self, event: &PositionEvent) -> bool {
        match event {
            Ok(sample) => {
                let mut controllers = lock(&self.controllers);
                let mut map = lock(&self.map);
                if let Err(e) = controllers.indicator.on_position(&mut *map, sample) {
                    log::error!("❌ Failed to place location indicator: {}", e);
                }
                true
            }
            Err(error) => {
                log::debug!("Host position error ignored by indicator: {}", error);
                false
            }
        }
    }

    fn reapply(&self) {
        let mut controllers = lock(&self.controllers);
        let Controllers { indicator, track_up } = &mut *controllers;
        if let Some(track_up) = track_up.as_mut() {
            let mut map = lock(&self.map);
            track_up.tick(&mut *map, &*indicator);
        }
    }

    fn resuppress(&self) {
        let controllers = lock(&self.controllers);
        let mut map = lock(&self.map);
        match controllers.indicator.suppress_default_markers(&mut *map) {
            Ok(0) => {}
            Ok(removed) => log::debug!("🗑️ Delayed suppression removed {} marker(s)", removed),
            Err(e) => log::warn!("Delayed marker suppression failed: {}", e),
        }
    }

    fn reassert(&self) {
        let controllers = lock(&self.controllers);
        let mut map = lock(&self.map);
        if let Err(e) = controllers.indicator.reassert_visibility(&mut *map) {
            log::warn!("Indicator visibility reassertion failed: {}", e);
        }
    }
}

/// Interval whose first tick is one period away
fn delayed_interval(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_event<S>(source: &mut Option<S>) -> Option<S::Item>
where
    S: Stream + Unpin,
{
    match source {
        Some(stream) => stream.next().await,
        None => future::pending().await,
    }
}

async fn maybe_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}

async fn maybe_sleep(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}
