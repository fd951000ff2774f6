use anyhow::{Context, Result};
use maplet_nav::{
    map_ready, HeadlessMap, Icon, LatLng, MapSurface, Marker, Navigation, NavigationConfig,
    NavigationProfile, PositionBus, PositionSample, Selector, SimulatedGeolocation, Size,
    StyleProperty,
};
use std::{sync::Arc, time::Duration};

/// A short drive east then north through San Francisco
const ROUTE: &[(f64, f64, f64, f64)] = &[
    // lat, lng, heading, speed (m/s)
    (37.7749, -122.4194, 90.0, 8.0),
    (37.7749, -122.4180, 90.0, 9.5),
    (37.7749, -122.4166, 45.0, 6.0),
    (37.7758, -122.4157, 0.0, 7.0),
    (37.7770, -122.4157, 0.0, 0.2),
    (37.7782, -122.4157, 350.0, 5.5),
];

fn load_config() -> Result<NavigationConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            NavigationConfig::from_json_str(&json).with_context(|| format!("parsing {}", path))
        }
        None => Ok(NavigationProfile::Responsive.resolve()),
    }
}

fn build_map() -> Result<HeadlessMap> {
    let mut map = HeadlessMap::new(LatLng::new(37.7749, -122.4194), 12.0, Size::new(1200.0, 800.0))
        .with_default_chrome()
        .with_track_up_panel()
        .with_locate_button();

    // The stock locate control's own arrow marker, which the overlay replaces
    map.add_layer(
        Marker::new(LatLng::new(37.7749, -122.4194))
            .with_icon(Icon::Image {
                url: "images/location-arrow.png".to_string(),
                size: (32, 32),
                anchor: (16, 16),
            })
            .with_alt("Your location")
            .into(),
        None,
    )?;
    Ok(map)
}

#[tokio::main]
async fn main() -> Result<()> {
    maplet_nav::init_logging();

    let config = load_config()?;
    log::debug!("config: {}", serde_json::to_string_pretty(&config)?);

    let geolocation = Arc::new(SimulatedGeolocation::new());
    geolocation.set_current(Ok(PositionSample::new(37.7749, -122.4194).with_accuracy(12.0)));
    let host_positions = PositionBus::new();

    let (notifier, ready) = map_ready::<HeadlessMap>();
    let navigation = Navigation::new(ready, geolocation.clone())
        .with_config(config)
        .with_host_positions(host_positions.clone());

    // The map shows up some time after the overlays were wired in
    let map = Arc::new(std::sync::Mutex::new(build_map()?));
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        notifier.notify(map);
    });

    let handle = navigation.start().await?;
    let fix = handle.locate().await?;
    log::info!("located at {}", fix);

    handle.set_track_up(true);

    for &(lat, lng, heading, speed) in ROUTE {
        let sample = PositionSample::new(lat, lng)
            .with_heading(heading)
            .with_speed(speed);
        geolocation.push(Ok(sample));
        host_positions.publish(Ok(sample));
        tokio::time::sleep(Duration::from_millis(300)).await;

        let transform = handle.with_map(|map| {
            map.inline_style(&Selector::Container, StyleProperty::Transform)
        });
        log::info!(
            "heading {:>5.1}° -> container {}",
            handle.current_heading().unwrap_or_default(),
            transform.as_deref().unwrap_or("none")
        );
    }

    handle.with_map(|map| {
        log::info!(
            "{} marker(s), {} circle(s), status {:?}",
            map.markers().len(),
            map.circles().len(),
            map.text(&Selector::id(maplet_nav::constants::TRACK_UP_STATUS_ID))
        );
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => log::info!("interrupted"),
        _ = tokio::time::sleep(Duration::from_secs(1)) => {}
    }

    handle.cleanup().await;
    Ok(())
}
