//! Navigation constants derived from the page conventions the overlays plug into.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Diameter of the indicator's circular glyph in pixels.
pub const INDICATOR_GLYPH_PX: u32 = 20;

/// Border drawn around the indicator glyph in pixels.
pub const INDICATOR_BORDER_PX: u32 = 3;

/// Size of the div icon hosting the glyph (glyph plus border on both sides).
pub const INDICATOR_ICON_SIZE: (u32, u32) = (26, 26);

/// Hot-spot inside the indicator icon, centred on the glyph.
pub const INDICATOR_ICON_ANCHOR: (u32, u32) = (13, 13);

/// Stacking order of the indicator marker.
pub const INDICATOR_Z_INDEX: i32 = 1000;

/// Fill colour shared by the glyph and the accuracy circle.
pub const INDICATOR_COLOR: &str = "#FF4444";

/// Radius of the accuracy circle in metres.
pub const ACCURACY_RADIUS_M: f64 = 50.0;

/// Class carried by the indicator's div icon.
pub const INDICATOR_ICON_CLASS: &str = "custom-location-indicator";

/// Class carried by the indicator's rendered marker element.
pub const INDICATOR_ELEMENT_CLASS: &str = "custom-user-location";

/// Delay before foreign markers are scrubbed a second time after a fix.
pub const SUPPRESSION_DELAY_MS: u64 = 100;

/// Zoom used when centring the map on a one-shot "Where Am I" fix.
pub const LOCATE_ZOOM: f64 = 16.0;

/// Element id of the manual "Where Am I" button.
pub const LOCATE_BUTTON_ID: &str = "track-location-btn";

/// Label restored on the locate button once a request settles.
pub const LOCATE_BUTTON_LABEL: &str = "📍 Where Am I";

/// Period of the indicator visibility reassertion timer.
pub const REASSERT_INTERVAL_MS: u64 = 1000;

/// Speed (m/s) above which a reported heading is trusted as motion-derived.
pub const MOVEMENT_SPEED_THRESHOLD: f64 = 0.5;

/// Safety margin applied on top of the minimal covering scale.
pub const ROTATION_SCALE_MARGIN: f64 = 1.2;

/// Period of the track-up re-application timer.
pub const REAPPLY_INTERVAL_MS: u64 = 1000;

/// Backdrop painted behind the rotated map so residual edges never show blank.
pub const MAP_BACKDROP_COLOR: &str = "#f0f0f0";

/// Element id of the track-up checkbox.
pub const TRACK_UP_TOGGLE_ID: &str = "track-up-toggle";

/// Element id of the track-up status label.
pub const TRACK_UP_STATUS_ID: &str = "track-up-status";

/// Class of the panel hosting the track-up toggle.
pub const TRACK_UP_PANEL_CLASS: &str = "track-up-container-compact";

/// Class of the page's main controls panel.
pub const CONTROLS_PANEL_CLASS: &str = "controls-compact";

/// Chrome that is counter-rotated to stay readable under track-up.
pub const CHROME_SELECTORS: [&str; 2] = [".leaflet-control", ".leaflet-popup"];

/// Panels pinned to an identity transform regardless of rotation.
pub const PANEL_SELECTORS: [&str; 2] = [".track-up-container-compact", ".controls-compact"];

/// Geolocation request timeout.
pub const GEOLOCATION_TIMEOUT_MS: u64 = 10_000;

/// Maximum cached-fix age accepted by the continuous watch.
pub const WATCH_MAXIMUM_AGE_MS: u64 = 1_000;

/// Maximum cached-fix age accepted by one-shot requests.
pub const ONE_SHOT_MAXIMUM_AGE_MS: u64 = 60_000;
