// src/map.rs
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::workout::{Coords, WorkoutType};

/// Opaque reference to a marker owned by a map widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Popup bound to a workout marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupOptions {
    pub content: String,
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
    /// Style class keyed by workout type, e.g. `running-popup`.
    pub class_name: String,
    pub workout_type: WorkoutType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanOptions {
    pub animate: bool,
    pub duration_secs: f64,
}

/// The operations the controller needs from a map widget. Clicks on the map
/// are not part of this trait; front ends deliver them as events.
pub trait MapWidget {
    fn initialize(&mut self, center: Coords, zoom: u8);
    fn add_tile_layer(&mut self, url: &str, attribution: &str);
    fn place_marker(&mut self, coords: Coords, popup: &PopupOptions) -> MarkerHandle;
    fn remove_marker(&mut self, marker: MarkerHandle);
    fn pan_to(&mut self, coords: Coords, options: PanOptions);
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Could not access geolocation, please allow access to your location and restart!")]
    Unavailable,
    #[error("Geolocation request failed: {0}")]
    Failed(String),
}

/// One-shot position lookup.
pub trait Geolocation {
    /// # Errors
    /// Returns `GeolocationError` when no position can be determined.
    fn current_position(&mut self) -> Result<Coords, GeolocationError>;
}

/// Reports a position known up front, typically `home_location` from the config.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Option<Coords>);

impl Geolocation for FixedLocation {
    fn current_position(&mut self) -> Result<Coords, GeolocationError> {
        self.0.ok_or(GeolocationError::Unavailable)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub coords: Coords,
    pub popup: PopupOptions,
}

/// A map without a display. Keeps track of view and markers so scripted
/// front ends and tests can inspect them.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    pub center: Option<Coords>,
    pub zoom: u8,
    pub tile_layers: Vec<String>,
    pub markers: BTreeMap<MarkerHandle, PlacedMarker>,
    pub removed: Vec<MarkerHandle>,
    next_handle: u64,
}

impl HeadlessMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn marker(&self, handle: MarkerHandle) -> Option<&PlacedMarker> {
        self.markers.get(&handle)
    }
}

impl MapWidget for HeadlessMap {
    fn initialize(&mut self, center: Coords, zoom: u8) {
        info!(%center, zoom, "map initialized");
        self.center = Some(center);
        self.zoom = zoom;
    }

    fn add_tile_layer(&mut self, url: &str, _attribution: &str) {
        self.tile_layers.push(url.to_string());
    }

    fn place_marker(&mut self, coords: Coords, popup: &PopupOptions) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        debug!(?handle, %coords, "marker placed");
        self.markers.insert(
            handle,
            PlacedMarker {
                coords,
                popup: popup.clone(),
            },
        );
        handle
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        self.markers.remove(&marker);
        self.removed.push(marker);
    }

    fn pan_to(&mut self, coords: Coords, _options: PanOptions) {
        self.center = Some(coords);
    }
}
