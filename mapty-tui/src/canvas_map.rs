// mapty-tui/src/canvas_map.rs
use mapty_lib::{Coords, MapWidget, MarkerHandle, PanOptions, PopupOptions};
use ratatui::layout::Rect;
use std::collections::BTreeMap;
use tracing::debug;

const MIN_ZOOM: u8 = 1;
const MAX_ZOOM: u8 = 18;
// Cursor steps per visible width
const CURSOR_STEPS: f64 = 24.0;

/// A map drawn on a ratatui canvas: a world outline, one point per marker,
/// and a crosshair cursor for picking locations from the keyboard.
#[derive(Debug)]
pub struct CanvasMap {
    pub center: Coords,
    pub cursor: Coords,
    pub zoom: u8,
    pub attribution: Option<String>,
    markers: BTreeMap<MarkerHandle, (Coords, PopupOptions)>,
    next_handle: u64,
}

impl Default for CanvasMap {
    fn default() -> Self {
        Self {
            center: Coords::new(0.0, 0.0),
            cursor: Coords::new(0.0, 0.0),
            zoom: MIN_ZOOM,
            attribution: None,
            markers: BTreeMap::new(),
            next_handle: 0,
        }
    }
}

impl CanvasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> impl Iterator<Item = &(Coords, PopupOptions)> {
        self.markers.values()
    }

    /// Visible longitude range, web-map style: each zoom level halves it.
    pub fn x_bounds(&self) -> [f64; 2] {
        let half = Self::lng_span(self.zoom) / 2.0;
        [self.center.lng - half, self.center.lng + half]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        let half = Self::lng_span(self.zoom) / 4.0;
        [self.center.lat - half, self.center.lat + half]
    }

    fn lng_span(zoom: u8) -> f64 {
        360.0 / 2f64.powi(i32::from(zoom) - 1)
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
    }

    /// Moves the cursor by whole steps. The view follows once the cursor
    /// leaves it.
    pub fn nudge_cursor(&mut self, steps_east: i32, steps_north: i32) {
        let step = Self::lng_span(self.zoom) / CURSOR_STEPS;
        self.cursor.lng = (self.cursor.lng + f64::from(steps_east) * step).clamp(-180.0, 180.0);
        self.cursor.lat = (self.cursor.lat + f64::from(steps_north) * step).clamp(-85.0, 85.0);

        let [west, east] = self.x_bounds();
        let [south, north] = self.y_bounds();
        if !(west..=east).contains(&self.cursor.lng) || !(south..=north).contains(&self.cursor.lat) {
            self.center = self.cursor;
        }
    }

    /// Geographic position under a terminal cell of the canvas drawn in `area`
    /// (the area inside the block borders).
    pub fn coords_at(&self, area: Rect, column: u16, row: u16) -> Option<Coords> {
        if area.width == 0
            || area.height == 0
            || column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        let [west, east] = self.x_bounds();
        let [south, north] = self.y_bounds();
        Some(Coords::new(north - fy * (north - south), west + fx * (east - west)))
    }
}

impl MapWidget for CanvasMap {
    fn initialize(&mut self, center: Coords, zoom: u8) {
        debug!(%center, zoom, "canvas map initialized");
        self.center = center;
        self.cursor = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    // Tiles can't be drawn in a terminal; the attribution is still shown
    fn add_tile_layer(&mut self, url: &str, attribution: &str) {
        debug!(url, "tile layer registered");
        self.attribution = Some(attribution.to_string());
    }

    fn place_marker(&mut self, coords: Coords, popup: &PopupOptions) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.markers.insert(handle, (coords, popup.clone()));
        handle
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        self.markers.remove(&marker);
    }

    // No animation in a terminal, the view jumps straight there
    fn pan_to(&mut self, coords: Coords, options: PanOptions) {
        debug!(%coords, duration = options.duration_secs, "pan");
        self.center = coords;
        self.cursor = coords;
    }
}
