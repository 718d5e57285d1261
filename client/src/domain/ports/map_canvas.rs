//! Driven port for the map rendering library.
//!
//! The canvas is a capability surface only: it knows how to create a map,
//! place and move markers, and draw polylines into layer groups. Lifecycle
//! rules (one user marker, clear-before-draw) live in
//! [`crate::domain::MapSurface`], which is the only caller.

use super::define_port_error;
use crate::domain::Coordinate;

/// Default raster tile template.
pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
/// Attribution required by the default tile server.
pub const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>";

macro_rules! canvas_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);
    };
}

canvas_handle!(
    /// Handle to a live map instance.
    MapId
);
canvas_handle!(
    /// Handle to a marker on a map.
    MarkerId
);
canvas_handle!(
    /// Handle to a layer group that holds polylines.
    LayerGroupId
);
canvas_handle!(
    /// Handle to one drawn polyline.
    PolylineId
);

/// Options for creating a map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    /// Initial viewport centre.
    pub center: Coordinate,
    /// Initial zoom level.
    pub zoom: u8,
    /// Raster tile URL template.
    pub tile_url_template: String,
    /// Tile attribution markup.
    pub attribution: String,
}

impl MapOptions {
    /// Options using OpenStreetMap tiles.
    #[must_use]
    pub fn openstreetmap(center: Coordinate, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            tile_url_template: OSM_TILE_URL.to_owned(),
            attribution: OSM_ATTRIBUTION.to_owned(),
        }
    }
}

/// Icon family used for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// The "you are here" marker.
    UserLocation,
    /// A sightseeing location served by the backend.
    PointOfInterest,
}

/// Stroke settings for a route polyline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolylineStyle {
    /// CSS colour name or hex string.
    pub color: String,
    /// Stroke width in pixels.
    pub weight: u8,
}

impl PolylineStyle {
    /// Route stroke in `color` with the standard weight.
    #[must_use]
    pub fn route(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            weight: 5,
        }
    }
}

define_port_error! {
    /// Errors raised by a map canvas.
    pub enum MapCanvasError {
        /// The map handle does not refer to a live map.
        UnknownMap {
            /// Rejected map handle.
            id: u64,
        } => "unknown map {id}",
        /// The marker handle does not refer to a live marker.
        UnknownMarker {
            /// Rejected marker handle.
            id: u64,
        } => "unknown marker {id}",
        /// The layer group handle does not refer to a live group.
        UnknownLayer {
            /// Rejected layer group handle.
            id: u64,
        } => "unknown layer group {id}",
        /// The rendering backend rejected the operation.
        Backend {
            /// Backend error text.
            message: String,
        } => "map backend failed: {message}",
    }
}

/// Port over the imperative map rendering API.
#[cfg_attr(test, mockall::automock)]
pub trait MapCanvas: Send {
    /// Create a map with its tile layer.
    fn create_map(&mut self, options: &MapOptions) -> Result<MapId, MapCanvasError>;

    /// Pan (and optionally zoom) the viewport.
    fn set_view(
        &mut self,
        map: MapId,
        center: Coordinate,
        zoom: Option<u8>,
    ) -> Result<(), MapCanvasError>;

    /// Add a marker with a popup.
    fn add_marker(
        &mut self,
        map: MapId,
        at: Coordinate,
        style: MarkerStyle,
        popup: &str,
    ) -> Result<MarkerId, MapCanvasError>;

    /// Reposition an existing marker.
    fn move_marker(&mut self, marker: MarkerId, to: Coordinate) -> Result<(), MapCanvasError>;

    /// Add an empty layer group to a map.
    fn add_layer_group(&mut self, map: MapId) -> Result<LayerGroupId, MapCanvasError>;

    /// Draw a polyline into a layer group. Points are latitude-first.
    fn add_polyline(
        &mut self,
        group: LayerGroupId,
        points: &[Coordinate],
        style: &PolylineStyle,
    ) -> Result<PolylineId, MapCanvasError>;

    /// Remove every polyline from a layer group.
    fn clear_layer_group(&mut self, group: LayerGroupId) -> Result<(), MapCanvasError>;

    /// Destroy a map together with its markers and layers.
    fn remove_map(&mut self, map: MapId) -> Result<(), MapCanvasError>;
}
