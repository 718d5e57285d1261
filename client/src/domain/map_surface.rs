//! Map session ownership: one map, one user marker, POI markers, and a route
//! layer.
//!
//! `MapSurface` is the only code that touches the [`MapCanvas`]. It keeps the
//! handles the canvas returns so callers never look markers up by position,
//! and it releases the map on every exit path through [`Drop`].

use thiserror::Error;
use tracing::{debug, warn};

use super::ports::{
    LayerGroupId, MapCanvas, MapCanvasError, MapId, MapOptions, MarkerId, MarkerStyle,
    PolylineStyle,
};
use super::{Coordinate, PointOfInterest, RoutePath};

/// Popup text attached to the user-location marker.
pub const USER_MARKER_POPUP: &str = "Vị trí của bạn";

/// Errors raised by [`MapSurface`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapSurfaceError {
    /// An operation needed a live map but none was created.
    #[error("map surface is not initialized")]
    NotInitialized,
    /// The canvas rejected an operation.
    #[error(transparent)]
    Canvas(#[from] MapCanvasError),
}

#[derive(Debug)]
struct MapSession {
    map: MapId,
    route_layer: LayerGroupId,
    user_marker: Option<MarkerId>,
    poi_markers: Vec<MarkerId>,
}

/// Owner of the map instance and every layer drawn on it.
pub struct MapSurface {
    canvas: Box<dyn MapCanvas>,
    session: Option<MapSession>,
}

impl MapSurface {
    /// Wrap a canvas. No map exists until [`MapSurface::initialize`] runs.
    #[must_use]
    pub const fn new(canvas: Box<dyn MapCanvas>) -> Self {
        Self {
            canvas,
            session: None,
        }
    }

    /// Create the map and its route layer, or return the live handle.
    ///
    /// If the route layer cannot be created the half-built map is removed
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`MapSurfaceError::Canvas`] when the canvas fails.
    pub fn initialize(&mut self, center: Coordinate, zoom: u8) -> Result<MapId, MapSurfaceError> {
        if let Some(session) = &self.session {
            return Ok(session.map);
        }

        let map = self
            .canvas
            .create_map(&MapOptions::openstreetmap(center, zoom))?;
        let route_layer = match self.canvas.add_layer_group(map) {
            Ok(group) => group,
            Err(error) => {
                self.release(map);
                return Err(error.into());
            }
        };

        debug!(map = map.0, lat = center.lat, lng = center.lng, zoom, "map created");
        self.session = Some(MapSession {
            map,
            route_layer,
            user_marker: None,
            poi_markers: Vec::new(),
        });
        Ok(map)
    }

    /// Handle of the live map, if any.
    #[must_use]
    pub fn handle(&self) -> Option<MapId> {
        self.session.as_ref().map(|session| session.map)
    }

    /// Number of point-of-interest markers placed this session.
    #[must_use]
    pub fn poi_marker_count(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |session| session.poi_markers.len())
    }

    /// Create the user marker on first call, otherwise move it.
    ///
    /// # Errors
    ///
    /// Returns [`MapSurfaceError::NotInitialized`] without a live map, or
    /// [`MapSurfaceError::Canvas`] when the canvas fails.
    pub fn place_or_move_user_marker(
        &mut self,
        at: Coordinate,
    ) -> Result<MarkerId, MapSurfaceError> {
        let Self { canvas, session: slot } = self;
        let session = slot.as_mut().ok_or(MapSurfaceError::NotInitialized)?;

        if let Some(marker) = session.user_marker {
            canvas.move_marker(marker, at)?;
            return Ok(marker);
        }

        let marker = canvas.add_marker(
            session.map,
            at,
            MarkerStyle::UserLocation,
            USER_MARKER_POPUP,
        )?;
        session.user_marker = Some(marker);
        Ok(marker)
    }

    /// Pan the viewport to `center`, keeping the current zoom.
    ///
    /// # Errors
    ///
    /// Returns [`MapSurfaceError::NotInitialized`] without a live map, or
    /// [`MapSurfaceError::Canvas`] when the canvas fails.
    pub fn center_on(&mut self, center: Coordinate) -> Result<(), MapSurfaceError> {
        let map = self.handle().ok_or(MapSurfaceError::NotInitialized)?;
        self.canvas.set_view(map, center, None)?;
        Ok(())
    }

    /// Add one marker per point of interest.
    ///
    /// Repeated calls add duplicate markers; call once per session.
    ///
    /// # Errors
    ///
    /// Returns [`MapSurfaceError::NotInitialized`] without a live map, or
    /// [`MapSurfaceError::Canvas`] on the first marker the canvas rejects.
    pub fn place_points_of_interest(
        &mut self,
        points: &[PointOfInterest],
    ) -> Result<usize, MapSurfaceError> {
        let Self { canvas, session: slot } = self;
        let session = slot.as_mut().ok_or(MapSurfaceError::NotInitialized)?;

        for point in points {
            let marker = canvas.add_marker(
                session.map,
                point.coordinate,
                MarkerStyle::PointOfInterest,
                &point.name,
            )?;
            session.poi_markers.push(marker);
        }
        Ok(points.len())
    }

    /// Remove every route polyline.
    ///
    /// # Errors
    ///
    /// Returns [`MapSurfaceError::NotInitialized`] without a live map, or
    /// [`MapSurfaceError::Canvas`] when the canvas fails.
    pub fn clear_route_paths(&mut self) -> Result<(), MapSurfaceError> {
        let layer = self.route_layer()?;
        self.canvas.clear_layer_group(layer)?;
        Ok(())
    }

    /// Draw route paths into the route layer, swapping each backend
    /// `[lng, lat]` pair into latitude-first order. Empty paths are skipped.
    ///
    /// Returns the number of polylines drawn.
    ///
    /// # Errors
    ///
    /// Returns [`MapSurfaceError::NotInitialized`] without a live map, or
    /// [`MapSurfaceError::Canvas`] when the canvas fails.
    pub fn draw_route_paths(
        &mut self,
        paths: &[RoutePath],
        style: &PolylineStyle,
    ) -> Result<usize, MapSurfaceError> {
        let layer = self.route_layer()?;
        let mut drawn = 0;
        for path in paths {
            if path.is_empty() {
                debug!("skipping empty route path");
                continue;
            }
            self.canvas
                .add_polyline(layer, &path.to_coordinates(), style)?;
            drawn += 1;
        }
        Ok(drawn)
    }

    /// Replace the route layer contents in one uninterrupted step.
    ///
    /// # Errors
    ///
    /// See [`MapSurface::clear_route_paths`] and
    /// [`MapSurface::draw_route_paths`].
    pub fn redraw_route_paths(
        &mut self,
        paths: &[RoutePath],
        style: &PolylineStyle,
    ) -> Result<usize, MapSurfaceError> {
        self.clear_route_paths()?;
        self.draw_route_paths(paths, style)
    }

    /// Release the map and all of its layers. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(
                map = session.map.0,
                poi_markers = session.poi_markers.len(),
                "tearing down map"
            );
            self.release(session.map);
        }
    }

    fn route_layer(&self) -> Result<LayerGroupId, MapSurfaceError> {
        self.session
            .as_ref()
            .map(|session| session.route_layer)
            .ok_or(MapSurfaceError::NotInitialized)
    }

    fn release(&mut self, map: MapId) {
        if let Err(error) = self.canvas.remove_map(map) {
            warn!(map = map.0, %error, "failed to remove map");
        }
    }
}

impl Drop for MapSurface {
    fn drop(&mut self) {
        self.teardown();
    }
}
