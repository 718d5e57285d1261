//! In-memory map canvas for terminal sessions and tests.
//!
//! `HeadlessCanvas` implements the `MapCanvas` port without a rendering
//! library. It tracks the maps, markers, layer groups, and polylines a real
//! canvas would hold, logs every mutation, and exposes the current scene via
//! [`CanvasProbe`] after the canvas itself has been handed to a
//! `MapSurface`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::domain::Coordinate;
use crate::domain::ports::{
    LayerGroupId, MapCanvas, MapCanvasError, MapId, MapOptions, MarkerId, MarkerStyle,
    PolylineId, PolylineStyle,
};

/// A marker as currently placed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    /// Marker handle.
    pub id: MarkerId,
    /// Owning map.
    pub map: MapId,
    /// Current position.
    pub at: Coordinate,
    /// Icon family.
    pub style: MarkerStyle,
    /// Popup text.
    pub popup: String,
}

/// A polyline as currently drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnPolyline {
    /// Polyline handle.
    pub id: PolylineId,
    /// Owning layer group.
    pub group: LayerGroupId,
    /// Latitude-first points.
    pub points: Vec<Coordinate>,
    /// Stroke settings.
    pub style: PolylineStyle,
}

/// A live map and its viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveMap {
    /// Creation options.
    pub options: MapOptions,
    /// Current viewport centre.
    pub center: Coordinate,
    /// Current zoom.
    pub zoom: u8,
}

/// Point-in-time copy of the canvas scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanvasSnapshot {
    /// Live maps by handle.
    pub maps: BTreeMap<MapId, LiveMap>,
    /// Markers on live maps.
    pub markers: Vec<PlacedMarker>,
    /// Polylines in live layer groups.
    pub polylines: Vec<DrawnPolyline>,
    /// Maps removed so far.
    pub removed_maps: usize,
}

impl CanvasSnapshot {
    /// Markers of one style.
    #[must_use]
    pub fn markers_with(&self, style: MarkerStyle) -> Vec<&PlacedMarker> {
        self.markers
            .iter()
            .filter(|marker| marker.style == style)
            .collect()
    }
}

#[derive(Debug, Default)]
struct Scene {
    next_id: u64,
    maps: BTreeMap<MapId, LiveMap>,
    groups: BTreeMap<LayerGroupId, MapId>,
    markers: Vec<PlacedMarker>,
    polylines: Vec<DrawnPolyline>,
    removed_maps: usize,
}

impl Scene {
    const fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_map(&mut self, map: MapId) -> Result<&mut LiveMap, MapCanvasError> {
        self.maps
            .get_mut(&map)
            .ok_or(MapCanvasError::UnknownMap { id: map.0 })
    }

    fn require_group(&self, group: LayerGroupId) -> Result<(), MapCanvasError> {
        if self.groups.contains_key(&group) {
            Ok(())
        } else {
            Err(MapCanvasError::unknown_layer(group.0))
        }
    }
}

/// Read access to a [`HeadlessCanvas`] scene.
#[derive(Debug, Clone)]
pub struct CanvasProbe(Arc<Mutex<Scene>>);

impl CanvasProbe {
    /// Copy the current scene.
    #[must_use]
    pub fn snapshot(&self) -> CanvasSnapshot {
        let scene = lock(&self.0);
        CanvasSnapshot {
            maps: scene.maps.clone(),
            markers: scene.markers.clone(),
            polylines: scene.polylines.clone(),
            removed_maps: scene.removed_maps,
        }
    }
}

/// Map canvas that keeps its scene in memory.
#[derive(Debug, Default)]
pub struct HeadlessCanvas {
    scene: Arc<Mutex<Scene>>,
}

impl HeadlessCanvas {
    /// Create an empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a probe that outlives the canvas being boxed away.
    #[must_use]
    pub fn probe(&self) -> CanvasProbe {
        CanvasProbe(Arc::clone(&self.scene))
    }

    fn scene(&self) -> MutexGuard<'_, Scene> {
        lock(&self.scene)
    }
}

fn lock(scene: &Mutex<Scene>) -> MutexGuard<'_, Scene> {
    scene.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MapCanvas for HeadlessCanvas {
    fn create_map(&mut self, options: &MapOptions) -> Result<MapId, MapCanvasError> {
        let mut scene = self.scene();
        let map = MapId(scene.allocate());
        scene.maps.insert(
            map,
            LiveMap {
                options: options.clone(),
                center: options.center,
                zoom: options.zoom,
            },
        );
        debug!(map = map.0, tiles = %options.tile_url_template, "headless map created");
        Ok(map)
    }

    fn set_view(
        &mut self,
        map: MapId,
        center: Coordinate,
        zoom: Option<u8>,
    ) -> Result<(), MapCanvasError> {
        let mut scene = self.scene();
        let live = scene.live_map(map)?;
        live.center = center;
        if let Some(level) = zoom {
            live.zoom = level;
        }
        trace!(map = map.0, lat = center.lat, lng = center.lng, "view set");
        Ok(())
    }

    fn add_marker(
        &mut self,
        map: MapId,
        at: Coordinate,
        style: MarkerStyle,
        popup: &str,
    ) -> Result<MarkerId, MapCanvasError> {
        let mut scene = self.scene();
        scene.live_map(map)?;
        let id = MarkerId(scene.allocate());
        scene.markers.push(PlacedMarker {
            id,
            map,
            at,
            style,
            popup: popup.to_owned(),
        });
        debug!(marker = id.0, ?style, popup, "marker added");
        Ok(id)
    }

    fn move_marker(&mut self, marker: MarkerId, to: Coordinate) -> Result<(), MapCanvasError> {
        let mut scene = self.scene();
        let placed = scene
            .markers
            .iter_mut()
            .find(|candidate| candidate.id == marker)
            .ok_or(MapCanvasError::UnknownMarker { id: marker.0 })?;
        placed.at = to;
        trace!(marker = marker.0, lat = to.lat, lng = to.lng, "marker moved");
        Ok(())
    }

    fn add_layer_group(&mut self, map: MapId) -> Result<LayerGroupId, MapCanvasError> {
        let mut scene = self.scene();
        scene.live_map(map)?;
        let group = LayerGroupId(scene.allocate());
        scene.groups.insert(group, map);
        Ok(group)
    }

    fn add_polyline(
        &mut self,
        group: LayerGroupId,
        points: &[Coordinate],
        style: &PolylineStyle,
    ) -> Result<PolylineId, MapCanvasError> {
        let mut scene = self.scene();
        scene.require_group(group)?;
        let id = PolylineId(scene.allocate());
        scene.polylines.push(DrawnPolyline {
            id,
            group,
            points: points.to_vec(),
            style: style.clone(),
        });
        debug!(polyline = id.0, points = points.len(), color = %style.color, "polyline drawn");
        Ok(id)
    }

    fn clear_layer_group(&mut self, group: LayerGroupId) -> Result<(), MapCanvasError> {
        let mut scene = self.scene();
        scene.require_group(group)?;
        let before = scene.polylines.len();
        scene.polylines.retain(|line| line.group != group);
        debug!(group = group.0, removed = before - scene.polylines.len(), "layer cleared");
        Ok(())
    }

    fn remove_map(&mut self, map: MapId) -> Result<(), MapCanvasError> {
        let mut scene = self.scene();
        scene
            .maps
            .remove(&map)
            .ok_or(MapCanvasError::UnknownMap { id: map.0 })?;
        let groups = scene
            .groups
            .iter()
            .filter(|(_, owner)| **owner == map)
            .map(|(group, _)| *group)
            .collect::<Vec<_>>();
        scene.groups.retain(|_, owner| *owner != map);
        scene.polylines.retain(|line| !groups.contains(&line.group));
        scene.markers.retain(|marker| marker.map != map);
        scene.removed_maps += 1;
        debug!(map = map.0, "headless map removed");
        Ok(())
    }
}
