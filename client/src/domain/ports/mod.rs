//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod geocoder;
mod map_canvas;
mod route_client;

#[cfg(test)]
pub use geocoder::MockGeocoder;
pub use geocoder::{FixtureGeocoder, Geocoder, GeocoderError};
#[cfg(test)]
pub use map_canvas::MockMapCanvas;
pub use map_canvas::{
    LayerGroupId, MapCanvas, MapCanvasError, MapId, MapOptions, MarkerId, MarkerStyle,
    OSM_ATTRIBUTION, OSM_TILE_URL, PolylineId, PolylineStyle,
};
#[cfg(test)]
pub use route_client::MockRouteClient;
pub use route_client::{FixtureRouteClient, RouteClient, RouteFetchError};
