//! Domain types and services for the sightseeing client.
//!
//! Purpose: model places, suggestions, and tours, and orchestrate the search,
//! map, and routing flows over the ports in [`ports`]. Nothing here performs
//! I/O directly; adapters in `crate::outbound` do.
//!
//! Public surface:
//! - `Coordinate` / `LonLat`: latitude-first and longitude-first positions.
//! - `RouteResult` and friends: a computed tour and its summary text.
//! - `Suggestion`: one geocoding candidate.
//! - `MapSurface`: marker and polyline lifecycle over a `MapCanvas`.
//! - `GeocodeSuggester`: debounced, latest-wins place search.
//! - `AppController`: the state machine tying everything together.

pub mod app_controller;
mod coordinate;
pub mod geocode_suggester;
pub mod map_surface;
pub mod ports;
mod route;
mod suggestion;

pub use self::app_controller::{
    AppController, ControllerSettings, DEFAULT_LOCATION, DEFAULT_ZOOM, Lifecycle, RouteFlow,
    RouteOrigin, SearchFlow, UiEvent,
};
pub use self::coordinate::{Coordinate, LonLat};
pub use self::geocode_suggester::{GeocodeSuggester, SuggesterConfig};
pub use self::map_surface::{MapSurface, MapSurfaceError, USER_MARKER_POPUP};
pub use self::route::{
    INIT_FAILURE_TEXT, NO_ROUTE_TEXT, PointOfInterest, ROUTE_FAILURE_TEXT, RoutePath, RouteResult,
    RouteStop,
};
pub use self::suggestion::{Suggestion, SuggestionId};
