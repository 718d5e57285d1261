//! Orchestration of search, map session, and route flows.
//!
//! The controller owns all UI-facing state. Search runs through the
//! [`GeocodeSuggester`]; route fetches run as spawned tasks whose outcomes
//! come back through a channel and are applied in issue order, with stale
//! outcomes dropped. Transport faults never escape: they become route-summary
//! text.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use super::geocode_suggester::GeocodeSuggester;
use super::map_surface::{MapSurface, MapSurfaceError};
use super::ports::{PolylineStyle, RouteClient, RouteFetchError};
use super::route::{INIT_FAILURE_TEXT, NO_ROUTE_TEXT, ROUTE_FAILURE_TEXT};
use super::{Coordinate, RouteResult, Suggestion};


/// Default "you are here" position (Independence Palace, Ho Chi Minh City).
pub const DEFAULT_LOCATION: Coordinate = Coordinate::new(10.7769, 106.6953);
/// Default map zoom.
pub const DEFAULT_ZOOM: u8 = 15;

/// Controller behaviour settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Starting user location and viewport centre.
    pub default_location: Coordinate,
    /// Starting zoom.
    pub zoom: u8,
    /// Fetch and draw the backend's fixed tour during startup.
    pub load_initial_route: bool,
    /// Stroke colour for the startup tour.
    pub initial_route_color: String,
    /// Stroke colour for tours starting at the user location.
    pub user_route_color: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_location: DEFAULT_LOCATION,
            zoom: DEFAULT_ZOOM,
            load_initial_route: true,
            initial_route_color: "blue".to_owned(),
            user_route_color: "red".to_owned(),
        }
    }
}

/// Top-level lifecycle of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, or torn down.
    Idle,
    /// Startup data is loading.
    Initializing,
    /// Accepting user input.
    Ready,
}

/// State of the route sub-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFlow {
    /// Nothing fetched yet.
    NoRoute,
    /// The latest fetch succeeded and is drawn.
    RouteDisplayed,
    /// The latest fetch, or startup, failed.
    RouteError,
}

/// State of the search sub-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFlow {
    /// The suggestion list is empty.
    NoSuggestions,
    /// At least one suggestion is shown.
    ShowingSuggestions,
}

/// Which endpoint produced a route, which decides its stroke colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOrigin {
    /// The fixed startup tour.
    Initial,
    /// A tour starting at the user location.
    UserLocation,
}

/// Input events delivered to [`AppController::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The search field text changed.
    SearchTextChanged(String),
    /// The search field gained focus.
    SearchFocused,
    /// The search field lost focus.
    SearchBlurred,
    /// A suggestion was picked from the list.
    SuggestionSelected(Suggestion),
    /// The user typed coordinates; `fetch_route` also requests a new tour.
    LocationEdited {
        /// The typed position.
        location: Coordinate,
        /// Whether to fetch a tour from the new position.
        fetch_route: bool,
    },
    /// Request a tour from the current user location.
    RouteRequested,
    /// Show the route summary panel.
    RouteModalOpened,
    /// Hide the route summary panel.
    RouteModalClosed,
}

#[derive(Debug)]
struct RouteOutcome {
    generation: u64,
    origin: RouteOrigin,
    result: Result<RouteResult, RouteFetchError>,
}

enum Step {
    Event(UiEvent),
    Route(RouteOutcome),
    Closed,
}

/// Application controller wiring user actions to search, routing, and map.
pub struct AppController {
    settings: ControllerSettings,
    routes: Arc<dyn RouteClient>,
    suggester: GeocodeSuggester,
    map: MapSurface,
    lifecycle: Lifecycle,
    route_flow: RouteFlow,
    route: Option<RouteResult>,
    search_text: String,
    user_location: Coordinate,
    route_text: String,
    route_modal_open: bool,
    route_generation: u64,
    routes_in_flight: usize,
    outcome_tx: mpsc::UnboundedSender<RouteOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<RouteOutcome>,
}

impl AppController {
    /// Assemble a controller. Nothing happens until
    /// [`AppController::initialize`] or [`AppController::run`].
    #[must_use]
    pub fn new(
        settings: ControllerSettings,
        routes: Arc<dyn RouteClient>,
        suggester: GeocodeSuggester,
        map: MapSurface,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let user_location = settings.default_location;
        Self {
            settings,
            routes,
            suggester,
            map,
            lifecycle: Lifecycle::Idle,
            route_flow: RouteFlow::NoRoute,
            route: None,
            search_text: String::new(),
            user_location,
            route_text: NO_ROUTE_TEXT.to_owned(),
            route_modal_open: false,
            route_generation: 0,
            routes_in_flight: 0,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Create the map, place the user and POI markers, and optionally draw
    /// the startup tour.
    ///
    /// Any failure leaves the controller `Ready` with the initialization
    /// failure text; the map stays usable. Calling again once past `Idle`
    /// does nothing.
    pub async fn initialize(&mut self) {
        if self.lifecycle != Lifecycle::Idle {
            debug!(lifecycle = ?self.lifecycle, "initialize ignored");
            return;
        }
        self.lifecycle = Lifecycle::Initializing;

        if let Err(failure) = self.load_startup_data().await {
            error!(error = %failure, "initialization failed");
            self.route_flow = RouteFlow::RouteError;
            self.route_text = INIT_FAILURE_TEXT.to_owned();
        }
        self.lifecycle = Lifecycle::Ready;
        info!(route_flow = ?self.route_flow, "controller ready");
    }

    async fn load_startup_data(&mut self) -> Result<(), StartupFailure> {
        let location = self.settings.default_location;
        self.map.initialize(location, self.settings.zoom)?;
        self.map.place_or_move_user_marker(location)?;

        let points = self.routes.points_of_interest().await?;
        let placed = self.map.place_points_of_interest(&points)?;
        debug!(placed, "points of interest placed");

        if self.settings.load_initial_route {
            self.route_generation += 1;
            let route = self.routes.initial_route().await?;
            self.show_route(route, RouteOrigin::Initial);
        }
        Ok(())
    }

    /// Dispatch one input event.
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::SearchTextChanged(text) => self.on_search_text_changed(text),
            UiEvent::SearchFocused => self.on_search_focus(),
            UiEvent::SearchBlurred => self.on_search_blur(),
            UiEvent::SuggestionSelected(suggestion) => self.select_suggestion(&suggestion),
            UiEvent::LocationEdited {
                location,
                fetch_route,
            } => {
                self.set_user_location(location);
                if fetch_route {
                    self.request_route_from_user();
                }
            }
            UiEvent::RouteRequested => self.request_route_from_user(),
            UiEvent::RouteModalOpened => self.open_route_modal(),
            UiEvent::RouteModalClosed => self.close_route_modal(),
        }
    }

    /// Initialize, then process input events and route outcomes until the
    /// event channel closes. The map is torn down on return.
    pub async fn run(mut self, mut events: mpsc::Receiver<UiEvent>) -> Self {
        self.initialize().await;
        loop {
            let step = tokio::select! {
                event = events.recv() => event.map_or(Step::Closed, Step::Event),
                Some(outcome) = self.outcome_rx.recv() => Step::Route(outcome),
            };
            match step {
                Step::Event(event) => self.handle(event),
                Step::Route(outcome) => self.apply_route_outcome(outcome),
                Step::Closed => break,
            }
        }
        self.teardown();
        self
    }

    /// Update the search text and restart the suggestion debounce.
    pub fn on_search_text_changed(&mut self, text: String) {
        self.suggester.on_text_change(&text);
        self.search_text = text;
    }

    /// Refresh suggestions for the current text on focus.
    pub fn on_search_focus(&mut self) {
        self.suggester.on_focus(&self.search_text);
    }

    /// Hide suggestions after the blur grace delay.
    pub fn on_search_blur(&mut self) {
        self.suggester.on_blur();
    }

    /// Move to the selected place and fetch a tour starting there.
    ///
    /// Suggestions are cleared and the label is copied into the search text
    /// without starting a new lookup.
    pub fn select_suggestion(&mut self, suggestion: &Suggestion) {
        self.suggester.clear();
        self.search_text.clone_from(&suggestion.label);

        let location = suggestion.coordinate;
        if !location.is_usable() {
            warn!(id = %suggestion.id, "selected suggestion has unusable coordinates");
            return;
        }
        self.set_user_location(location);
        self.request_route_from_location(location);
    }

    /// Set the user location directly, repositioning the marker and
    /// re-centring the map. Does not fetch a route.
    pub fn set_user_location(&mut self, location: Coordinate) {
        self.user_location = location;
        if !location.is_usable() {
            debug!(?location, "location not usable; map left unchanged");
            return;
        }
        if let Err(error) = self.sync_user_marker(location) {
            log_map_error(&error, "failed to move user marker");
        }
    }

    fn sync_user_marker(&mut self, location: Coordinate) -> Result<(), MapSurfaceError> {
        self.map.place_or_move_user_marker(location)?;
        self.map.center_on(location)
    }

    /// Fetch a tour from the current user location. Unusable locations are
    /// skipped.
    pub fn request_route_from_user(&mut self) {
        let location = self.user_location;
        if !location.is_usable() {
            warn!(?location, "route request skipped for unusable location");
            return;
        }
        self.request_route_from_location(location);
    }

    fn request_route_from_location(&mut self, origin: Coordinate) {
        self.route_generation += 1;
        self.routes_in_flight += 1;
        let generation = self.route_generation;
        let routes = Arc::clone(&self.routes);
        let outcome_tx = self.outcome_tx.clone();
        debug!(generation, lat = origin.lat, lng = origin.lng, "route fetch issued");
        tokio::spawn(async move {
            let result = routes.route_from_location(origin).await;
            let outcome = RouteOutcome {
                generation,
                origin: RouteOrigin::UserLocation,
                result,
            };
            if outcome_tx.send(outcome).is_err() {
                debug!(generation, "controller gone before route outcome arrived");
            }
        });
    }

    /// Wait for the next route outcome and apply it.
    ///
    /// Returns the route flow afterwards. Returns `None` if the outcome was
    /// stale, and returns it at once when no fetch is in flight.
    pub async fn next_route_outcome(&mut self) -> Option<RouteFlow> {
        if self.routes_in_flight == 0 {
            debug!("no route fetch in flight");
            return None;
        }
        let outcome = self.outcome_rx.recv().await?;
        let current = outcome.generation == self.route_generation;
        self.apply_route_outcome(outcome);
        current.then_some(self.route_flow)
    }

    /// Number of issued route fetches whose outcome has not been applied.
    #[must_use]
    pub const fn routes_in_flight(&self) -> usize {
        self.routes_in_flight
    }

    fn apply_route_outcome(&mut self, outcome: RouteOutcome) {
        self.routes_in_flight = self.routes_in_flight.saturating_sub(1);
        if outcome.generation != self.route_generation {
            debug!(
                generation = outcome.generation,
                latest = self.route_generation,
                "discarding stale route outcome"
            );
            return;
        }
        match outcome.result {
            Ok(route) => self.show_route(route, outcome.origin),
            Err(error) => self.show_route_failure(&error),
        }
    }

    fn show_route(&mut self, route: RouteResult, origin: RouteOrigin) {
        let color = match origin {
            RouteOrigin::Initial => &self.settings.initial_route_color,
            RouteOrigin::UserLocation => &self.settings.user_route_color,
        };
        match self
            .map
            .redraw_route_paths(&route.paths, &PolylineStyle::route(color.as_str()))
        {
            Ok(drawn) => debug!(drawn, stops = route.ordered_stops.len(), "route drawn"),
            Err(error) => log_map_error(&error, "failed to draw route"),
        }
        self.route_text = route.summary_text();
        self.route_flow = RouteFlow::RouteDisplayed;
        self.route = Some(route);
    }

    fn show_route_failure(&mut self, error: &RouteFetchError) {
        warn!(%error, "route fetch failed");
        if let Err(map_error) = self.map.clear_route_paths() {
            log_map_error(&map_error, "failed to clear route");
        }
        self.route = None;
        self.route_text = ROUTE_FAILURE_TEXT.to_owned();
        self.route_flow = RouteFlow::RouteError;
    }

    /// Show the route summary panel.
    pub const fn open_route_modal(&mut self) {
        self.route_modal_open = true;
    }

    /// Hide the route summary panel.
    pub const fn close_route_modal(&mut self) {
        self.route_modal_open = false;
    }

    /// Cancel pending search timers and release the map.
    pub fn teardown(&mut self) {
        self.suggester.cancel_pending();
        self.map.teardown();
        self.lifecycle = Lifecycle::Idle;
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Current route sub-flow state.
    #[must_use]
    pub const fn route_flow(&self) -> RouteFlow {
        self.route_flow
    }

    /// Current search sub-flow state.
    #[must_use]
    pub fn search_flow(&self) -> SearchFlow {
        if self.suggester.current().is_empty() {
            SearchFlow::NoSuggestions
        } else {
            SearchFlow::ShowingSuggestions
        }
    }

    /// Suggestions currently shown.
    #[must_use]
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.suggester.current()
    }

    /// Watch the suggestion list as the suggester publishes it.
    #[must_use]
    pub fn suggestion_updates(&self) -> watch::Receiver<Vec<Suggestion>> {
        self.suggester.subscribe()
    }

    /// Latest successfully fetched route.
    #[must_use]
    pub const fn route(&self) -> Option<&RouteResult> {
        self.route.as_ref()
    }

    /// Route summary text.
    #[must_use]
    pub fn route_text(&self) -> &str {
        &self.route_text
    }

    /// Search field text.
    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Current user location.
    #[must_use]
    pub const fn user_location(&self) -> Coordinate {
        self.user_location
    }

    /// Whether the route summary panel is visible.
    #[must_use]
    pub const fn is_route_modal_open(&self) -> bool {
        self.route_modal_open
    }

    /// The map surface, for inspection.
    #[must_use]
    pub const fn map(&self) -> &MapSurface {
        &self.map
    }
}

#[derive(Debug, thiserror::Error)]
enum StartupFailure {
    #[error("map setup failed: {0}")]
    Map(#[from] MapSurfaceError),
    #[error("startup data fetch failed: {0}")]
    Fetch(#[from] RouteFetchError),
}

fn log_map_error(error: &MapSurfaceError, context: &'static str) {
    match error {
        MapSurfaceError::NotInitialized => debug!(%error, "{context}"),
        MapSurfaceError::Canvas(_) => warn!(%error, "{context}"),
    }
}
