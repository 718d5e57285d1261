//! Shared test doubles for suggester and controller tests.
//!
//! Doubles delay with `tokio::time::sleep`, so tests on a paused clock can
//! script which request resolves first.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{Geocoder, GeocoderError, RouteClient, RouteFetchError};
use crate::domain::{
    Coordinate, PointOfInterest, RoutePath, RouteResult, RouteStop, Suggestion, SuggestionId,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build a suggestion with a numeric identifier.
#[must_use]
pub fn suggestion(id: i64, label: &str, lat: f64, lng: f64) -> Suggestion {
    Suggestion {
        id: SuggestionId::Number(id),
        label: label.to_owned(),
        coordinate: Coordinate::new(lat, lng),
    }
}

/// Build a point of interest.
#[must_use]
pub fn point_of_interest(name: &str, lat: f64, lng: f64) -> PointOfInterest {
    PointOfInterest {
        name: name.to_owned(),
        coordinate: Coordinate::new(lat, lng),
    }
}

/// Build a route from stop names, a distance, and `[lng, lat]` paths.
#[must_use]
pub fn route(stops: &[&str], total_distance_meters: f64, paths: Vec<Vec<[f64; 2]>>) -> RouteResult {
    RouteResult {
        ordered_stops: stops
            .iter()
            .map(|name| RouteStop {
                name: (*name).to_owned(),
            })
            .collect(),
        total_distance_meters,
        paths: paths.into_iter().map(RoutePath::from).collect(),
    }
}

/// Geocoder double with per-query answers, delays, and a call log.
#[derive(Default)]
pub struct ScriptedGeocoder {
    answers: HashMap<String, Result<Vec<Suggestion>, GeocoderError>>,
    delays: HashMap<String, Duration>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedGeocoder {
    /// Answer `query` with `suggestions`.
    #[must_use]
    pub fn respond(mut self, query: &str, suggestions: Vec<Suggestion>) -> Self {
        self.answers.insert(query.to_owned(), Ok(suggestions));
        self
    }

    /// Answer `query` with `error`.
    #[must_use]
    pub fn fail(mut self, query: &str, error: GeocoderError) -> Self {
        self.answers.insert(query.to_owned(), Err(error));
        self
    }

    /// Hold the answer to `query` for `delay`.
    #[must_use]
    pub fn delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_owned(), delay);
        self
    }

    /// Queries received so far, in call order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, GeocoderError> {
        lock(&self.queries).push(query.to_owned());
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        self.answers
            .get(query)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// One scripted answer for `route_from_location`.
pub struct ScriptedRoute {
    /// How long the request stays in flight.
    pub delay: Duration,
    /// The answer returned after the delay.
    pub result: Result<RouteResult, RouteFetchError>,
}

/// Route client double with scripted answers and a call log.
pub struct ScriptedRouteClient {
    points: Result<Vec<PointOfInterest>, RouteFetchError>,
    initial: Result<RouteResult, RouteFetchError>,
    from_location: Mutex<VecDeque<ScriptedRoute>>,
    origins: Mutex<Vec<Coordinate>>,
    initial_calls: Mutex<usize>,
}

impl Default for ScriptedRouteClient {
    fn default() -> Self {
        Self {
            points: Ok(Vec::new()),
            initial: Ok(RouteResult::default()),
            from_location: Mutex::new(VecDeque::new()),
            origins: Mutex::new(Vec::new()),
            initial_calls: Mutex::new(0),
        }
    }
}

impl ScriptedRouteClient {
    /// Answer the points-of-interest endpoint.
    #[must_use]
    pub fn with_points(mut self, points: Result<Vec<PointOfInterest>, RouteFetchError>) -> Self {
        self.points = points;
        self
    }

    /// Answer the initial-route endpoint.
    #[must_use]
    pub fn with_initial_route(mut self, route: Result<RouteResult, RouteFetchError>) -> Self {
        self.initial = route;
        self
    }

    /// Queue an immediate answer for the next route-from-location call.
    #[must_use]
    pub fn then_route(self, result: Result<RouteResult, RouteFetchError>) -> Self {
        self.then_route_after(Duration::ZERO, result)
    }

    /// Queue a delayed answer for the next route-from-location call.
    #[must_use]
    pub fn then_route_after(
        self,
        delay: Duration,
        result: Result<RouteResult, RouteFetchError>,
    ) -> Self {
        lock(&self.from_location).push_back(ScriptedRoute { delay, result });
        self
    }

    /// Origins passed to `route_from_location`, in call order.
    #[must_use]
    pub fn origins(&self) -> Vec<Coordinate> {
        lock(&self.origins).clone()
    }

    /// Number of initial-route calls.
    #[must_use]
    pub fn initial_calls(&self) -> usize {
        *lock(&self.initial_calls)
    }
}

#[async_trait]
impl RouteClient for ScriptedRouteClient {
    async fn points_of_interest(&self) -> Result<Vec<PointOfInterest>, RouteFetchError> {
        self.points.clone()
    }

    async fn initial_route(&self) -> Result<RouteResult, RouteFetchError> {
        *lock(&self.initial_calls) += 1;
        self.initial.clone()
    }

    async fn route_from_location(
        &self,
        origin: Coordinate,
    ) -> Result<RouteResult, RouteFetchError> {
        lock(&self.origins).push(origin);
        let scripted = lock(&self.from_location).pop_front();
        let Some(ScriptedRoute { delay, result }) = scripted else {
            return Err(RouteFetchError::transport("route script exhausted"));
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}
