//! Driven port for the sightseeing routing backend.
//!
//! The backend computes the tour; this client only consumes its three read
//! endpoints. Adapters own transport details and body validation, and hand
//! back normalized domain values.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Coordinate, PointOfInterest, RouteResult};

define_port_error! {
    /// Errors surfaced while talking to the routing backend.
    pub enum RouteFetchError {
        /// Network transport failed before a response arrived.
        Transport {
            /// Transport error text.
            message: String,
        } =>
            "route backend transport failed: {message}",
        /// The request exceeded the client timeout.
        Timeout {
            /// Timeout error text.
            message: String,
        } =>
            "route backend timeout: {message}",
        /// The backend answered with a non-success status.
        Status {
            /// HTTP status code.
            status: u16,
            /// Preview of the response body.
            message: String,
        } =>
            "route backend returned status {status}: {message}",
        /// The response body did not match the expected schema.
        Decode {
            /// Decoder error text.
            message: String,
        } =>
            "route backend response decode failed: {message}",
    }
}

/// Port for fetching points of interest and computed routes.
///
/// Calls are single request/response exchanges with no retry. Degenerate but
/// well-formed answers (no stops, no paths) are returned as `Ok`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteClient: Send + Sync {
    /// Fetch the fixed set of points of interest.
    async fn points_of_interest(&self) -> Result<Vec<PointOfInterest>, RouteFetchError>;

    /// Fetch the tour over all points of interest, starting at the first one.
    async fn initial_route(&self) -> Result<RouteResult, RouteFetchError>;

    /// Fetch a tour that starts at `origin`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use sightseeing_client::domain::Coordinate;
    /// use sightseeing_client::domain::ports::{FixtureRouteClient, RouteClient};
    ///
    /// let route = FixtureRouteClient
    ///     .route_from_location(Coordinate::new(10.8231, 106.6297))
    ///     .await?;
    /// assert!(route.has_no_stops());
    /// # Ok::<(), sightseeing_client::domain::ports::RouteFetchError>(())
    /// ```
    async fn route_from_location(&self, origin: Coordinate)
    -> Result<RouteResult, RouteFetchError>;
}

/// Fixture implementation returning empty data.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureRouteClient;

#[async_trait]
impl RouteClient for FixtureRouteClient {
    async fn points_of_interest(&self) -> Result<Vec<PointOfInterest>, RouteFetchError> {
        Ok(Vec::new())
    }

    async fn initial_route(&self) -> Result<RouteResult, RouteFetchError> {
        Ok(RouteResult::default())
    }

    async fn route_from_location(
        &self,
        _origin: Coordinate,
    ) -> Result<RouteResult, RouteFetchError> {
        Ok(RouteResult::default())
    }
}
