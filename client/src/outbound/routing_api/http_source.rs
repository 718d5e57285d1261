//! Reqwest-backed routing backend adapter.
//!
//! Endpoints resolve relative to a base URL ending in `/`, so a base of
//! `http://host/api/` yields `http://host/api/locations`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{PointOfInterestDto, RouteResponseDto};
use crate::domain::ports::{RouteClient, RouteFetchError};
use crate::domain::{Coordinate, PointOfInterest, RouteResult};
use crate::outbound::body_preview;

/// Base URL of a locally running backend.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api/";

const LOCATIONS_PATH: &str = "locations";
const TOUR_PATH: &str = "tsp";
const TOUR_FROM_USER_PATH: &str = "tsp/from_user";

/// Route client performing HTTP GET requests against the tour API.
pub struct HttpRouteClient {
    client: Client,
    base: Url,
}

impl HttpRouteClient {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// A missing trailing `/` on `base` is added so relative joins keep the
    /// last path segment.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: with_trailing_slash(base),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RouteFetchError> {
        self.base.join(path).map_err(|error| {
            RouteFetchError::transport(format!("invalid endpoint {path}: {error}"))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RouteFetchError> {
        debug!(%url, "route backend request");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        decode(body.as_ref())
    }
}

#[async_trait]
impl RouteClient for HttpRouteClient {
    async fn points_of_interest(&self) -> Result<Vec<PointOfInterest>, RouteFetchError> {
        let points: Vec<PointOfInterestDto> =
            self.get_json(self.endpoint(LOCATIONS_PATH)?).await?;
        Ok(points.into_iter().map(PointOfInterest::from).collect())
    }

    async fn initial_route(&self) -> Result<RouteResult, RouteFetchError> {
        let route: RouteResponseDto = self.get_json(self.endpoint(TOUR_PATH)?).await?;
        Ok(route.into())
    }

    async fn route_from_location(
        &self,
        origin: Coordinate,
    ) -> Result<RouteResult, RouteFetchError> {
        let url = from_user_url(self.endpoint(TOUR_FROM_USER_PATH)?, origin);
        let route: RouteResponseDto = self.get_json(url).await?;
        Ok(route.into())
    }
}

fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn from_user_url(mut url: Url, origin: Coordinate) -> Url {
    url.query_pairs_mut()
        .append_pair("lat", &origin.lat.to_string())
        .append_pair("lng", &origin.lng.to_string());
    url
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RouteFetchError> {
    serde_json::from_slice(body).map_err(|error| {
        RouteFetchError::decode(format!("invalid route backend JSON payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> RouteFetchError {
    if error.is_timeout() {
        RouteFetchError::timeout(error.to_string())
    } else {
        RouteFetchError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RouteFetchError {
    RouteFetchError::status(status.as_u16(), body_preview(body))
}
