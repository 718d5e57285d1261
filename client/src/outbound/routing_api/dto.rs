//! DTOs for decoding routing backend responses.
//!
//! The tour endpoints omit fields freely, so every tour field defaults to
//! empty. Stops carry coordinates on the wire but only names are kept.

use serde::Deserialize;

use crate::domain::{Coordinate, LonLat, PointOfInterest, RoutePath, RouteResult, RouteStop};

#[derive(Debug, Deserialize)]
pub(super) struct PointOfInterestDto {
    pub(super) name: String,
    pub(super) lat: f64,
    pub(super) lng: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct RouteStopDto {
    pub(super) name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RouteResponseDto {
    #[serde(default)]
    pub(super) route: Vec<RouteStopDto>,
    #[serde(default)]
    pub(super) total_distance_km: f64,
    #[serde(default)]
    pub(super) route_paths: Vec<Vec<LonLat>>,
}

impl From<PointOfInterestDto> for PointOfInterest {
    fn from(dto: PointOfInterestDto) -> Self {
        Self {
            name: dto.name,
            coordinate: Coordinate::new(dto.lat, dto.lng),
        }
    }
}

impl From<RouteResponseDto> for RouteResult {
    fn from(dto: RouteResponseDto) -> Self {
        Self {
            ordered_stops: dto
                .route
                .into_iter()
                .map(|stop| RouteStop { name: stop.name })
                .collect(),
            total_distance_meters: dto.total_distance_km,
            paths: dto.route_paths.into_iter().map(RoutePath::new).collect(),
        }
    }
}
