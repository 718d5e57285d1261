//! Points of interest and computed sightseeing routes.

use super::coordinate::{Coordinate, LonLat};

/// Route summary shown before any route has been loaded, and for routes
/// without stops.
pub const NO_ROUTE_TEXT: &str = "Không có lộ trình.";
/// Route summary shown when a route fetch fails.
pub const ROUTE_FAILURE_TEXT: &str = "Không thể tìm đường đi (kiểm tra API server).";
/// Route summary shown when startup data cannot be loaded.
pub const INIT_FAILURE_TEXT: &str = "Lỗi tải dữ liệu ban đầu (kiểm tra API server).";

/// A named sightseeing location served by the routing backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    /// Display name.
    pub name: String,
    /// Marker position.
    pub coordinate: Coordinate,
}

/// One stop in the visiting order of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStop {
    /// Display name of the stop.
    pub name: String,
}

/// One polyline of a route, in backend `[longitude, latitude]` order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoutePath(Vec<LonLat>);

impl RoutePath {
    /// Wrap a sequence of wire-order positions.
    #[must_use]
    pub const fn new(points: Vec<LonLat>) -> Self {
        Self(points)
    }

    /// Number of positions in the path.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no positions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Positions swapped into latitude-first order for rendering.
    ///
    /// ```
    /// use sightseeing_client::domain::{Coordinate, LonLat, RoutePath};
    ///
    /// let path = RoutePath::new(vec![LonLat::from([106.70, 10.78])]);
    /// assert_eq!(path.to_coordinates(), vec![Coordinate::new(10.78, 106.70)]);
    /// ```
    #[must_use]
    pub fn to_coordinates(&self) -> Vec<Coordinate> {
        self.0.iter().copied().map(Coordinate::from).collect()
    }
}

impl From<Vec<[f64; 2]>> for RoutePath {
    fn from(pairs: Vec<[f64; 2]>) -> Self {
        Self(pairs.into_iter().map(LonLat::from).collect())
    }
}

/// A complete route description returned by the routing backend.
///
/// Every fetch replaces the previous value wholesale.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteResult {
    /// Stops in visiting order.
    pub ordered_stops: Vec<RouteStop>,
    /// Total tour length as reported by the backend.
    pub total_distance_meters: f64,
    /// Road geometry, one path per leg.
    pub paths: Vec<RoutePath>,
}

impl RouteResult {
    /// Whether the backend returned a route without stops.
    #[must_use]
    pub const fn has_no_stops(&self) -> bool {
        self.ordered_stops.is_empty()
    }

    /// Human-readable summary for the route panel.
    ///
    /// The unit label is `m` even though the backend field is named
    /// `total_distance_km`.
    ///
    /// ```
    /// use sightseeing_client::domain::{RouteResult, RouteStop};
    ///
    /// let route = RouteResult {
    ///     ordered_stops: vec![
    ///         RouteStop { name: "stopA".to_owned() },
    ///         RouteStop { name: "stopB".to_owned() },
    ///     ],
    ///     total_distance_meters: 1234.5,
    ///     paths: Vec::new(),
    /// };
    /// assert_eq!(route.summary_text(), "stopA -> stopB (Tổng: 1234.50 m)");
    /// ```
    #[must_use]
    pub fn summary_text(&self) -> String {
        if self.has_no_stops() {
            return NO_ROUTE_TEXT.to_owned();
        }
        let stops = self
            .ordered_stops
            .iter()
            .map(|stop| stop.name.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");
        format!("{stops} (Tổng: {:.2} m)", self.total_distance_meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops(names: &[&str]) -> Vec<RouteStop> {
        names
            .iter()
            .map(|name| RouteStop {
                name: (*name).to_owned(),
            })
            .collect()
    }

    #[test]
    fn summary_rounds_distance_to_two_decimals() {
        let route = RouteResult {
            ordered_stops: stops(&["Dinh Độc Lập", "Nhà thờ Đức Bà", "Dinh Độc Lập"]),
            total_distance_meters: 1_523.5,
            paths: Vec::new(),
        };
        assert_eq!(
            route.summary_text(),
            "Dinh Độc Lập -> Nhà thờ Đức Bà -> Dinh Độc Lập (Tổng: 1523.50 m)"
        );
    }

    #[test]
    fn summary_for_route_without_stops_reads_as_no_route() {
        assert_eq!(RouteResult::default().summary_text(), NO_ROUTE_TEXT);
    }

    #[test]
    fn path_swaps_axis_order_for_rendering() {
        let path = RoutePath::from(vec![[106.70, 10.78], [106.71, 10.79]]);
        assert_eq!(path.len(), 2);
        assert_eq!(
            path.to_coordinates(),
            vec![Coordinate::new(10.78, 106.70), Coordinate::new(10.79, 106.71)]
        );
    }
}
