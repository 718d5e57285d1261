//! Geographic coordinate primitives.
//!
//! The backend speaks `[longitude, latitude]` in route geometry while the map
//! canvas and every other endpoint speak latitude first. [`LonLat`] keeps the
//! wire order explicit so the swap happens in exactly one place.

use serde::{Deserialize, Serialize};

/// A WGS84 position in latitude-first order.
///
/// Values outside the valid geographic range are accepted; consumers decide
/// whether a coordinate is usable through [`Coordinate::is_usable`].
///
/// # Examples
/// ```
/// use sightseeing_client::domain::Coordinate;
///
/// let here = Coordinate::new(10.7769, 106.6953);
/// assert!(here.is_usable());
/// assert!(!Coordinate::new(f64::NAN, 106.6953).is_usable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coordinate {
    /// Build a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Return whether both components are finite numbers.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Parse a coordinate from the string pair geocoders return.
    ///
    /// Returns `None` when either component does not parse to a finite value.
    ///
    /// ```
    /// use sightseeing_client::domain::Coordinate;
    ///
    /// let parsed = Coordinate::parse("10.8231", "106.6297");
    /// assert_eq!(parsed, Some(Coordinate::new(10.8231, 106.6297)));
    /// assert_eq!(Coordinate::parse("north", "106.6297"), None);
    /// ```
    #[must_use]
    pub fn parse(raw_lat: &str, raw_lng: &str) -> Option<Self> {
        let lat = raw_lat.trim().parse::<f64>().ok()?;
        let lng = raw_lng.trim().parse::<f64>().ok()?;
        let coordinate = Self::new(lat, lng);
        coordinate.is_usable().then_some(coordinate)
    }
}

/// A position in backend route-geometry order: longitude, then latitude.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct LonLat {
    /// Longitude in degrees.
    pub lng: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl From<[f64; 2]> for LonLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<LonLat> for Coordinate {
    fn from(position: LonLat) -> Self {
        Self::new(position.lat, position.lng)
    }
}
