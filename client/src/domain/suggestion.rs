//! Place suggestions produced by geocoding search.

use std::fmt;

use super::coordinate::Coordinate;

/// Geocoder-assigned identifier; some providers use numbers, others strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SuggestionId {
    /// Numeric identifier.
    Number(i64),
    /// Opaque string identifier.
    Text(String),
}

impl fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// One selectable place returned for a search query.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Provider identifier, used as the list key.
    pub id: SuggestionId,
    /// Full display label.
    pub label: String,
    /// Position of the place.
    pub coordinate: Coordinate,
}
