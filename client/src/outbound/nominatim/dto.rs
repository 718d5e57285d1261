//! DTOs for decoding Nominatim search responses.
//!
//! Nominatim reports coordinates as strings and identifiers as numbers or
//! strings depending on deployment; both are normalized here.

use serde::Deserialize;
use tracing::debug;

use crate::domain::{Coordinate, Suggestion, SuggestionId};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum PlaceIdDto {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaceDto {
    pub(super) place_id: PlaceIdDto,
    pub(super) display_name: String,
    pub(super) lat: String,
    pub(super) lon: String,
}

impl From<PlaceIdDto> for SuggestionId {
    fn from(id: PlaceIdDto) -> Self {
        match id {
            PlaceIdDto::Number(value) => Self::Number(value),
            PlaceIdDto::Text(value) => Self::Text(value),
        }
    }
}

impl PlaceDto {
    /// Convert into a suggestion, dropping places whose coordinates do not
    /// parse to finite numbers.
    pub(super) fn into_suggestion(self) -> Option<Suggestion> {
        let Some(coordinate) = Coordinate::parse(&self.lat, &self.lon) else {
            debug!(
                label = %self.display_name,
                lat = %self.lat,
                lon = %self.lon,
                "dropping place with unusable coordinates"
            );
            return None;
        };
        Some(Suggestion {
            id: self.place_id.into(),
            label: self.display_name,
            coordinate,
        })
    }
}
