//! Reqwest-backed Nominatim geocoder adapter.
//!
//! This adapter owns transport details only: query construction, timeout and
//! HTTP error mapping, and JSON decoding into domain suggestions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::PlaceDto;
use crate::domain::Suggestion;
use crate::domain::ports::{Geocoder, GeocoderError};
use crate::outbound::body_preview;

/// Public Nominatim search endpoint.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const DEFAULT_USER_AGENT: &str = "sightseeing-client/0.1";
const RESULT_LIMIT: &str = "5";

/// Outbound identity for Nominatim requests.
///
/// The public instance's usage policy requires an identifying user agent.
pub struct NominatimIdentity {
    /// HTTP user-agent sent to Nominatim.
    pub user_agent: String,
}

impl Default for NominatimIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Geocoder adapter performing HTTP GET searches against one endpoint.
pub struct NominatimGeocoder {
    client: Client,
    endpoint: Url,
    user_agent: String,
}

impl NominatimGeocoder {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let geocoder = NominatimGeocoder::new(endpoint, Duration::from_secs(10));
    /// assert!(geocoder.is_ok() || geocoder.is_err());
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_identity(endpoint, timeout, NominatimIdentity::default())
    }

    /// Build an adapter with an explicit outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        endpoint: Url,
        timeout: Duration,
        identity: NominatimIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            user_agent: identity.user_agent,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, GeocoderError> {
        let url = search_url(&self.endpoint, query);
        debug!(%url, "geocoder search");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_suggestions(body.as_ref())
    }
}

fn search_url(endpoint: &Url, query: &str) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("format", "json")
        .append_pair("limit", RESULT_LIMIT);
    url
}

fn parse_suggestions(body: &[u8]) -> Result<Vec<Suggestion>, GeocoderError> {
    let places: Vec<PlaceDto> = serde_json::from_slice(body).map_err(|error| {
        GeocoderError::decode(format!("invalid Nominatim JSON payload: {error}"))
    })?;
    Ok(places
        .into_iter()
        .filter_map(PlaceDto::into_suggestion)
        .collect())
}

fn map_transport_error(error: reqwest::Error) -> GeocoderError {
    if error.is_timeout() {
        GeocoderError::timeout(error.to_string())
    } else {
        GeocoderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GeocoderError {
    GeocoderError::status(status.as_u16(), body_preview(body))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Nominatim mapping helpers.

    use super::*;
    use crate::domain::{Coordinate, SuggestionId};

    fn endpoint() -> Url {
        Url::parse(DEFAULT_NOMINATIM_URL).expect("static URL parses")
    }

    #[test]
    fn search_url_encodes_query_and_fixes_format_and_limit() {
        let url = search_url(&endpoint(), "Chợ Bến Thành & co");

        let pairs = url.query_pairs().into_owned().collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![
                ("q".to_owned(), "Chợ Bến Thành & co".to_owned()),
                ("format".to_owned(), "json".to_owned()),
                ("limit".to_owned(), "5".to_owned()),
            ]
        );
        assert!(
            !url.as_str().contains(' '),
            "query text must be percent-encoded"
        );
    }

    #[test]
    fn parses_places_with_numeric_and_string_ids() {
        let body = r#"[
            {"place_id": 42, "display_name": "Quận 3, Thành phố Hồ Chí Minh",
             "lat": "10.8231", "lon": "106.6297", "importance": 0.6},
            {"place_id": "N123", "display_name": "Chợ Bến Thành",
             "lat": "10.7726", "lon": "106.6982"}
        ]"#;

        let suggestions = parse_suggestions(body.as_bytes()).expect("JSON should decode");

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].id, SuggestionId::Number(42));
        assert_eq!(suggestions[0].coordinate, Coordinate::new(10.8231, 106.6297));
        assert_eq!(suggestions[1].id, SuggestionId::Text("N123".to_owned()));
        assert_eq!(suggestions[1].label, "Chợ Bến Thành");
    }

    #[test]
    fn drops_places_with_unparsable_coordinates() {
        let body = r#"[
            {"place_id": 1, "display_name": "Broken", "lat": "north", "lon": "106.1"},
            {"place_id": 2, "display_name": "Fine", "lat": "10.1", "lon": "106.1"}
        ]"#;

        let suggestions = parse_suggestions(body.as_bytes()).expect("JSON should decode");

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].label, "Fine");
    }

    #[test]
    fn rejects_non_array_payloads() {
        let error = parse_suggestions(br#"{"error": "Unable to geocode"}"#)
            .expect_err("decode should fail");
        assert!(
            matches!(error, GeocoderError::Decode { .. }),
            "object payloads should map to Decode errors",
        );
    }

    #[test]
    fn status_errors_carry_code_and_body_preview() {
        let error = map_status_error(StatusCode::TOO_MANY_REQUESTS, b"  slow   down  ");
        assert_eq!(error, GeocoderError::status(429_u16, "slow down"));
    }
}
