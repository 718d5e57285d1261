//! Driven port for free-text place search.
//!
//! The domain owns the suggestion shape so the debounce logic in
//! [`crate::domain::GeocodeSuggester`] stays adapter-agnostic.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::Suggestion;

define_port_error! {
    /// Errors surfaced while querying a geocoding service.
    pub enum GeocoderError {
        /// Network transport failed before a response arrived.
        Transport {
            /// Transport error text.
            message: String,
        } =>
            "geocoder transport failed: {message}",
        /// The request exceeded the client timeout.
        Timeout {
            /// Timeout error text.
            message: String,
        } =>
            "geocoder timeout: {message}",
        /// The service answered with a non-success status.
        Status {
            /// HTTP status code.
            status: u16,
            /// Preview of the response body.
            message: String,
        } =>
            "geocoder returned status {status}: {message}",
        /// The response body could not be decoded.
        Decode {
            /// Decoder error text.
            message: String,
        } =>
            "geocoder response decode failed: {message}",
    }
}

/// Port for looking up places matching free text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Return place suggestions for `query`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use sightseeing_client::domain::ports::{FixtureGeocoder, Geocoder};
    ///
    /// let suggestions = FixtureGeocoder.search("Ben Thanh").await?;
    /// assert!(suggestions.is_empty());
    /// # Ok::<(), sightseeing_client::domain::ports::GeocoderError>(())
    /// ```
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, GeocoderError>;
}

/// Fixture implementation returning no suggestions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureGeocoder;

#[async_trait]
impl Geocoder for FixtureGeocoder {
    async fn search(&self, _query: &str) -> Result<Vec<Suggestion>, GeocoderError> {
        Ok(Vec::new())
    }
}
