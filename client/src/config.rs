//! Client configuration loaded via OrthoConfig.
//!
//! Every field is optional; accessors fall back to the defaults the client
//! ships with. Environment variables use the `SIGHTSEEING_` prefix, for
//! example `SIGHTSEEING_API_BASE_URL`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{
    ControllerSettings, Coordinate, DEFAULT_LOCATION, DEFAULT_ZOOM, SuggesterConfig,
};
use crate::outbound::nominatim::DEFAULT_NOMINATIM_URL;
use crate::outbound::routing_api::DEFAULT_API_BASE_URL;

const DEFAULT_USER_AGENT: &str = "sightseeing-client/0.1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_BLUR_GRACE_MS: u64 = 200;

/// Errors raised while turning settings into runtime values.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A configured URL did not parse.
    #[error("invalid {field}: {source}")]
    InvalidUrl {
        /// Name of the offending setting.
        field: &'static str,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
}

/// Configuration values for backend endpoints, search timing, and the map.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SIGHTSEEING")]
pub struct ClientSettings {
    /// Base URL of the tour API.
    pub api_base_url: Option<String>,
    /// Geocoder search endpoint.
    pub geocoder_url: Option<String>,
    /// User agent sent to the geocoder.
    pub user_agent: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Search quiet period in milliseconds.
    pub debounce_ms: Option<u64>,
    /// Delay before hiding suggestions after blur, in milliseconds.
    pub blur_grace_ms: Option<u64>,
    /// Starting latitude.
    pub default_latitude: Option<f64>,
    /// Starting longitude.
    pub default_longitude: Option<f64>,
    /// Starting zoom.
    pub zoom: Option<u8>,
    /// Skip drawing the backend's fixed tour at startup.
    #[ortho_config(default = false)]
    pub skip_initial_route: bool,
}

impl ClientSettings {
    /// Return the tour API base URL, falling back to the local backend.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the value does not parse.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "api_base_url",
            self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        )
    }

    /// Return the geocoder endpoint, falling back to public Nominatim.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the value does not parse.
    pub fn geocoder_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "geocoder_url",
            self.geocoder_url.as_deref().unwrap_or(DEFAULT_NOMINATIM_URL),
        )
    }

    /// Return the geocoder user agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Return the per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
                .max(1),
        )
    }

    /// Return search timing knobs.
    #[must_use]
    pub fn suggester_config(&self) -> SuggesterConfig {
        SuggesterConfig {
            quiet_period: Duration::from_millis(self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)),
            blur_grace: Duration::from_millis(
                self.blur_grace_ms.unwrap_or(DEFAULT_BLUR_GRACE_MS),
            ),
        }
    }

    /// Return controller settings with configured overrides applied.
    #[must_use]
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            default_location: Coordinate::new(
                self.default_latitude.unwrap_or(DEFAULT_LOCATION.lat),
                self.default_longitude.unwrap_or(DEFAULT_LOCATION.lng),
            ),
            zoom: self.zoom.unwrap_or(DEFAULT_ZOOM),
            load_initial_route: !self.skip_initial_route,
            ..ControllerSettings::default()
        }
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|source| SettingsError::InvalidUrl { field, source })
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "SIGHTSEEING_API_BASE_URL",
        "SIGHTSEEING_GEOCODER_URL",
        "SIGHTSEEING_USER_AGENT",
        "SIGHTSEEING_REQUEST_TIMEOUT_SECS",
        "SIGHTSEEING_DEBOUNCE_MS",
        "SIGHTSEEING_BLUR_GRACE_MS",
        "SIGHTSEEING_DEFAULT_LATITUDE",
        "SIGHTSEEING_DEFAULT_LONGITUDE",
        "SIGHTSEEING_ZOOM",
        "SIGHTSEEING_SKIP_INITIAL_ROUTE",
    ];

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("sightseeing-client")])
            .expect("config should load")
    }

    const fn unset() -> ClientSettings {
        ClientSettings {
            api_base_url: None,
            geocoder_url: None,
            user_agent: None,
            request_timeout_secs: None,
            debounce_ms: None,
            blur_grace_ms: None,
            default_latitude: None,
            default_longitude: None,
            zoom: None,
            skip_initial_route: false,
        }
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, raw)| (*raw).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.api_base_url().expect("default URL").as_str(),
            "http://localhost:5000/api/"
        );
        assert_eq!(
            settings.geocoder_url().expect("default URL").as_str(),
            "https://nominatim.openstreetmap.org/search"
        );
        assert_eq!(settings.user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.suggester_config(), SuggesterConfig::default());
        assert!(!settings.skip_initial_route);
        assert_eq!(settings.controller_settings(), ControllerSettings::default());
        assert!(settings.controller_settings().load_initial_route);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("SIGHTSEEING_API_BASE_URL", "http://tours.internal:8080/api/"),
            ("SIGHTSEEING_DEBOUNCE_MS", "250"),
            ("SIGHTSEEING_DEFAULT_LATITUDE", "10.8231"),
            ("SIGHTSEEING_DEFAULT_LONGITUDE", "106.6297"),
            ("SIGHTSEEING_ZOOM", "13"),
            ("SIGHTSEEING_SKIP_INITIAL_ROUTE", "true"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.api_base_url().expect("configured URL").as_str(),
            "http://tours.internal:8080/api/"
        );
        assert_eq!(
            settings.suggester_config().quiet_period,
            Duration::from_millis(250)
        );
        let controller = settings.controller_settings();
        assert_eq!(
            controller.default_location,
            Coordinate::new(10.8231, 106.6297)
        );
        assert_eq!(controller.zoom, 13);
        assert!(settings.skip_initial_route);
        assert!(!controller.load_initial_route);
    }

    #[rstest]
    fn zero_timeout_is_raised_to_one_second() {
        let settings = ClientSettings {
            request_timeout_secs: Some(0),
            ..unset()
        };
        assert_eq!(settings.request_timeout(), Duration::from_secs(1));
    }

    #[rstest]
    fn unparsable_urls_name_the_setting() {
        let settings = ClientSettings {
            geocoder_url: Some("not a url".to_owned()),
            ..unset()
        };

        let error = settings.geocoder_url().expect_err("URL must fail");

        assert!(matches!(
            error,
            SettingsError::InvalidUrl {
                field: "geocoder_url",
                ..
            }
        ));
    }
}
