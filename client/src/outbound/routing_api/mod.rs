//! Routing backend outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `RouteClient` port
//! for the sightseeing tour API.

mod dto;
mod http_source;

pub use http_source::{DEFAULT_API_BASE_URL, HttpRouteClient};
