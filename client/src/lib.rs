//! Sightseeing map client core.
//!
//! Debounced place search, map session state, and route redraw coordination
//! for a sightseeing tour client, independent of any rendering toolkit.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
