//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **nominatim**: reqwest-backed `Geocoder` over the Nominatim search API
//! - **routing_api**: reqwest-backed `RouteClient` over the tour backend
//! - **headless_canvas**: in-memory `MapCanvas` for terminal sessions and tests
//!
//! Adapters are thin translators between wire formats and domain types. They
//! contain no business logic.

pub mod headless_canvas;
pub mod nominatim;
pub mod routing_api;

/// Whitespace-collapsed, truncated response body for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::body_preview;

    #[test]
    fn long_bodies_are_truncated_with_ellipsis() {
        let body = "x".repeat(200);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn non_utf8_bytes_do_not_fail() {
        assert_eq!(body_preview(&[0xff, b'o', b'k']), "\u{fffd}ok");
    }
}
