//! Debounced place search with latest-request-wins publication.
//!
//! Every edit advances a generation counter. A debounce timer or in-flight
//! request only publishes when its generation is still the latest, so
//! straggling responses are discarded instead of aborted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::Suggestion;
use super::ports::Geocoder;

/// Timing knobs for [`GeocodeSuggester`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggesterConfig {
    /// How long input must stay unchanged before a search is issued.
    pub quiet_period: Duration,
    /// Delay between losing focus and hiding the list, so a selection click
    /// lands first.
    pub blur_grace: Duration,
}

impl Default for SuggesterConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(500),
            blur_grace: Duration::from_millis(200),
        }
    }
}

struct SuggestionFeed {
    geocoder: Arc<dyn Geocoder>,
    latest: AtomicU64,
    published: watch::Sender<Vec<Suggestion>>,
}

impl SuggestionFeed {
    fn advance(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    fn publish(&self, generation: u64, suggestions: Vec<Suggestion>) {
        if self.is_current(generation) {
            self.published.send_replace(suggestions);
        } else {
            debug!(
                generation,
                latest = self.latest.load(Ordering::SeqCst),
                "discarding stale suggestions"
            );
        }
    }

    fn clear(&self) {
        let generation = self.advance();
        self.publish(generation, Vec::new());
    }

    async fn suggestions_for(&self, text: &str) -> Vec<Suggestion> {
        let query = text.trim();
        if query.is_empty() {
            return Vec::new();
        }
        match self.geocoder.search(query).await {
            Ok(suggestions) => suggestions,
            Err(error) => {
                warn!(%error, query, "suggestion lookup failed");
                Vec::new()
            }
        }
    }

    async fn refresh(self: Arc<Self>, query: String, generation: u64) {
        let suggestions = self.suggestions_for(&query).await;
        debug!(generation, query, count = suggestions.len(), "suggestions resolved");
        self.publish(generation, suggestions);
    }
}

/// Debounces search input and publishes place suggestions.
///
/// Must be used from within a Tokio runtime; timers and lookups run as
/// spawned tasks.
pub struct GeocodeSuggester {
    feed: Arc<SuggestionFeed>,
    config: SuggesterConfig,
    timer: Option<JoinHandle<()>>,
    blur_clear: Option<JoinHandle<()>>,
}

impl GeocodeSuggester {
    /// Build a suggester over `geocoder`.
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>, config: SuggesterConfig) -> Self {
        let (published, _) = watch::channel(Vec::new());
        Self {
            feed: Arc::new(SuggestionFeed {
                geocoder,
                latest: AtomicU64::new(0),
                published,
            }),
            config,
            timer: None,
            blur_clear: None,
        }
    }

    /// Watch the published suggestion list.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Suggestion>> {
        self.feed.published.subscribe()
    }

    /// Snapshot of the published suggestion list.
    #[must_use]
    pub fn current(&self) -> Vec<Suggestion> {
        self.feed.published.borrow().clone()
    }

    /// Look up suggestions for `text` right away, without debounce or
    /// publication. Blank text and lookup failures both yield an empty list.
    pub async fn suggestions_for(&self, text: &str) -> Vec<Suggestion> {
        self.feed.suggestions_for(text).await
    }

    /// Restart the quiet-period timer for new input.
    ///
    /// Blank input clears the list immediately without a lookup.
    pub fn on_text_change(&mut self, text: &str) {
        self.cancel_blur_clear();
        self.cancel_timer();
        let generation = self.feed.advance();

        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.feed.publish(generation, Vec::new());
            return;
        }

        let feed = Arc::clone(&self.feed);
        let query = trimmed.to_owned();
        let quiet_period = self.config.quiet_period;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            if feed.is_current(generation) {
                // Detached so a later timer cancellation never aborts transport.
                tokio::spawn(feed.refresh(query, generation));
            }
        }));
    }

    /// Refresh immediately when the field regains focus with text in it.
    pub fn on_focus(&mut self, text: &str) {
        self.cancel_blur_clear();
        let query = text.trim();
        if query.is_empty() {
            return;
        }
        self.cancel_timer();
        let generation = self.feed.advance();
        tokio::spawn(Arc::clone(&self.feed).refresh(query.to_owned(), generation));
    }

    /// Hide the list after the blur grace delay.
    ///
    /// A lookup still waiting out its quiet period is dropped; focusing the
    /// field again looks the text up without delay.
    pub fn on_blur(&mut self) {
        self.cancel_timer();
        self.cancel_blur_clear();
        let feed = Arc::clone(&self.feed);
        let grace = self.config.blur_grace;
        self.blur_clear = Some(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            feed.clear();
        }));
    }

    /// Drop the list now and invalidate anything pending or in flight.
    pub fn clear(&mut self) {
        self.cancel_pending();
        self.feed.clear();
    }

    /// Cancel the debounce timer and any scheduled blur clear.
    pub fn cancel_pending(&mut self) {
        self.cancel_timer();
        self.cancel_blur_clear();
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn cancel_blur_clear(&mut self) {
        if let Some(pending) = self.blur_clear.take() {
            pending.abort();
        }
    }
}

impl Drop for GeocodeSuggester {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    //! Timing tests run on a paused clock so debounce windows are exact.

    use super::*;
    use crate::domain::ports::{GeocoderError, MockGeocoder};
    use crate::test_support::{ScriptedGeocoder, suggestion};
    use rstest::rstest;

    const QUIET: Duration = Duration::from_millis(500);

    fn suggester(geocoder: Arc<dyn Geocoder>) -> GeocodeSuggester {
        GeocodeSuggester::new(geocoder, SuggesterConfig::default())
    }

    async fn settle(duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn labels(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.label.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_issues_one_lookup_with_final_text() {
        let geocoder = Arc::new(ScriptedGeocoder::default());
        let mut suggester = suggester(geocoder.clone());

        for text in ["b", "be", "ben", "ben t", "ben thanh"] {
            suggester.on_text_change(text);
            settle(Duration::from_millis(120)).await;
        }
        assert!(geocoder.queries().is_empty(), "quiet period not yet elapsed");

        settle(QUIET).await;

        assert_eq!(geocoder.queries(), vec!["ben thanh".to_owned()]);
    }

    #[tokio::test(start_paused = true)]
    async fn later_request_wins_over_slow_straggler() {
        let geocoder = Arc::new(
            ScriptedGeocoder::default()
                .respond("slow", vec![suggestion(1, "Slow Place", 10.0, 106.0)])
                .delay("slow", Duration::from_secs(3))
                .respond("fast", vec![suggestion(2, "Fast Place", 10.1, 106.1)]),
        );
        let mut suggester = suggester(geocoder.clone());

        suggester.on_text_change("slow");
        settle(QUIET + Duration::from_millis(10)).await;
        suggester.on_text_change("fast");
        settle(QUIET + Duration::from_millis(10)).await;
        assert_eq!(labels(&suggester.current()), vec!["Fast Place"]);

        settle(Duration::from_secs(5)).await;

        assert_eq!(geocoder.queries(), vec!["slow".to_owned(), "fast".to_owned()]);
        assert_eq!(labels(&suggester.current()), vec!["Fast Place"]);
    }

    #[rstest]
    #[case::empty("")]
    #[case::spaces("   ")]
    #[case::tabs("\t\n")]
    #[tokio::test(start_paused = true)]
    async fn blank_text_never_hits_the_network(#[case] text: &str) {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_search().never();
        let mut suggester = suggester(Arc::new(geocoder));

        suggester.on_text_change(text);
        settle(QUIET * 2).await;

        assert!(suggester.current().is_empty());
        assert!(suggester.suggestions_for(text).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn blank_text_clears_a_shown_list_immediately() {
        let geocoder = Arc::new(
            ScriptedGeocoder::default()
                .respond("cho", vec![suggestion(1, "Chợ Bến Thành", 10.77, 106.69)]),
        );
        let mut suggester = suggester(geocoder);
        suggester.on_text_change("cho");
        settle(QUIET * 2).await;
        assert_eq!(suggester.current().len(), 1);

        suggester.on_text_change("  ");

        assert!(suggester.current().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_failures_fail_soft_to_an_empty_list() {
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_search()
            .times(1)
            .returning(|_| Err(GeocoderError::status(503_u16, "maintenance")));
        let mut suggester = suggester(Arc::new(geocoder));

        suggester.on_text_change("dinh");
        settle(QUIET * 2).await;

        assert!(suggester.current().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn blur_hides_the_list_after_the_grace_delay() {
        let geocoder = Arc::new(
            ScriptedGeocoder::default()
                .respond("buu", vec![suggestion(1, "Bưu điện", 10.78, 106.70)]),
        );
        let mut suggester = suggester(geocoder);
        suggester.on_text_change("buu");
        settle(QUIET * 2).await;

        suggester.on_blur();
        settle(Duration::from_millis(150)).await;
        assert_eq!(suggester.current().len(), 1, "still within grace delay");

        settle(Duration::from_millis(100)).await;
        assert!(suggester.current().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn typing_after_blur_cancels_the_pending_clear() {
        let geocoder = Arc::new(
            ScriptedGeocoder::default()
                .respond("nha tho", vec![suggestion(1, "Nhà thờ", 10.78, 106.69)]),
        );
        let mut suggester = suggester(geocoder);

        suggester.on_blur();
        suggester.on_text_change("nha tho");
        settle(QUIET * 2).await;

        assert_eq!(suggester.current().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn blur_during_quiet_period_drops_the_pending_lookup() {
        let geocoder = Arc::new(
            ScriptedGeocoder::default()
                .respond("cho", vec![suggestion(1, "Chợ Bến Thành", 10.77, 106.69)]),
        );
        let mut suggester = suggester(geocoder.clone());

        suggester.on_text_change("cho");
        settle(Duration::from_millis(100)).await;
        suggester.on_blur();
        settle(QUIET * 2).await;

        assert!(geocoder.queries().is_empty());
        assert!(suggester.current().is_empty());

        suggester.on_focus("cho");
        settle(Duration::from_millis(1)).await;

        assert_eq!(geocoder.queries(), vec!["cho".to_owned()]);
        assert_eq!(labels(&suggester.current()), vec!["Chợ Bến Thành"]);
    }

    #[tokio::test(start_paused = true)]
    async fn focus_refreshes_without_waiting_for_the_quiet_period() {
        let geocoder = Arc::new(
            ScriptedGeocoder::default()
                .respond("dinh", vec![suggestion(1, "Dinh Độc Lập", 10.77, 106.69)]),
        );
        let mut suggester = suggester(geocoder.clone());

        suggester.on_focus("dinh");
        settle(Duration::from_millis(1)).await;

        assert_eq!(geocoder.queries(), vec!["dinh".to_owned()]);
        assert_eq!(suggester.current().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_suggester_cancels_the_timer() {
        let geocoder = Arc::new(ScriptedGeocoder::default());
        let mut suggester = suggester(geocoder.clone());

        suggester.on_text_change("ben thanh");
        drop(suggester);
        settle(QUIET * 2).await;

        assert!(geocoder.queries().is_empty());
    }
}
