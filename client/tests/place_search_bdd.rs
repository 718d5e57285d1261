//! Behaviour tests for debounced place search.

use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sightseeing_client::domain::{GeocodeSuggester, SuggesterConfig};
use sightseeing_client::test_support::{ScriptedGeocoder, suggestion};
use tokio::runtime::{Builder, Runtime};

struct PlaceSearchWorld {
    runtime: Runtime,
    config: SuggesterConfig,
    geocoder: Arc<ScriptedGeocoder>,
    suggester: Option<GeocodeSuggester>,
}

impl PlaceSearchWorld {
    fn new() -> Self {
        let runtime = Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .expect("paused runtime should build");
        Self {
            runtime,
            config: SuggesterConfig::default(),
            geocoder: Arc::new(ScriptedGeocoder::default()),
            suggester: None,
        }
    }

    fn use_geocoder(&mut self, geocoder: ScriptedGeocoder) {
        let shared = Arc::new(geocoder);
        self.suggester = Some(GeocodeSuggester::new(shared.clone(), self.config));
        self.geocoder = shared;
    }

    fn type_text(&mut self, text: &str) {
        let Self {
            runtime, suggester, ..
        } = self;
        let active = suggester.as_mut().expect("geocoder should be configured");
        let _entered = runtime.enter();
        active.on_text_change(text);
    }

    fn wait(&self, duration: Duration) {
        // The sleep must be created inside the runtime to find its timer.
        self.runtime
            .block_on(async move { tokio::time::sleep(duration).await });
    }

    fn shown_labels(&self) -> Vec<String> {
        self.suggester
            .as_ref()
            .expect("geocoder should be configured")
            .current()
            .into_iter()
            .map(|shown| shown.label)
            .collect()
    }
}

#[fixture]
fn world() -> PlaceSearchWorld {
    PlaceSearchWorld::new()
}

#[given("a geocoder that knows Bến Thành")]
fn a_geocoder_that_knows_ben_thanh(world: &mut PlaceSearchWorld) {
    world.use_geocoder(ScriptedGeocoder::default().respond(
        "ben thanh",
        vec![suggestion(1, "Chợ Bến Thành, Quận 1", 10.7726, 106.6982)],
    ));
}

#[given("a geocoder that answers slow after three seconds and fast at once")]
fn a_geocoder_with_a_slow_answer(world: &mut PlaceSearchWorld) {
    world.use_geocoder(
        ScriptedGeocoder::default()
            .respond("slow", vec![suggestion(1, "Slow Place", 10.0, 106.0)])
            .delay("slow", Duration::from_secs(3))
            .respond("fast", vec![suggestion(2, "Fast Place", 10.1, 106.1)]),
    );
}

#[when("the user types ben thanh one letter at a time")]
fn the_user_types_one_letter_at_a_time(world: &mut PlaceSearchWorld) {
    let text = "ben thanh";
    for end in 1..=text.len() {
        world.type_text(text.get(..end).expect("ASCII prefix"));
        world.wait(Duration::from_millis(100));
    }
}

#[when("the user types only spaces")]
fn the_user_types_only_spaces(world: &mut PlaceSearchWorld) {
    world.type_text("   ");
}

#[when("the user searches for slow and then fast")]
fn the_user_searches_for_slow_then_fast(world: &mut PlaceSearchWorld) {
    let settle = world.config.quiet_period + Duration::from_millis(10);
    world.type_text("slow");
    world.wait(settle);
    world.type_text("fast");
    world.wait(settle);
}

#[when("the quiet period elapses")]
fn the_quiet_period_elapses(world: &mut PlaceSearchWorld) {
    world.wait(world.config.quiet_period + Duration::from_millis(10));
}

#[when("the slow answer arrives")]
fn the_slow_answer_arrives(world: &mut PlaceSearchWorld) {
    world.wait(Duration::from_secs(5));
}

#[when("the search field loses focus")]
fn the_search_field_loses_focus(world: &mut PlaceSearchWorld) {
    let PlaceSearchWorld {
        runtime, suggester, ..
    } = world;
    let _entered = runtime.enter();
    suggester
        .as_mut()
        .expect("geocoder should be configured")
        .on_blur();
}

#[when("the grace delay elapses")]
fn the_grace_delay_elapses(world: &mut PlaceSearchWorld) {
    world.wait(world.config.blur_grace + Duration::from_millis(10));
}

#[then("the geocoder was queried once with ben thanh")]
fn the_geocoder_was_queried_once(world: &mut PlaceSearchWorld) {
    assert_eq!(world.geocoder.queries(), vec!["ben thanh".to_owned()]);
}

#[then("the geocoder was never queried")]
fn the_geocoder_was_never_queried(world: &mut PlaceSearchWorld) {
    assert!(world.geocoder.queries().is_empty());
}

#[then("one suggestion is shown")]
fn one_suggestion_is_shown(world: &mut PlaceSearchWorld) {
    assert_eq!(world.shown_labels(), vec!["Chợ Bến Thành, Quận 1".to_owned()]);
}

#[then("no suggestions are shown")]
fn no_suggestions_are_shown(world: &mut PlaceSearchWorld) {
    assert!(world.shown_labels().is_empty());
}

#[then("the shown suggestion is Fast Place")]
fn the_shown_suggestion_is_fast_place(world: &mut PlaceSearchWorld) {
    assert_eq!(world.shown_labels(), vec!["Fast Place".to_owned()]);
}

#[scenario(
    path = "tests/features/place_search.feature",
    name = "Rapid typing issues one lookup for the final text"
)]
fn rapid_typing_issues_one_lookup(world: PlaceSearchWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/place_search.feature",
    name = "Blank input never reaches the geocoder"
)]
fn blank_input_never_reaches_the_geocoder(world: PlaceSearchWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/place_search.feature",
    name = "A slow answer never overwrites a newer one"
)]
fn a_slow_answer_never_overwrites_a_newer_one(world: PlaceSearchWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/place_search.feature",
    name = "Blur hides suggestions after the grace delay"
)]
fn blur_hides_suggestions_after_the_grace_delay(world: PlaceSearchWorld) {
    drop(world);
}
