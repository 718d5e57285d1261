//! Headless sightseeing client: search a place, pick a suggestion, and fetch
//! a tour from it against the configured backend.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use sightseeing_client::config::ClientSettings;
use sightseeing_client::domain::{
    AppController, Coordinate, GeocodeSuggester, MapSurface, Suggestion, UiEvent,
};
use sightseeing_client::outbound::headless_canvas::{CanvasSnapshot, HeadlessCanvas};
use sightseeing_client::outbound::nominatim::{NominatimGeocoder, NominatimIdentity};
use sightseeing_client::outbound::routing_api::HttpRouteClient;

/// `sightseeing-client` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sightseeing-client",
    about = "Search a place and fetch a sightseeing tour starting there",
    version
)]
struct CliArgs {
    /// Free-text place search.
    #[arg(long, value_name = "text")]
    search: Option<String>,
    /// Zero-based index of the suggestion to select.
    #[arg(long, value_name = "index", requires = "search")]
    pick: Option<usize>,
    /// Start latitude, used when no suggestion is picked.
    #[arg(long, value_name = "degrees", requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Start longitude, used when no suggestion is picked.
    #[arg(long, value_name = "degrees", requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: CliArgs) -> Result<()> {
    let settings = ClientSettings::load_from_iter([OsString::from("sightseeing-client")])
        .wrap_err("load client settings")?;
    let timeout = settings.request_timeout();

    let geocoder = NominatimGeocoder::with_identity(
        settings.geocoder_url()?,
        timeout,
        NominatimIdentity {
            user_agent: settings.user_agent().to_owned(),
        },
    )
    .wrap_err("build geocoder client")?;
    let routes = HttpRouteClient::new(settings.api_base_url()?, timeout)
        .wrap_err("build route client")?;
    let canvas = HeadlessCanvas::new();
    let probe = canvas.probe();

    let suggester_config = settings.suggester_config();
    let mut controller = AppController::new(
        settings.controller_settings(),
        Arc::new(routes),
        GeocodeSuggester::new(Arc::new(geocoder), suggester_config),
        MapSurface::new(Box::new(canvas)),
    );
    controller.initialize().await;
    info!(route = controller.route_text(), "startup complete");

    if let Some(query) = args.search {
        let suggestions = search(&mut controller, query, suggester_config.quiet_period + timeout)
            .await?;
        report_suggestions(&suggestions)?;
        if let Some(index) = args.pick {
            let picked = suggestions
                .get(index)
                .ok_or_else(|| eyre!("no suggestion at index {index}"))?;
            controller.handle(UiEvent::SuggestionSelected(picked.clone()));
            controller.next_route_outcome().await;
        }
    } else if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        controller.handle(UiEvent::LocationEdited {
            location: Coordinate::new(lat, lng),
            fetch_route: true,
        });
        controller.next_route_outcome().await;
    }

    report_route(&controller, &probe.snapshot())?;
    controller.teardown();
    Ok(())
}

async fn search(
    controller: &mut AppController,
    query: String,
    wait: Duration,
) -> Result<Vec<Suggestion>> {
    let mut updates = controller.suggestion_updates();
    controller.handle(UiEvent::SearchTextChanged(query));
    match tokio::time::timeout(wait, updates.changed()).await {
        Ok(Ok(())) => Ok(updates.borrow().clone()),
        Ok(Err(_)) => Err(eyre!("suggestion feed closed")),
        Err(_) => {
            warn!("no suggestions before timeout");
            Ok(Vec::new())
        }
    }
}

fn report_suggestions(suggestions: &[Suggestion]) -> Result<()> {
    let mut out = io::stdout().lock();
    for (index, suggestion) in suggestions.iter().enumerate() {
        writeln!(
            out,
            "[{index}] {} ({:.5}, {:.5})",
            suggestion.label, suggestion.coordinate.lat, suggestion.coordinate.lng
        )?;
    }
    Ok(())
}

fn report_route(controller: &AppController, scene: &CanvasSnapshot) -> Result<()> {
    let location = controller.user_location();
    let mut out = io::stdout().lock();
    writeln!(out, "location={:.5},{:.5}", location.lat, location.lng)?;
    writeln!(out, "route_state={:?}", controller.route_flow())?;
    writeln!(out, "route={}", controller.route_text())?;
    writeln!(out, "markers={}", scene.markers.len())?;
    writeln!(out, "polylines={}", scene.polylines.len())?;
    Ok(())
}
