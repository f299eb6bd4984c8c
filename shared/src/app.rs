//! The interaction state machine: the only writer of `MapState`.
//!
//! Intents are applied synchronously by computing a new snapshot and swapping
//! it in. Location and forecast lookups go out through capabilities tagged
//! with a `RequestTicket`; a completion whose ticket is no longer the pending
//! one for its channel is dropped, so the newest request always wins.

use tracing::{debug, info, warn};

use crate::capabilities::{weather, Capabilities};
use crate::event::Event;
use crate::forecast;
use crate::model::{MapState, Mode, Model, Point};
use crate::view::ViewModel;

#[derive(Default)]
pub struct App;

impl App {
    /// Swaps in `next`, rendering only when something visible changed.
    fn commit(model: &mut Model, next: MapState, caps: &Capabilities) {
        if next == model.state {
            return;
        }
        debug_assert!(next.invariants_hold(), "transition broke MapState invariants");
        model.state = next;
        caps.render.render();
    }

    fn validate_point(lat: f64, lon: f64, event_name: &str) -> Option<Point> {
        match Point::new(lat, lon) {
            Ok(point) => Some(point),
            Err(e) => {
                warn!(event = event_name, lat, lon, error = %e, "ignoring invalid coordinate");
                None
            }
        }
    }

    fn request_current_location(model: &mut Model, caps: &Capabilities) {
        if let Some(stale) = model.pending_location() {
            debug!(%stale, "superseding in-flight location request");
        }
        let ticket = model.issue_location_ticket();
        let next = model.state.location_requested();
        Self::commit(model, next, caps);

        caps.location
            .last_known_position(move |result| Event::LocationResolved { ticket, result });
    }

    fn request_permission_prompt(caps: &Capabilities) {
        caps.location
            .request_permission(|granted| Event::LocationPermissionAnswered { granted });
    }

    /// Shows the card for `point` straight away, then fetches its forecast.
    fn select_for_weather(model: &mut Model, point: Point, caps: &Capabilities) {
        if let Some(stale) = model.pending_weather() {
            debug!(%stale, "superseding in-flight forecast request");
        }
        let ticket = model.issue_weather_ticket();
        let next = model.state.weather_requested(point);
        Self::commit(model, next, caps);

        let sent = weather::fetch_daily(&caps.http, &model.config.weather, point, move |result| {
            Event::ForecastResolved {
                ticket,
                result: Box::new(result),
            }
        });

        if let Err(e) = sent {
            warn!(%ticket, error = %e, "forecast request could not be built");
            model.accept_weather(ticket);
            let next = model.state.weather_resolved(Err(&e));
            Self::commit(model, next, caps);
        }
    }

    fn focus_and_select(model: &mut Model, point: Point, caps: &Capabilities) {
        caps.map_camera.animate_to(point, model.config.focus_zoom);
        Self::select_for_weather(model, point, caps);
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        if event.is_user_initiated() {
            info!(event = event_name, "user action");
        } else {
            debug!(event = event_name, "update");
        }

        match event {
            Event::Noop => {}

            Event::ScreenOpened { permission_granted } => {
                if permission_granted {
                    let next = model.state.with_location_permission(true);
                    Self::commit(model, next, caps);
                    Self::request_current_location(model, caps);
                } else {
                    Self::request_permission_prompt(caps);
                }
            }

            Event::ConfigChanged(config) => match config.validate() {
                Ok(()) => {
                    info!(base_url = %config.weather.base_url, "map configuration replaced");
                    model.config = *config;
                }
                Err(e) => warn!(error = %e, "rejecting map configuration"),
            },

            Event::LocationPermissionChanged { granted } => {
                let next = model.state.with_location_permission(granted);
                Self::commit(model, next, caps);
            }

            Event::LocationPermissionPromptRequested => Self::request_permission_prompt(caps),

            Event::LocationPermissionAnswered { granted } => {
                info!(granted, "location permission answered");
                let next = model.state.with_location_permission(granted);
                Self::commit(model, next, caps);
                if granted {
                    Self::request_current_location(model, caps);
                }
            }

            Event::CurrentLocationRequested => Self::request_current_location(model, caps),

            Event::LocateRequested => {
                let next = model.state.hide_weather_card();
                Self::commit(model, next, caps);

                if !model.state.location_permission_granted {
                    Self::request_permission_prompt(caps);
                } else if let Some(fix) = model.state.current_location {
                    Self::focus_and_select(model, fix, caps);
                } else {
                    Self::request_current_location(model, caps);
                }
            }

            Event::AddModeToggled => {
                let next = model.state.hide_weather_card().toggle_add_mode();
                Self::commit(model, next, caps);
            }

            Event::DeleteModeToggled => {
                let next = model.state.hide_weather_card().toggle_delete_mode();
                Self::commit(model, next, caps);
            }

            Event::AddModeCancelled => {
                let next = model.state.cancel_add_mode();
                Self::commit(model, next, caps);
            }

            Event::DeleteModeCancelled => {
                let next = model.state.cancel_delete_mode();
                Self::commit(model, next, caps);
            }

            Event::MarkerPlaced { lat, lon } => {
                if let Some(point) = Self::validate_point(lat, lon, event_name) {
                    let next = model.state.place_marker(point);
                    Self::commit(model, next, caps);
                }
            }

            Event::MarkerRemoved { lat, lon } => {
                if let Some(point) = Self::validate_point(lat, lon, event_name) {
                    let next = model.state.remove_marker(point);
                    Self::commit(model, next, caps);
                }
            }

            Event::MapTapped { lat, lon } => match model.state.mode {
                Mode::Adding => {
                    if let Some(point) = Self::validate_point(lat, lon, event_name) {
                        let next = model.state.place_marker(point).hide_weather_card();
                        Self::commit(model, next, caps);
                    }
                }
                Mode::Deleting => {
                    let next = model.state.cancel_delete_mode();
                    Self::commit(model, next, caps);
                }
                Mode::Idle => {
                    let next = model.state.hide_weather_card();
                    Self::commit(model, next, caps);
                }
            },

            Event::MarkerTapped { lat, lon } => {
                if let Some(point) = Self::validate_point(lat, lon, event_name) {
                    if model.state.delete_mode() {
                        let next = model.state.remove_marker(point);
                        Self::commit(model, next, caps);
                    } else {
                        Self::focus_and_select(model, point, caps);
                    }
                }
            }

            Event::MyLocationTapped { lat, lon } => {
                if let Some(point) = Self::validate_point(lat, lon, event_name) {
                    Self::focus_and_select(model, point, caps);
                }
            }

            Event::WeatherRequested { lat, lon } => {
                if let Some(point) = Self::validate_point(lat, lon, event_name) {
                    Self::select_for_weather(model, point, caps);
                }
            }

            Event::WeatherCardDismissed => {
                let next = model.state.hide_weather_card();
                Self::commit(model, next, caps);
            }

            Event::LocationResolved { ticket, result } => {
                if !model.accept_location(ticket) {
                    debug!(%ticket, "dropping stale location result");
                    return;
                }
                match &result {
                    Ok(fix) => debug!(%ticket, %fix, "location fix received"),
                    Err(e) => warn!(%ticket, error = %e, "location request failed"),
                }
                let moved = match &result {
                    Ok(fix) if model.state.current_location != Some(*fix) => Some(*fix),
                    _ => None,
                };
                let next = model.state.location_resolved(&result);
                Self::commit(model, next, caps);

                // The camera follows the device whenever the fix changes.
                if let Some(fix) = moved {
                    caps.map_camera.animate_to(fix, model.config.focus_zoom);
                }
            }

            Event::ForecastResolved { ticket, result } => {
                if !model.accept_weather(ticket) {
                    debug!(%ticket, "dropping stale forecast result");
                    return;
                }
                let next = match *result {
                    Ok(raw) => {
                        let days = forecast::project(&raw);
                        debug!(%ticket, days = days.len(), "forecast received");
                        model.state.weather_resolved(Ok(days))
                    }
                    Err(e) => {
                        warn!(%ticket, error = %e, retryable = e.is_retryable(), "forecast request failed");
                        model.state.weather_resolved(Err(&e))
                    }
                };
                Self::commit(model, next, caps);
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from(&model.state)
    }
}
