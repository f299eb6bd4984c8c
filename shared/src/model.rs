use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::MapConfig;
use crate::error::{CoordinateError, LocationError, WeatherError};

/// Validated lat/lon
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// `43.07°N • 89.40°W`
    #[must_use]
    pub fn compass_label(&self) -> String {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        format!(
            "{:.2}°{ns} • {:.2}°{ew}",
            self.lat.abs(),
            self.lon.abs()
        )
    }

    #[must_use]
    pub fn marker_title(&self) -> String {
        format!("Marker at {:.5}, {:.5}", self.lat, self.lon)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// How a tap on the map surface is interpreted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Idle,
    Adding,
    Deleting,
}

/// Monotonic tag attached to every gateway call; only the latest one may land.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestTicket(u64);

impl RequestTicket {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl From<u64> for RequestTicket {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One display-ready day of the forecast row. Only built by `forecast::project`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub(crate) date_iso: String,
    pub(crate) day_label: String,
    pub(crate) t_min_rounded: i32,
    pub(crate) t_max_rounded: i32,
    pub(crate) precip_probability_pct: i32,
    pub(crate) weather_code: i32,
}

impl DailyForecast {
    #[must_use]
    pub fn date_iso(&self) -> &str {
        &self.date_iso
    }

    #[must_use]
    pub fn day_label(&self) -> &str {
        &self.day_label
    }

    #[must_use]
    pub const fn t_min_rounded(&self) -> i32 {
        self.t_min_rounded
    }

    #[must_use]
    pub const fn t_max_rounded(&self) -> i32 {
        self.t_max_rounded
    }

    #[must_use]
    pub const fn precip_probability_pct(&self) -> i32 {
        self.precip_probability_pct
    }

    #[must_use]
    pub const fn weather_code(&self) -> i32 {
        self.weather_code
    }
}

/// The single snapshot the screen renders from.
///
/// Every transition below borrows the current snapshot and returns a fresh
/// one; `App` swaps it in whole, so a reader never sees a half-applied intent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    /// User-placed markers, in insertion order. Never holds the device fix.
    pub markers: Vec<Point>,
    pub current_location: Option<Point>,
    pub location_permission_granted: bool,

    pub is_loading: bool,
    pub location_error: Option<String>,

    pub mode: Mode,

    pub selected_marker: Option<Point>,
    pub show_weather_card: bool,
    pub weather: Vec<DailyForecast>,
    pub weather_loading: bool,
    pub weather_error: Option<String>,
    pub weather_location_label: Option<String>,
}

impl MapState {
    #[must_use]
    pub fn add_mode(&self) -> bool {
        self.mode == Mode::Adding
    }

    #[must_use]
    pub fn delete_mode(&self) -> bool {
        self.mode == Mode::Deleting
    }

    /// Invariants that must hold after every transition.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        let exclusive_modes = !(self.add_mode() && self.delete_mode());
        let card_has_target = !self.show_weather_card || self.selected_marker.is_some();
        exclusive_modes && card_has_target
    }

    // --- Location ---

    #[must_use]
    pub fn with_location_permission(&self, granted: bool) -> Self {
        Self {
            location_permission_granted: granted,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn location_requested(&self) -> Self {
        Self {
            is_loading: true,
            location_error: None,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn location_resolved(&self, result: &Result<Point, LocationError>) -> Self {
        match result {
            Ok(fix) => Self {
                current_location: Some(*fix),
                is_loading: false,
                ..self.clone()
            },
            Err(e) => Self {
                is_loading: false,
                location_error: Some(e.user_message()),
                ..self.clone()
            },
        }
    }

    // --- Modes ---

    #[must_use]
    pub fn toggle_add_mode(&self) -> Self {
        let mode = if self.add_mode() { Mode::Idle } else { Mode::Adding };
        Self { mode, ..self.clone() }
    }

    #[must_use]
    pub fn toggle_delete_mode(&self) -> Self {
        let mode = if self.delete_mode() { Mode::Idle } else { Mode::Deleting };
        Self { mode, ..self.clone() }
    }

    #[must_use]
    pub fn cancel_add_mode(&self) -> Self {
        if !self.add_mode() {
            return self.clone();
        }
        Self { mode: Mode::Idle, ..self.clone() }
    }

    #[must_use]
    pub fn cancel_delete_mode(&self) -> Self {
        if !self.delete_mode() {
            return self.clone();
        }
        Self { mode: Mode::Idle, ..self.clone() }
    }

    // --- Markers ---

    /// Single shot: appends `point` and drops back to idle. Ignored outside add mode.
    #[must_use]
    pub fn place_marker(&self, point: Point) -> Self {
        if !self.add_mode() {
            return self.clone();
        }
        let mut markers = self.markers.clone();
        markers.push(point);
        Self {
            markers,
            mode: Mode::Idle,
            ..self.clone()
        }
    }

    /// Removes every marker equal to `point` and drops back to idle. Ignored outside delete mode.
    #[must_use]
    pub fn remove_marker(&self, point: Point) -> Self {
        if !self.delete_mode() {
            return self.clone();
        }
        let markers = self
            .markers
            .iter()
            .copied()
            .filter(|m| *m != point)
            .collect();
        Self {
            markers,
            mode: Mode::Idle,
            ..self.clone()
        }
    }

    // --- Weather card ---

    /// Rows and label survive only a refetch of the same point; a new target starts blank.
    #[must_use]
    pub fn weather_requested(&self, point: Point) -> Self {
        let same_target = self.selected_marker == Some(point);
        Self {
            weather: if same_target { self.weather.clone() } else { Vec::new() },
            weather_location_label: if same_target {
                self.weather_location_label.clone()
            } else {
                None
            },
            selected_marker: Some(point),
            show_weather_card: true,
            weather_loading: true,
            weather_error: None,
            ..self.clone()
        }
    }

    /// Failures keep the previous rows and label so the card can show stale data under a banner.
    #[must_use]
    pub fn weather_resolved(&self, result: Result<Vec<DailyForecast>, &WeatherError>) -> Self {
        match result {
            Ok(days) => Self {
                weather: days,
                weather_loading: false,
                weather_location_label: self.selected_marker.map(|p| p.compass_label()),
                ..self.clone()
            },
            Err(e) => Self {
                weather_loading: false,
                weather_error: Some(e.user_message()),
                ..self.clone()
            },
        }
    }

    /// Only the visibility flag changes; selection and rows stay for a quick re-show.
    #[must_use]
    pub fn hide_weather_card(&self) -> Self {
        if !self.show_weather_card {
            return self.clone();
        }
        Self {
            show_weather_card: false,
            ..self.clone()
        }
    }
}

/// Everything the core owns for one screen instance.
#[derive(Debug, Default)]
pub struct Model {
    pub state: MapState,
    pub config: MapConfig,

    last_ticket: RequestTicket,
    pending_location: Option<RequestTicket>,
    pending_weather: Option<RequestTicket>,
}

impl Model {
    #[must_use]
    pub fn with_config(config: MapConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Latest location request still waiting for its result.
    #[must_use]
    pub const fn pending_location(&self) -> Option<RequestTicket> {
        self.pending_location
    }

    #[must_use]
    pub const fn pending_weather(&self) -> Option<RequestTicket> {
        self.pending_weather
    }

    pub(crate) fn issue_location_ticket(&mut self) -> RequestTicket {
        let ticket = self.issue_ticket();
        self.pending_location = Some(ticket);
        ticket
    }

    pub(crate) fn issue_weather_ticket(&mut self) -> RequestTicket {
        let ticket = self.issue_ticket();
        self.pending_weather = Some(ticket);
        ticket
    }

    /// Consumes the pending location ticket if `ticket` is it.
    pub(crate) fn accept_location(&mut self, ticket: RequestTicket) -> bool {
        if self.pending_location == Some(ticket) {
            self.pending_location = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn accept_weather(&mut self, ticket: RequestTicket) -> bool {
        if self.pending_weather == Some(ticket) {
            self.pending_weather = None;
            true
        } else {
            false
        }
    }

    fn issue_ticket(&mut self) -> RequestTicket {
        self.last_ticket = self.last_ticket.next();
        self.last_ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pt(lat: f64, lon: f64) -> Point {
        Point::new(lat, lon).unwrap()
    }

    fn day(date: &str) -> DailyForecast {
        DailyForecast {
            date_iso: date.into(),
            day_label: "SUN".into(),
            t_min_rounded: 1,
            t_max_rounded: 9,
            precip_probability_pct: 10,
            weather_code: 3,
        }
    }

    mod point_tests {
        use super::*;

        #[test]
        fn rejects_out_of_range_and_non_finite() {
            assert!(matches!(Point::new(91.0, 0.0), Err(CoordinateError::LatitudeOutOfRange(_))));
            assert!(matches!(Point::new(0.0, -181.0), Err(CoordinateError::LongitudeOutOfRange(_))));
            assert!(matches!(Point::new(f64::NAN, 0.0), Err(CoordinateError::NonFinite)));
            assert!(matches!(Point::new(0.0, f64::INFINITY), Err(CoordinateError::NonFinite)));
            assert!(Point::new(-90.0, 180.0).is_ok());
        }

        #[test]
        fn compass_label_uses_hemispheres() {
            assert_eq!(pt(43.0731, -89.4012).compass_label(), "43.07°N • 89.40°W");
            assert_eq!(pt(-33.8688, 151.2093).compass_label(), "33.87°S • 151.21°E");
        }

        #[test]
        fn marker_title_has_five_decimals() {
            assert_eq!(pt(1.5, -2.25).marker_title(), "Marker at 1.50000, -2.25000");
        }
    }

    mod mode_tests {
        use super::*;

        #[test]
        fn toggling_one_mode_clears_the_other() {
            let s = MapState::default().toggle_add_mode();
            assert!(s.add_mode());
            let s = s.toggle_delete_mode();
            assert!(s.delete_mode());
            assert!(!s.add_mode());
            let s = s.toggle_add_mode();
            assert!(s.add_mode());
            assert!(!s.delete_mode());
            let s = s.toggle_add_mode();
            assert_eq!(s.mode, Mode::Idle);
        }

        #[test]
        fn cancel_is_idempotent() {
            let idle = MapState::default();
            assert_eq!(idle.cancel_add_mode(), idle);
            assert_eq!(idle.cancel_delete_mode(), idle);

            let deleting = idle.toggle_delete_mode();
            assert_eq!(deleting.cancel_add_mode(), deleting);
            assert_eq!(deleting.cancel_delete_mode().mode, Mode::Idle);
        }
    }

    mod marker_tests {
        use super::*;

        #[test]
        fn place_marker_is_single_shot() {
            let p = pt(10.0, 20.0);
            let s = MapState::default().toggle_add_mode().place_marker(p);
            assert_eq!(s.markers, vec![p]);
            assert!(!s.add_mode());
        }

        #[test]
        fn place_marker_outside_add_mode_is_ignored() {
            let s = MapState::default();
            assert_eq!(s.place_marker(pt(1.0, 1.0)), s);
            let deleting = s.toggle_delete_mode();
            assert_eq!(deleting.place_marker(pt(1.0, 1.0)), deleting);
        }

        #[test]
        fn duplicates_are_kept_and_removed_together() {
            let a = pt(1.0, 1.0);
            let b = pt(2.0, 2.0);
            let s = MapState::default()
                .toggle_add_mode()
                .place_marker(a)
                .toggle_add_mode()
                .place_marker(b)
                .toggle_add_mode()
                .place_marker(a);
            assert_eq!(s.markers, vec![a, b, a]);

            let s = s.toggle_delete_mode().remove_marker(a);
            assert_eq!(s.markers, vec![b]);
            assert!(!s.delete_mode());
        }

        #[test]
        fn removing_absent_point_keeps_markers_and_exits_mode() {
            let a = pt(1.0, 1.0);
            let s = MapState { markers: vec![a], ..MapState::default() }.toggle_delete_mode();
            let after = s.remove_marker(pt(5.0, 5.0));
            assert_eq!(after.markers, vec![a]);
            assert_eq!(after.mode, Mode::Idle);
        }

        #[test]
        fn remove_outside_delete_mode_is_ignored() {
            let a = pt(1.0, 1.0);
            let s = MapState { markers: vec![a], ..MapState::default() };
            assert_eq!(s.remove_marker(a), s);
        }
    }

    mod location_tests {
        use super::*;

        #[test]
        fn fix_never_becomes_a_marker() {
            let fix = pt(43.0, -89.0);
            let s = MapState::default().location_requested().location_resolved(&Ok(fix));
            assert_eq!(s.current_location, Some(fix));
            assert!(s.markers.is_empty());
            assert!(!s.is_loading);
        }

        #[test]
        fn permission_denied_keeps_previous_fix() {
            let fix = pt(43.0, -89.0);
            let s = MapState { current_location: Some(fix), ..MapState::default() }
                .location_requested()
                .location_resolved(&Err(LocationError::PermissionDenied));
            assert_eq!(s.location_error.as_deref(), Some("Location permission required."));
            assert_eq!(s.current_location, Some(fix));
            assert!(!s.is_loading);
        }

        #[test]
        fn new_request_clears_previous_error() {
            let s = MapState::default()
                .location_resolved(&Err(LocationError::Unavailable))
                .location_requested();
            assert!(s.location_error.is_none());
            assert!(s.is_loading);
        }
    }

    mod weather_tests {
        use super::*;

        #[test]
        fn request_shows_card_before_data() {
            let p = pt(5.0, 6.0);
            let s = MapState::default().weather_requested(p);
            assert!(s.show_weather_card);
            assert_eq!(s.selected_marker, Some(p));
            assert!(s.weather_loading);
            assert!(s.invariants_hold());
        }

        #[test]
        fn success_sets_rows_and_label() {
            let p = pt(43.0731, -89.4012);
            let s = MapState::default()
                .weather_requested(p)
                .weather_resolved(Ok(vec![day("2025-10-19")]));
            assert_eq!(s.weather.len(), 1);
            assert!(!s.weather_loading);
            assert_eq!(s.weather_location_label.as_deref(), Some("43.07°N • 89.40°W"));
        }

        #[test]
        fn failure_keeps_stale_rows() {
            let p = pt(1.0, 1.0);
            let loaded = MapState::default()
                .weather_requested(p)
                .weather_resolved(Ok(vec![day("2025-10-19")]));
            let failed = loaded
                .weather_requested(p)
                .weather_resolved(Err(&WeatherError::Network("offline".into())));
            assert_eq!(failed.weather, loaded.weather);
            assert_eq!(failed.weather_location_label, loaded.weather_location_label);
            assert!(failed.weather_error.as_deref().unwrap().contains("offline"));
            assert!(!failed.weather_loading);
        }

        #[test]
        fn new_target_does_not_inherit_previous_rows() {
            let first = pt(10.0, 10.0);
            let second = pt(-40.0, -70.0);
            let loaded = MapState::default()
                .weather_requested(first)
                .weather_resolved(Ok(vec![day("2025-10-19")]));

            let loading = loaded.weather_requested(second);
            assert!(loading.weather.is_empty());
            assert_eq!(loading.weather_location_label, None);

            let failed = loading.weather_resolved(Err(&WeatherError::Http { status: 503 }));
            assert_eq!(failed.selected_marker, Some(second));
            assert!(failed.weather.is_empty());
            assert_eq!(failed.weather_location_label, None);
            assert!(failed.weather_error.is_some());
        }

        #[test]
        fn hide_keeps_selection_and_rows() {
            let p = pt(1.0, 1.0);
            let shown = MapState::default()
                .weather_requested(p)
                .weather_resolved(Ok(vec![day("2025-10-19")]));
            let hidden = shown.hide_weather_card();
            assert!(!hidden.show_weather_card);
            assert_eq!(hidden.selected_marker, Some(p));
            assert_eq!(hidden.weather, shown.weather);
        }

        #[test]
        fn hide_when_hidden_is_identity() {
            let s = MapState::default();
            assert_eq!(s.hide_weather_card(), s);
        }
    }

    mod ticket_tests {
        use super::*;

        #[test]
        fn only_latest_ticket_is_accepted_once() {
            let mut model = Model::default();
            let first = model.issue_weather_ticket();
            let second = model.issue_weather_ticket();
            assert!(second > first);
            assert!(!model.accept_weather(first));
            assert!(model.accept_weather(second));
            assert!(!model.accept_weather(second));
        }

        #[test]
        fn channels_do_not_share_pending_tickets() {
            let mut model = Model::default();
            let loc = model.issue_location_ticket();
            let wx = model.issue_weather_ticket();
            assert_ne!(loc, wx);
            assert!(!model.accept_location(wx));
            assert!(model.accept_location(loc));
            assert_eq!(model.pending_weather(), Some(wx));
        }
    }

    #[derive(Debug, Clone, Copy)]
    enum ModeOp {
        ToggleAdd,
        ToggleDelete,
        CancelAdd,
        CancelDelete,
        Place,
        Remove,
        Select,
        Hide,
    }

    fn mode_op() -> impl Strategy<Value = ModeOp> {
        prop_oneof![
            Just(ModeOp::ToggleAdd),
            Just(ModeOp::ToggleDelete),
            Just(ModeOp::CancelAdd),
            Just(ModeOp::CancelDelete),
            Just(ModeOp::Place),
            Just(ModeOp::Remove),
            Just(ModeOp::Select),
            Just(ModeOp::Hide),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_for_any_intent_sequence(ops in proptest::collection::vec(mode_op(), 0..64)) {
            let p = pt(12.0, 34.0);
            let mut state = MapState::default();
            for op in ops {
                let before = state.markers.len();
                let was_adding = state.add_mode();
                state = match op {
                    ModeOp::ToggleAdd => state.toggle_add_mode(),
                    ModeOp::ToggleDelete => state.toggle_delete_mode(),
                    ModeOp::CancelAdd => state.cancel_add_mode(),
                    ModeOp::CancelDelete => state.cancel_delete_mode(),
                    ModeOp::Place => state.place_marker(p),
                    ModeOp::Remove => state.remove_marker(p),
                    ModeOp::Select => state.weather_requested(p),
                    ModeOp::Hide => state.hide_weather_card(),
                };
                prop_assert!(state.invariants_hold());
                if matches!(op, ModeOp::Place) && was_adding {
                    prop_assert_eq!(state.markers.len(), before + 1);
                    prop_assert!(!state.add_mode());
                }
            }
        }
    }
}
