use serde::{Deserialize, Serialize};

use crate::config::MapConfig;
use crate::error::{LocationError, WeatherError};
use crate::forecast::RawForecast;
use crate::model::{Point, RequestTicket};

/// Everything the shell can tell the core, plus the completions the core's
/// own capabilities feed back. Coordinates arrive raw and are validated in
/// `update`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub enum Event {
    #[default]
    Noop,

    // Lifecycle & configuration
    ScreenOpened {
        permission_granted: bool,
    },
    ConfigChanged(Box<MapConfig>),

    // Location
    LocationPermissionChanged {
        granted: bool,
    },
    LocationPermissionPromptRequested,
    CurrentLocationRequested,
    LocateRequested,

    // Modes
    AddModeToggled,
    DeleteModeToggled,
    AddModeCancelled,
    DeleteModeCancelled,

    // Markers
    MarkerPlaced {
        lat: f64,
        lon: f64,
    },
    MarkerRemoved {
        lat: f64,
        lon: f64,
    },

    // Taps routed through the current mode
    MapTapped {
        lat: f64,
        lon: f64,
    },
    MarkerTapped {
        lat: f64,
        lon: f64,
    },
    MyLocationTapped {
        lat: f64,
        lon: f64,
    },

    // Weather card
    WeatherRequested {
        lat: f64,
        lon: f64,
    },
    WeatherCardDismissed,

    // Capability responses
    #[serde(skip)]
    LocationPermissionAnswered {
        granted: bool,
    },
    #[serde(skip)]
    LocationResolved {
        ticket: RequestTicket,
        result: Result<Point, LocationError>,
    },
    #[serde(skip)]
    ForecastResolved {
        ticket: RequestTicket,
        result: Box<Result<RawForecast, WeatherError>>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::ScreenOpened { .. } => "screen_opened",
            Self::ConfigChanged(_) => "config_changed",
            Self::LocationPermissionChanged { .. } => "location_permission_changed",
            Self::LocationPermissionPromptRequested => "location_permission_prompt_requested",
            Self::CurrentLocationRequested => "current_location_requested",
            Self::LocateRequested => "locate_requested",
            Self::AddModeToggled => "add_mode_toggled",
            Self::DeleteModeToggled => "delete_mode_toggled",
            Self::AddModeCancelled => "add_mode_cancelled",
            Self::DeleteModeCancelled => "delete_mode_cancelled",
            Self::MarkerPlaced { .. } => "marker_placed",
            Self::MarkerRemoved { .. } => "marker_removed",
            Self::MapTapped { .. } => "map_tapped",
            Self::MarkerTapped { .. } => "marker_tapped",
            Self::MyLocationTapped { .. } => "my_location_tapped",
            Self::WeatherRequested { .. } => "weather_requested",
            Self::WeatherCardDismissed => "weather_card_dismissed",
            Self::LocationPermissionAnswered { .. } => "location_permission_answered",
            Self::LocationResolved { .. } => "location_resolved",
            Self::ForecastResolved { .. } => "forecast_resolved",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::LocationPermissionPromptRequested
                | Self::CurrentLocationRequested
                | Self::LocateRequested
                | Self::AddModeToggled
                | Self::DeleteModeToggled
                | Self::AddModeCancelled
                | Self::DeleteModeCancelled
                | Self::MarkerPlaced { .. }
                | Self::MarkerRemoved { .. }
                | Self::MapTapped { .. }
                | Self::MarkerTapped { .. }
                | Self::MyLocationTapped { .. }
                | Self::WeatherRequested { .. }
                | Self::WeatherCardDismissed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_are_not_user_initiated() {
        assert!(!Event::LocationResolved {
            ticket: RequestTicket::from(1),
            result: Err(LocationError::Unavailable),
        }
        .is_user_initiated());
        assert!(!Event::LocationPermissionAnswered { granted: true }.is_user_initiated());
        assert!(Event::MapTapped { lat: 0.0, lon: 0.0 }.is_user_initiated());
    }

    #[test]
    fn shell_events_deserialize() {
        let event: Event = serde_json::from_str(r#"{"MarkerTapped":{"lat":1.5,"lon":2.5}}"#).unwrap();
        assert_eq!(event, Event::MarkerTapped { lat: 1.5, lon: 2.5 });
        assert_eq!(event.name(), "marker_tapped");

        let event: Event = serde_json::from_str(r#""LocateRequested""#).unwrap();
        assert_eq!(event, Event::LocateRequested);
    }

    #[test]
    fn shell_cannot_forge_completions() {
        let forged = r#"{"LocationPermissionAnswered":{"granted":true}}"#;
        assert!(serde_json::from_str::<Event>(forged).is_err());
    }

    #[test]
    fn event_size_is_reasonable() {
        let size = std::mem::size_of::<Event>();
        assert!(
            size <= 64,
            "Event enum is {} bytes; box the larger variants",
            size
        );
    }
}
