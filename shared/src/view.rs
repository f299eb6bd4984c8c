use serde::{Deserialize, Serialize};

use crate::forecast::WeatherIcon;
use crate::model::{DailyForecast, MapState, Mode, Point};
use crate::NO_LOCATION_LABEL;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MarkerPin {
    pub lat: f64,
    pub lon: f64,
    pub title: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ForecastDayView {
    pub date_iso: String,
    pub day_label: String,
    pub t_min: i32,
    pub t_max: i32,
    pub precip_pct: i32,
    pub weather_code: i32,
    pub icon: WeatherIcon,
}

impl From<&DailyForecast> for ForecastDayView {
    fn from(d: &DailyForecast) -> Self {
        Self {
            date_iso: d.date_iso().to_string(),
            day_label: d.day_label().to_string(),
            t_min: d.t_min_rounded(),
            t_max: d.t_max_rounded(),
            precip_pct: d.precip_probability_pct(),
            weather_code: d.weather_code(),
            icon: WeatherIcon::from_wmo_code(d.weather_code()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeatherCardView {
    pub target: Point,
    /// `NO_LOCATION_LABEL` until a forecast for the target has landed.
    pub location_label: String,
    pub loading: bool,
    pub error: Option<String>,
    pub days: Vec<ForecastDayView>,
}

/// Read-only snapshot handed to the shell on every render.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub markers: Vec<MarkerPin>,
    pub current_location: Option<Point>,
    pub location_permission_granted: bool,
    pub is_loading: bool,
    pub location_error: Option<String>,

    pub mode: Mode,
    pub add_mode: bool,
    pub delete_mode: bool,

    pub selected_marker: Option<Point>,
    pub show_weather_card: bool,
    /// Present only while the card is visible.
    pub weather_card: Option<WeatherCardView>,
}

impl From<&MapState> for ViewModel {
    fn from(state: &MapState) -> Self {
        let weather_card = state
            .selected_marker
            .filter(|_| state.show_weather_card)
            .map(|target| WeatherCardView {
                target,
                location_label: state
                    .weather_location_label
                    .clone()
                    .unwrap_or_else(|| NO_LOCATION_LABEL.to_string()),
                loading: state.weather_loading,
                error: state.weather_error.clone(),
                days: state.weather.iter().map(ForecastDayView::from).collect(),
            });

        Self {
            markers: state
                .markers
                .iter()
                .map(|p| MarkerPin {
                    lat: p.lat,
                    lon: p.lon,
                    title: p.marker_title(),
                })
                .collect(),
            current_location: state.current_location,
            location_permission_granted: state.location_permission_granted,
            is_loading: state.is_loading,
            location_error: state.location_error.clone(),
            mode: state.mode,
            add_mode: state.add_mode(),
            delete_mode: state.delete_mode(),
            selected_marker: state.selected_marker,
            show_weather_card: state.show_weather_card,
            weather_card,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_card_is_not_projected() {
        let p = Point::new(1.0, 2.0).unwrap();
        let state = MapState::default().weather_requested(p).hide_weather_card();
        let view = ViewModel::from(&state);
        assert!(view.weather_card.is_none());
        assert_eq!(view.selected_marker, Some(p));
    }

    #[test]
    fn loading_card_has_placeholder_label() {
        let p = Point::new(1.0, 2.0).unwrap();
        let view = ViewModel::from(&MapState::default().weather_requested(p));
        let card = view.weather_card.unwrap();
        assert!(card.loading);
        assert_eq!(card.location_label, NO_LOCATION_LABEL);
        assert!(card.days.is_empty());
    }

    #[test]
    fn mode_flags_mirror_mode() {
        let view = ViewModel::from(&MapState::default().toggle_delete_mode());
        assert_eq!(view.mode, Mode::Deleting);
        assert!(view.delete_mode);
        assert!(!view.add_mode);
    }

    #[test]
    fn markers_carry_titles() {
        let p = Point::new(43.07, -89.4).unwrap();
        let view = ViewModel::from(&MapState::default().toggle_add_mode().place_marker(p));
        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.markers[0].title, "Marker at 43.07000, -89.40000");
    }
}
