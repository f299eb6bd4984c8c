// lib.rs - Marker map core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod forecast;
pub mod model;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{MapConfig, WeatherConfig};
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{ConfigError, CoordinateError, LocationError, WeatherError};
pub use event::Event;
pub use forecast::{RawDaily, RawForecast, WeatherIcon};
pub use model::{DailyForecast, MapState, Mode, Model, Point, RequestTicket};
pub use view::{ForecastDayView, MarkerPin, ViewModel, WeatherCardView};

pub const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_PAST_DAYS: u8 = 2;
pub const DEFAULT_FORECAST_DAYS: u8 = 4;
pub const MIN_WINDOW_DAYS: u8 = 2;
pub const DEFAULT_TIMEZONE: &str = "auto";
pub const DEFAULT_FOCUS_ZOOM: f32 = 15.0;
pub const MAX_FOCUS_ZOOM: f32 = 22.0;

/// Daily metrics requested from Open-Meteo, in query order.
pub const DAILY_METRICS: &[&str] = &[
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_probability_max",
    "weathercode",
];

/// Shown on the weather card before any forecast for the target has landed.
pub const NO_LOCATION_LABEL: &str = "\u{2014}";
