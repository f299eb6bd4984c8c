use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{
    DEFAULT_FOCUS_ZOOM, DEFAULT_FORECAST_DAYS, DEFAULT_PAST_DAYS, DEFAULT_TIMEZONE,
    MAX_FOCUS_ZOOM, MIN_WINDOW_DAYS, OPEN_METEO_FORECAST_URL,
};

// ============================================================================
// Weather gateway
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub base_url: String,
    pub past_days: u8,
    pub forecast_days: u8,
    pub timezone: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: OPEN_METEO_FORECAST_URL.to_string(),
            past_days: DEFAULT_PAST_DAYS,
            forecast_days: DEFAULT_FORECAST_DAYS,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl WeatherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url: {e}")))?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(ConfigError::Invalid(format!(
                "base_url scheme '{}' is not http(s)",
                parsed.scheme()
            )));
        }
        if self.past_days < MIN_WINDOW_DAYS {
            return Err(ConfigError::Invalid(format!(
                "past_days must be >= {MIN_WINDOW_DAYS}"
            )));
        }
        if self.forecast_days < MIN_WINDOW_DAYS {
            return Err(ConfigError::Invalid(format!(
                "forecast_days must be >= {MIN_WINDOW_DAYS}"
            )));
        }
        if self.timezone.trim().is_empty() {
            return Err(ConfigError::Invalid("timezone must not be empty".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Screen
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub weather: WeatherConfig,
    /// Camera zoom used when focusing a tapped marker or the device fix.
    pub focus_zoom: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            weather: WeatherConfig::default(),
            focus_zoom: DEFAULT_FOCUS_ZOOM,
        }
    }
}

impl MapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weather.validate()?;
        if !self.focus_zoom.is_finite() || !(0.0..=MAX_FOCUS_ZOOM).contains(&self.focus_zoom) {
            return Err(ConfigError::Invalid(format!(
                "focus_zoom must be within [0, {MAX_FOCUS_ZOOM}]"
            )));
        }
        Ok(())
    }
}
