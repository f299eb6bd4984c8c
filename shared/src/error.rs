use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown whenever the location gateway reports a revoked or missing grant.
pub const LOCATION_PERMISSION_REQUIRED: &str = "Location permission required.";
pub const LOCATION_UNAVAILABLE: &str = "Location unavailable.";
pub const LOCATION_FALLBACK: &str = "Location error.";
pub const WEATHER_FALLBACK: &str = "Weather fetch failed";

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("no location fix available yet")]
    Unavailable,

    #[error("{0}")]
    Other(String),
}

impl LocationError {
    /// Message rendered in the location error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied => LOCATION_PERMISSION_REQUIRED.to_string(),
            Self::Unavailable => LOCATION_UNAVAILABLE.to_string(),
            Self::Other(message) if message.trim().is_empty() => LOCATION_FALLBACK.to_string(),
            Self::Other(message) => message.clone(),
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum WeatherError {
    #[error("network error: {0}")]
    Network(String),

    #[error("weather service returned HTTP {status}")]
    Http { status: u16 },

    #[error("{reason}")]
    Api { status: u16, reason: String },

    #[error("malformed forecast payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    Other(String),
}

impl WeatherError {
    #[must_use]
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            WEATHER_FALLBACK.to_string()
        } else {
            message
        }
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status } | Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::MalformedPayload(_) | Self::Other(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq)]
pub enum CoordinateError {
    #[error("coordinate is not a finite number")]
    NonFinite,

    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
