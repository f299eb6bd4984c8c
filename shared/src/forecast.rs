//! Raw Open-Meteo daily payload and its projection into display rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::DailyForecast;

/// Subset of the forecast response the screen consumes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForecast {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub daily: Option<RawDaily>,
}

/// Parallel per-day arrays. Any of them may be short, missing or hold nulls.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDaily {
    #[serde(default)]
    pub time: Vec<Option<String>>,
    #[serde(default, rename = "temperature_2m_max")]
    pub temperature_max: Vec<Option<f64>>,
    #[serde(default, rename = "temperature_2m_min")]
    pub temperature_min: Vec<Option<f64>>,
    #[serde(default, rename = "precipitation_probability_max")]
    pub precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default, rename = "weathercode")]
    pub weather_code: Vec<Option<f64>>,
}

impl RawDaily {
    /// Days covered by every array.
    #[must_use]
    pub fn aligned_len(&self) -> usize {
        [
            self.time.len(),
            self.temperature_max.len(),
            self.temperature_min.len(),
            self.precipitation_probability_max.len(),
            self.weather_code.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
}

/// Turns a raw payload into date-ordered rows.
///
/// Arrays are zipped up to the shortest one. Null numbers read as 0. A day
/// whose date does not parse is skipped; the rest still come through. No
/// `daily` block at all yields an empty row.
#[must_use]
pub fn project(raw: &RawForecast) -> Vec<DailyForecast> {
    let Some(daily) = raw.daily.as_ref() else {
        return Vec::new();
    };

    let len = daily.aligned_len();
    if len < daily.time.len() {
        warn!(days = daily.time.len(), aligned = len, "forecast arrays differ in length; truncating");
    }

    let mut days: Vec<(NaiveDate, DailyForecast)> = (0..len)
        .filter_map(|i| {
            let iso = daily.time[i].as_deref()?.trim();
            let date = match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
                Ok(date) => date,
                Err(e) => {
                    warn!(index = i, date = iso, error = %e, "skipping forecast day with unparseable date");
                    return None;
                }
            };

            let row = DailyForecast {
                date_iso: date.format("%Y-%m-%d").to_string(),
                day_label: weekday_label(date),
                t_min_rounded: round_or_zero(daily.temperature_min[i]),
                t_max_rounded: round_or_zero(daily.temperature_max[i]),
                precip_probability_pct: round_or_zero(daily.precipitation_probability_max[i])
                    .clamp(0, 100),
                weather_code: round_or_zero(daily.weather_code[i]),
            };
            Some((date, row))
        })
        .collect();

    days.sort_by_key(|(date, _)| *date);
    days.into_iter().map(|(_, row)| row).collect()
}

/// `SUN`, `MON`, ... taken from the calendar date itself.
#[must_use]
pub fn weekday_label(date: NaiveDate) -> String {
    date.format("%a").to_string().to_uppercase()
}

#[allow(clippy::cast_possible_truncation)]
fn round_or_zero(value: Option<f64>) -> i32 {
    match value {
        Some(v) if v.is_finite() => v.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32,
        _ => 0,
    }
}

/// Icon family for a WMO weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    Sunny,
    Cloudy,
    Foggy,
    Drizzle,
    Rain,
    Snowy,
    Thunder,
}

impl WeatherIcon {
    /// See: https://open-meteo.com/en/docs#weathervariables
    #[must_use]
    pub const fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Sunny,
            45 | 48 => Self::Foggy,
            51 | 53 | 55 | 56 | 57 => Self::Drizzle,
            61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => Self::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snowy,
            95 | 96 | 99 => Self::Thunder,
            _ => Self::Cloudy,
        }
    }
}
