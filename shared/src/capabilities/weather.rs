//! Daily forecast gateway on top of the shell's HTTP capability.

use crux_http::Http;
use serde::Deserialize;
use url::Url;

use crate::config::WeatherConfig;
use crate::error::WeatherError;
use crate::forecast::RawForecast;
use crate::model::Point;
use crate::DAILY_METRICS;

/// `GET {base}?latitude=..&longitude=..&daily=..&timezone=..&past_days=..&forecast_days=..`
pub fn forecast_url(config: &WeatherConfig, point: Point) -> Result<Url, WeatherError> {
    Url::parse_with_params(
        &config.base_url,
        &[
            ("latitude", point.lat.to_string()),
            ("longitude", point.lon.to_string()),
            ("daily", DAILY_METRICS.join(",")),
            ("timezone", config.timezone.clone()),
            ("past_days", config.past_days.to_string()),
            ("forecast_days", config.forecast_days.to_string()),
        ],
    )
    .map_err(|e| WeatherError::Other(format!("invalid forecast url: {e}")))
}

/// Issues one forecast request; `callback` always receives a decoded result.
pub fn fetch_daily<Ev, F>(
    http: &Http<Ev>,
    config: &WeatherConfig,
    point: Point,
    callback: F,
) -> Result<(), WeatherError>
where
    Ev: Send + 'static,
    F: FnOnce(Result<RawForecast, WeatherError>) -> Ev + Send + 'static,
{
    let url = forecast_url(config, point)?;
    http.get(url.as_str())
        .send(move |result| callback(forecast_outcome(result)));
    Ok(())
}

fn forecast_outcome(
    result: crux_http::Result<crux_http::Response<Vec<u8>>>,
) -> Result<RawForecast, WeatherError> {
    let mut response = result.map_err(|e| WeatherError::Network(e.to_string()))?;
    let status: u16 = response.status().into();
    let body = response.take_body().unwrap_or_default();
    decode_forecast(status, &body)
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    reason: Option<String>,
}

/// Maps a raw HTTP reply to the payload or a gateway error.
pub fn decode_forecast(status: u16, body: &[u8]) -> Result<RawForecast, WeatherError> {
    if !(200..300).contains(&status) {
        let reason = serde_json::from_slice::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.reason)
            .filter(|r| !r.trim().is_empty());
        return Err(match reason {
            Some(reason) => WeatherError::Api { status, reason },
            None => WeatherError::Http { status },
        });
    }

    serde_json::from_slice(body).map_err(|e| WeatherError::MalformedPayload(e.to_string()))
}
