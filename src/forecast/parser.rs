//! Forecast document parsing.
//!
//! Expected shape (extra keys are ignored):
//!
//! ```json
//! {
//!   "current": { "temperature_2m": 21.4, "relative_humidity_2m": 48, "wind_speed_10m": 7.9 },
//!   "hourly": {
//!     "temperature_2m": [ ...24+ numbers... ],
//!     "relative_humidity_2m": [ ... ],
//!     "wind_speed_10m": [ ... ],
//!     "uv_index": [ ... ]
//!   }
//! }
//! ```

use super::error::{Error, Metric};
use super::extract::{current_value, min_max};
use super::{ForecastSnapshot, MetricSample};
use serde_json::Value;

static MISSING: Value = Value::Null;

fn sample(hourly: &Value, metric: Metric, hour: u8) -> Result<MetricSample, Error> {
    let series = hourly.get(metric.key()).unwrap_or(&MISSING);
    let fail = |e| {
        error!("hourly {} unusable: {:?}", metric.key(), e);
        Error::Extract(metric, e)
    };

    let (min, max) = min_max(series).map_err(fail)?;
    let current = current_value(series, hour as usize).map_err(fail)?;
    Ok(MetricSample { min, max, current })
}

/// Prefer the live reading from the `current` section over the hourly value.
fn apply_current_conditions(sample: &mut MetricSample, current: Option<&Value>, metric: Metric) {
    match current.and_then(|c| c.get(metric.key())).and_then(Value::as_f64) {
        Some(value) => sample.current = value as f32,
        None => warn!(
            "current {} missing or not a number, using hourly value {}",
            metric.key(),
            sample.current
        ),
    }
}

/// Parse a forecast document, taking hourly "current" values at UTC `hour`.
///
/// The parsed document is dropped before returning on every path.
pub fn parse(document: &str, hour: u8) -> Result<ForecastSnapshot, Error> {
    let json: Value = serde_json::from_str(document).map_err(|_| {
        error!("error parsing JSON");
        Error::Parse
    })?;

    let hourly = json
        .get("hourly")
        .filter(|h| h.is_object())
        .ok_or_else(|| {
            error!("document has no hourly section");
            Error::Schema("hourly")
        })?;
    let current = json.get("current");

    let mut temperature = sample(hourly, Metric::Temperature, hour)?;
    let mut humidity = sample(hourly, Metric::Humidity, hour)?;
    let wind_speed = sample(hourly, Metric::WindSpeed, hour)?;
    let uv_index = sample(hourly, Metric::UvIndex, hour)?;

    apply_current_conditions(&mut temperature, current, Metric::Temperature);
    apply_current_conditions(&mut humidity, current, Metric::Humidity);

    // Wind speed always follows the hourly series; the live reading is informational.
    if let Some(live) = current
        .and_then(|c| c.get(Metric::WindSpeed.key()))
        .and_then(Value::as_f64)
    {
        debug!("live wind speed {}, hourly {}", live, wind_speed.current);
    }

    Ok(ForecastSnapshot {
        temperature,
        humidity,
        wind_speed,
        uv_index,
        hour,
    })
}
