//! Request targets for the Open-Meteo forecast endpoint.

use super::error::Error;
use core::fmt::Write as _;
use heapless::String;

/// Public Open-Meteo API host.
pub const DEFAULT_SERVER: &str = "api.open-meteo.com";

/// Capacity of a built request target.
pub const MAX_PATH_LEN: usize = 256;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,uv_index";

/// A forecast request for one location.
///
/// Hourly arrays come back in UTC (the endpoint's default time zone), which is
/// what indexing by UTC hour relies on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastQuery<'a> {
    pub latitude: f32,
    pub longitude: f32,
    pub forecast_days: u8,
    /// Appended verbatim, e.g. `&apikey=...` for a commercial endpoint.
    pub extra: &'a str,
}

impl<'a> ForecastQuery<'a> {
    pub fn new(latitude: f32, longitude: f32) -> Self {
        Self {
            latitude,
            longitude,
            forecast_days: 1,
            extra: "",
        }
    }

    pub fn with_forecast_days(mut self, days: u8) -> Self {
        self.forecast_days = days;
        self
    }

    pub fn with_extra(mut self, extra: &'a str) -> Self {
        self.extra = extra;
        self
    }

    /// Render the request target (path and query string).
    pub fn path(&self) -> Result<String<MAX_PATH_LEN>, Error> {
        let mut path = String::new();
        write!(
            path,
            "/v1/forecast?latitude={:.4}&longitude={:.4}&current={}&hourly={}&forecast_days={}{}",
            self.latitude,
            self.longitude,
            CURRENT_FIELDS,
            HOURLY_FIELDS,
            self.forecast_days,
            self.extra
        )
        .map_err(|_| Error::CapacityExceeded)?;
        Ok(path)
    }
}
