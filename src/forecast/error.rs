//! Errors of a forecast fetch or parse.

use super::extract::ExtractError;
use crate::network::error::Error as NetworkError;
use crate::time::SyncError;

/// The four metrics a snapshot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
    WindSpeed,
    UvIndex,
}

impl Metric {
    /// Key of the metric in the `current` and `hourly` objects.
    pub const fn key(self) -> &'static str {
        match self {
            Metric::Temperature => "temperature_2m",
            Metric::Humidity => "relative_humidity_2m",
            Metric::WindSpeed => "wind_speed_10m",
            Metric::UvIndex => "uv_index",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Metric {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.key())
    }
}

/// Why a fetch or parse produced no snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The server name could not be resolved.
    Resolution,
    /// No socket could be allocated.
    Socket,
    /// The server could not be reached.
    Connect,
    /// The request or response failed on the wire (includes timeouts).
    Transport(NetworkError),
    /// The response does not fit the receive buffer.
    ResponseTooLarge,
    /// The server answered with a non-2xx status.
    Status(u16),
    /// The body is not valid JSON (or holds no JSON object at all).
    Parse,
    /// A required JSON section is missing or has the wrong type.
    Schema(&'static str),
    /// An hourly series could not be reduced.
    Extract(Metric, ExtractError),
    /// The clock could not be read.
    Clock,
    /// The clock could not be set over SNTP.
    TimeSync(SyncError),
    /// A fixed-size buffer (address, request path, output) is too small.
    CapacityExceeded,
}

impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::BufferFull => Error::ResponseTooLarge,
            other => Error::Transport(other),
        }
    }
}

impl From<SyncError> for Error {
    fn from(e: SyncError) -> Self {
        Error::TimeSync(e)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Resolution => defmt::write!(f, "Resolution"),
            Error::Socket => defmt::write!(f, "Socket"),
            Error::Connect => defmt::write!(f, "Connect"),
            Error::Transport(e) => defmt::write!(f, "Transport({})", e),
            Error::ResponseTooLarge => defmt::write!(f, "ResponseTooLarge"),
            Error::Status(code) => defmt::write!(f, "Status({})", code),
            Error::Parse => defmt::write!(f, "Parse"),
            Error::Schema(path) => defmt::write!(f, "Schema({})", path),
            Error::Extract(metric, e) => defmt::write!(f, "Extract({}, {})", metric, e),
            Error::Clock => defmt::write!(f, "Clock"),
            Error::TimeSync(e) => defmt::write!(f, "TimeSync({})", e),
            Error::CapacityExceeded => defmt::write!(f, "CapacityExceeded"),
        }
    }
}
