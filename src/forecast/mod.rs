//! Weather forecast client.
//!
//! [`Forecaster`] fetches a forecast document over HTTP, reduces it to a
//! [`ForecastSnapshot`] and publishes the snapshot to a [`ForecastQueue`]
//! for the rest of the application.
//!
//! # Usage
//!
//! ```rust,no_run
//! use skycast::forecast::{ForecastQuery, ForecastQueue, Forecaster, DEFAULT_SERVER};
//! # use skycast::network::error::Error;
//! # use skycast::network::{Close, Connect, Connection, Read, Timeout, Write};
//! # use skycast::time::{Clock, UnixTime};
//! # struct Tcp;
//! # impl Connection for Tcp {}
//! # impl Read for Tcp {
//! #     type Error = Error;
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Error> { Ok(0) }
//! # }
//! # impl Write for Tcp {
//! #     type Error = Error;
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Error> { Ok(()) }
//! # }
//! # impl Close for Tcp {
//! #     type Error = Error;
//! #     fn close(self) -> Result<(), Error> { Ok(()) }
//! # }
//! # impl Timeout for Tcp {
//! #     type Error = Error;
//! #     fn set_timeout(&mut self, _ms: u32) -> Result<(), Error> { Ok(()) }
//! # }
//! # struct Stack;
//! # impl Connect for Stack {
//! #     type Connection = Tcp;
//! #     type Error = Error;
//! #     fn connect(&mut self, _remote: &str) -> Result<Tcp, Error> { Ok(Tcp) }
//! # }
//! # struct Rtc;
//! # impl Clock for Rtc {
//! #     type Error = ();
//! #     fn now(&self) -> Result<UnixTime, ()> { Ok(UnixTime::from_secs(0)) }
//! #     fn set(&mut self, _time: UnixTime) -> Result<(), ()> { Ok(()) }
//! # }
//!
//! static FORECAST: ForecastQueue = ForecastQueue::new();
//!
//! let mut forecaster = Forecaster::new(Stack, Rtc, &FORECAST);
//! let path = ForecastQuery::new(47.3769, 8.5417).path()?;
//! forecaster.fetch(DEFAULT_SERVER, &path)?;
//!
//! // Elsewhere, e.g. in the display task:
//! if let Some(snapshot) = FORECAST.try_receive() {
//!     let _ = snapshot.temperature.current;
//! }
//! # Ok::<(), skycast::forecast::Error>(())
//! ```

pub mod error;
pub mod extract;
pub mod parser;
pub mod query;
pub mod queue;


pub use error::{Error, Metric};
pub use query::{DEFAULT_SERVER, ForecastQuery};
pub use queue::ForecastQueue;

use crate::fmt::Dbg;
use crate::network::application::http::{Client, Request};
use crate::network::error::Error as NetworkError;
use crate::network::{Close, Connect, Connection, Read, Timeout, Write};
use crate::time::Clock;
use core::fmt::Write as _;
use heapless::String;
use serde::Serialize;

const MAX_REMOTE_LEN: usize = 128;

/// One weather metric over the forecast day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricSample {
    /// Lowest hourly value of the day.
    pub min: f32,
    /// Highest hourly value of the day.
    pub max: f32,
    /// Live reading, or the hourly value at the current UTC hour.
    pub current: f32,
}

/// Everything one fetch produces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ForecastSnapshot {
    pub temperature: MetricSample,
    pub humidity: MetricSample,
    pub wind_speed: MetricSample,
    pub uv_index: MetricSample,
    /// UTC hour (0-23) the hourly "current" values were taken at.
    pub hour: u8,
}

impl ForecastSnapshot {
    /// Serialize as JSON into `buf`, returning the number of bytes written.
    pub fn to_json(&self, buf: &mut [u8]) -> Result<usize, Error> {
        serde_json_core::to_slice(self, buf).map_err(|_| Error::CapacityExceeded)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MetricSample {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}..{} now {}", self.min, self.max, self.current)
    }
}

/// Connection settings for forecast requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastConfig {
    /// HTTP port of the forecast server.
    pub port: u16,
    /// Bound on the whole request/response exchange, measured on the
    /// forecaster's clock.
    pub timeout_ms: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            port: 80,
            timeout_ms: 5_000,
        }
    }
}

fn connect_error(e: NetworkError) -> Error {
    match e {
        NetworkError::InvalidAddress => Error::Resolution,
        NetworkError::SocketError => Error::Socket,
        _ => Error::Connect,
    }
}

fn close_quietly<C: Connection>(connection: C) {
    if let Err(e) = Close::close(connection) {
        warn!("closing connection failed: {:?}", Dbg(&e));
    }
}

/// Fetches, parses and publishes forecasts.
///
/// One fetch is one network round trip; there is no retry. Parsing runs on
/// the calling thread right after the response has been read, so a fetch has
/// fully finished before the next one can start.
#[derive(Debug)]
pub struct Forecaster<'q, N, K> {
    connector: N,
    clock: K,
    queue: &'q ForecastQueue,
    config: ForecastConfig,
}

impl<'q, N, K> Forecaster<'q, N, K>
where
    N: Connect<Error = NetworkError>,
    N::Connection: Timeout,
    <N::Connection as Read>::Error: Into<NetworkError>,
    <N::Connection as Write>::Error: Into<NetworkError>,
    K: Clock,
{
    pub fn new(connector: N, clock: K, queue: &'q ForecastQueue) -> Self {
        Self {
            connector,
            clock,
            queue,
            config: ForecastConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ForecastConfig) -> Self {
        self.config = config;
        self
    }

    /// GET `path` from `server`, parse the body and publish the snapshot.
    ///
    /// Sending the request and reading the response must finish within
    /// [`ForecastConfig::timeout_ms`], otherwise the fetch fails with
    /// `Transport(Timeout)`. The connection is closed on every path once it
    /// has been opened.
    pub fn fetch(&mut self, server: &str, path: &str) -> Result<ForecastSnapshot, Error> {
        let mut remote: String<MAX_REMOTE_LEN> = String::new();
        write!(remote, "{}:{}", server, self.config.port).map_err(|_| Error::CapacityExceeded)?;

        let request = Request::get(path)
            .with_header("Host", server)
            .and_then(|r| r.with_header("Accept", "application/json"))
            .and_then(|r| r.with_header("Connection", "close"))
            .map_err(|_| Error::CapacityExceeded)?;

        let started = self.clock.now().map_err(|e| {
            error!("cannot read clock: {:?}", Dbg(&e));
            Error::Clock
        })?;
        let deadline = started
            .as_millis()
            .saturating_add(u64::from(self.config.timeout_ms));

        let connection = self.connector.connect(&remote).map_err(|e| {
            error!("cannot connect to {}: {:?}", remote.as_str(), e);
            connect_error(e)
        })?;
        info!("HTTP connection to {} established", server);

        let mut client = Client::new(connection);
        let clock = &self.clock;
        let result = client.request_within(&request, || {
            let now = clock.now().ok()?.as_millis();
            let left = deadline.checked_sub(now)?;
            Some(u32::try_from(left).unwrap_or(u32::MAX))
        });
        close_quietly(client.into_inner());

        let response = result.map_err(|e| {
            error!("GET {} failed: {:?}", path, e);
            Error::from(e)
        })?;

        info!("GET response status - {}", response.status_code);
        if !response.is_success() {
            return Err(Error::Status(response.status_code));
        }

        let body = response.body_str().map_err(|_| {
            error!("response body is not UTF-8");
            Error::Parse
        })?;
        let start = body.find('{').ok_or_else(|| {
            error!("response body holds no JSON object");
            Error::Parse
        })?;

        self.parse(&body[start..])
    }

    /// Parse `document` at the clock's current UTC hour and publish the result.
    ///
    /// Nothing is published when parsing fails.
    pub fn parse(&self, document: &str) -> Result<ForecastSnapshot, Error> {
        let now = self.clock.now().map_err(|e| {
            error!("cannot read clock: {:?}", Dbg(&e));
            Error::Clock
        })?;

        let snapshot = parser::parse(document, now.utc_hour())?;
        self.queue.publish(snapshot);
        info!("forecast published for UTC hour {}", snapshot.hour);
        Ok(snapshot)
    }

    pub fn queue(&self) -> &'q ForecastQueue {
        self.queue
    }

    /// The clock, e.g. to pass to [`crate::time::sync_clock`].
    pub fn clock_mut(&mut self) -> &mut K {
        &mut self.clock
    }
}
