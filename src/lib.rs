//! # skycast - embedded weather forecast client
//!
//! Fetches a weather forecast from an HTTP JSON API, reduces it to the day's
//! minimum, maximum and current value of four metrics, and hands the result
//! to the rest of the firmware through a single-slot queue. The device clock
//! is set over SNTP so "current" can be resolved to a UTC hour.
//!
//! ## Layout
//!
//! - [`network`]: transport traits the platform implements, plus the HTTP/1.1
//!   client and the SNTP packet codec built on them
//! - [`time`]: the [`time::Clock`] trait and [`time::sync_clock`]
//! - [`forecast`]: the [`forecast::Forecaster`], the document parser, the
//!   hourly extractors and the [`forecast::ForecastQueue`]
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! skycast = "0.1.0"
//! ```
//!
//! A typical firmware loop syncs the clock once, then fetches periodically:
//!
//! ```rust,ignore
//! use skycast::forecast::{ForecastQuery, ForecastQueue, Forecaster, DEFAULT_SERVER};
//! use skycast::time::{sync_clock, SntpConfig};
//!
//! static FORECAST: ForecastQueue = ForecastQueue::new();
//!
//! let mut forecaster = Forecaster::new(tcp_stack, rtc, &FORECAST);
//! sync_clock(&mut udp_socket, forecaster.clock_mut(), &SntpConfig::default())?;
//!
//! let path = ForecastQuery::new(47.3769, 8.5417).path()?;
//! loop {
//!     if let Err(e) = forecaster.fetch(DEFAULT_SERVER, &path) {
//!         // logged already; the previous snapshot stays in FORECAST
//!     }
//!     delay.delay_ms(15 * 60 * 1000);
//! }
//! ```
//!
//! ## Platform Support
//!
//! The crate is `no_std` and needs `alloc` for the parsed JSON document. It
//! relies on `critical-section` for the queue, so the target must provide a
//! critical-section implementation.
//!
//! ## Optional Features
//!
//! - `std`: `std::net` transports, a software clock and blocking queue receive
//! - `defmt`: log through `defmt` and implement `defmt::Format` for public types
//! - `log`: log through the `log` facade

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

// Must come first so the logging macros are visible to the other modules.
#[macro_use]
mod fmt;

/// Network abstraction layer providing protocol implementations and connection management.
///
/// The platform supplies TCP and UDP through the traits defined here; the
/// HTTP client and SNTP codec are written against them.
pub mod network;

/// Wall-clock time, the platform clock trait and SNTP clock synchronization.
#[allow(missing_docs)]
pub mod time;

/// Forecast fetching, parsing and publication.
#[allow(missing_docs)]
pub mod forecast;
