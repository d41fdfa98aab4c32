//! Wall-clock time and SNTP synchronization.
//!
//! The forecast parser needs the current UTC hour to pick "current" values out
//! of hourly arrays. The platform real-time clock sits behind [`Clock`];
//! [`sync_clock`] sets it from an SNTP server.

mod sync;

#[cfg(feature = "std")]
mod hosted;

pub use sync::{SntpConfig, SyncError, sync_clock};

#[cfg(feature = "std")]
pub use hosted::SoftwareClock;

const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;

/// Time since the Unix epoch, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct UnixTime {
    /// Whole seconds.
    pub seconds: u64,
    /// Sub-second part, always below 1_000_000_000.
    pub nanos: u32,
}

impl UnixTime {
    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds, nanos: 0 }
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self {
            seconds: millis / 1_000,
            nanos: (millis % 1_000) as u32 * 1_000_000,
        }
    }

    /// Milliseconds since the epoch, saturating.
    pub const fn as_millis(&self) -> u64 {
        self.seconds
            .saturating_mul(1_000)
            .saturating_add(self.nanos as u64 / 1_000_000)
    }

    /// Hour of the UTC day, 0-23.
    pub const fn utc_hour(&self) -> u8 {
        ((self.seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR) as u8
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for UnixTime {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}s+{}ns", self.seconds, self.nanos)
    }
}

/// A settable real-time clock.
pub trait Clock {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Current UTC time.
    fn now(&self) -> Result<UnixTime, Self::Error>;
    /// Set the clock.
    fn set(&mut self, time: UnixTime) -> Result<(), Self::Error>;
}

impl<T: Clock> Clock for &mut T {
    type Error = T::Error;

    fn now(&self) -> Result<UnixTime, Self::Error> {
        T::now(self)
    }

    fn set(&mut self, time: UnixTime) -> Result<(), Self::Error> {
        T::set(self, time)
    }
}
