use super::{Clock, UnixTime};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock that keeps its own offset from the host's system time.
///
/// Setting it never touches the operating system clock, which needs
/// privileges; it only shifts what [`Clock::now`] reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareClock {
    /// Signed offset from system time, in nanoseconds.
    offset_nanos: i128,
}

impl SoftwareClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn system_nanos() -> Result<i128, std::time::SystemTimeError> {
        Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos() as i128)
    }
}

impl Clock for SoftwareClock {
    type Error = std::time::SystemTimeError;

    fn now(&self) -> Result<UnixTime, Self::Error> {
        let nanos = (Self::system_nanos()? + self.offset_nanos).max(0) as u128;
        let since_epoch = Duration::from_nanos(nanos as u64);
        Ok(UnixTime {
            seconds: since_epoch.as_secs(),
            nanos: since_epoch.subsec_nanos(),
        })
    }

    fn set(&mut self, time: UnixTime) -> Result<(), Self::Error> {
        let target = time.seconds as i128 * 1_000_000_000 + time.nanos as i128;
        self.offset_nanos = target - Self::system_nanos()?;
        Ok(())
    }
}
