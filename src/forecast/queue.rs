//! Single-slot hand-off between the fetch loop and its consumers.

use super::ForecastSnapshot;
use core::cell::RefCell;
use critical_section::Mutex;
use heapless::Deque;

/// Holds at most one [`ForecastSnapshot`]; a new one always replaces an
/// unconsumed old one.
///
/// Can be placed in a `static` or owned by the application and shared by
/// reference.
///
/// ```
/// use skycast::forecast::ForecastQueue;
///
/// static FORECAST: ForecastQueue = ForecastQueue::new();
/// assert!(FORECAST.try_receive().is_none());
/// ```
pub struct ForecastQueue {
    slot: Mutex<RefCell<Deque<ForecastSnapshot, 1>>>,
}

impl ForecastQueue {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Store `snapshot`, purging whatever is waiting. Returns the purged snapshot.
    pub fn publish(&self, snapshot: ForecastSnapshot) -> Option<ForecastSnapshot> {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            let mut purged = None;
            let mut pending = snapshot;
            while let Err(rejected) = slot.push_back(pending) {
                purged = slot.pop_front();
                pending = rejected;
            }
            if purged.is_some() {
                debug!("replaced unconsumed forecast snapshot");
            }
            purged
        })
    }

    /// Take the waiting snapshot, if any, without blocking.
    pub fn try_receive(&self) -> Option<ForecastSnapshot> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).pop_front())
    }

    /// Copy of the waiting snapshot, leaving it in place.
    pub fn peek(&self) -> Option<ForecastSnapshot> {
        critical_section::with(|cs| self.slot.borrow_ref(cs).front().copied())
    }

    pub fn is_empty(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow_ref(cs).is_empty())
    }

    /// Wait up to `timeout` for a snapshot.
    #[cfg(feature = "std")]
    pub fn receive_timeout(&self, timeout: std::time::Duration) -> Option<ForecastSnapshot> {
        const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(10);

        let deadline = std::time::Instant::now() + timeout;
        loop {
            if let Some(snapshot) = self.try_receive() {
                return Some(snapshot);
            }
            let now = std::time::Instant::now();
            if now >= deadline {
                return None;
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

impl Default for ForecastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for ForecastQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ForecastQueue")
            .field("pending", &!self.is_empty())
            .finish()
    }
}
