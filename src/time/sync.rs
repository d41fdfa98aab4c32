use super::{Clock, UnixTime};
use crate::fmt::Dbg;
use crate::network::application::sntp::{self, SntpError};
use crate::network::{Timeout, UdpSocket};
use core::fmt::Write as _;
use heapless::String;

const MAX_REMOTE_LEN: usize = 128;

/// Where and how long to ask for the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SntpConfig<'a> {
    /// Server host name or literal address.
    pub server: &'a str,
    /// Server port, normally 123.
    pub port: u16,
    /// Bound on the whole exchange.
    pub timeout_ms: u32,
}

impl Default for SntpConfig<'static> {
    fn default() -> Self {
        Self {
            server: "pool.ntp.org",
            port: sntp::PORT,
            timeout_ms: 1_000,
        }
    }
}

/// Why a clock sync failed. The clock is left untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// `server:port` does not fit the address buffer.
    InvalidServer,
    /// The timeout could not be applied to the socket.
    Socket,
    /// The request could not be sent (includes resolution failures).
    Send,
    /// No reply arrived in time, or the socket failed while waiting.
    Receive,
    /// The reply was malformed or refused service.
    Reply(SntpError),
    /// The platform clock rejected the new time.
    Clock,
}

#[cfg(feature = "defmt")]
impl defmt::Format for SyncError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            SyncError::InvalidServer => defmt::write!(f, "InvalidServer"),
            SyncError::Socket => defmt::write!(f, "Socket"),
            SyncError::Send => defmt::write!(f, "Send"),
            SyncError::Receive => defmt::write!(f, "Receive"),
            SyncError::Reply(e) => defmt::write!(f, "Reply({})", e),
            SyncError::Clock => defmt::write!(f, "Clock"),
        }
    }
}

/// Run one SNTP exchange and set `clock` from the server's transmit timestamp.
///
/// There is no retry; the caller decides when to try again. On success the
/// time that was written to the clock is returned.
pub fn sync_clock<S, K>(
    socket: &mut S,
    clock: &mut K,
    config: &SntpConfig,
) -> Result<UnixTime, SyncError>
where
    S: UdpSocket + Timeout,
    K: Clock,
{
    let time = exchange(socket, config).inspect_err(|e| {
        error!("SNTP sync with {} failed: {:?}", config.server, e);
    })?;

    clock.set(time).map_err(|e| {
        error!("setting clock failed: {:?}", Dbg(&e));
        SyncError::Clock
    })?;

    info!("acquired time from NTP server: {}", time.seconds);
    Ok(time)
}

fn exchange<S>(socket: &mut S, config: &SntpConfig) -> Result<UnixTime, SyncError>
where
    S: UdpSocket + Timeout,
{
    let mut remote: String<MAX_REMOTE_LEN> = String::new();
    write!(remote, "{}:{}", config.server, config.port).map_err(|_| SyncError::InvalidServer)?;

    socket.set_timeout(config.timeout_ms).map_err(|e| {
        debug!("set_timeout: {:?}", Dbg(&e));
        SyncError::Socket
    })?;

    socket
        .send_to(&remote, &sntp::request_packet())
        .map_err(|e| {
            debug!("send_to {}: {:?}", remote.as_str(), Dbg(&e));
            SyncError::Send
        })?;

    let mut reply = [0u8; sntp::PACKET_LEN];
    let n = socket.recv(&mut reply).map_err(|e| {
        debug!("recv: {:?}", Dbg(&e));
        SyncError::Receive
    })?;

    let reply = sntp::parse_reply(&reply[..n]).map_err(SyncError::Reply)?;
    trace!("SNTP reply stratum {}", reply.stratum);
    Ok(reply.time)
}
