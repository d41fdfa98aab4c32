//! SNTPv4 client packets (RFC 4330).
//!
//! Only the unicast client exchange is covered: build a 48-byte request,
//! send it to the server, validate the reply and read its transmit timestamp.

use crate::time::UnixTime;

/// Size of an SNTP packet without extensions or authentication.
pub const PACKET_LEN: usize = 48;

/// Well-known SNTP server port.
pub const PORT: u16 = 123;

/// Seconds from the NTP epoch (1900-01-01) to the Unix epoch.
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

const VERSION: u8 = 4;
const MODE_CLIENT: u8 = 3;
const MODE_SERVER: u8 = 4;
const TRANSMIT_OFFSET: usize = 40;

/// Reasons a reply is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SntpError {
    /// Fewer than [`PACKET_LEN`] bytes were received.
    Truncated(usize),
    /// The reply was not sent in server mode.
    UnexpectedMode(u8),
    /// Stratum 0: the server refuses service (kiss-o'-death).
    KissOfDeath,
    /// The server left the transmit timestamp empty.
    ZeroTimestamp,
    /// The transmit timestamp lies before 1970.
    BeforeUnixEpoch,
}

#[cfg(feature = "defmt")]
impl defmt::Format for SntpError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            SntpError::Truncated(n) => defmt::write!(f, "Truncated({})", n),
            SntpError::UnexpectedMode(m) => defmt::write!(f, "UnexpectedMode({})", m),
            SntpError::KissOfDeath => defmt::write!(f, "KissOfDeath"),
            SntpError::ZeroTimestamp => defmt::write!(f, "ZeroTimestamp"),
            SntpError::BeforeUnixEpoch => defmt::write!(f, "BeforeUnixEpoch"),
        }
    }
}

/// 64-bit NTP timestamp: seconds since 1900 plus a 2^-32 fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NtpTimestamp {
    pub seconds: u32,
    pub fraction: u32,
}

impl NtpTimestamp {
    fn read(buf: &[u8]) -> Self {
        Self {
            seconds: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
            fraction: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
        }
    }

    /// Convert to Unix time.
    ///
    /// Timestamps with the top bit clear are taken to be in NTP era 1
    /// (after 2036-02-07), as RFC 4330 recommends. Era 0 timestamps before
    /// 1970 have no Unix representation and yield `None`.
    pub fn to_unix(self) -> Option<UnixTime> {
        let mut seconds = self.seconds as u64;
        if self.seconds & 0x8000_0000 == 0 {
            seconds += 1 << 32;
        }
        Some(UnixTime {
            seconds: seconds.checked_sub(NTP_UNIX_OFFSET)?,
            nanos: ((self.fraction as u64 * 1_000_000_000) >> 32) as u32,
        })
    }
}

/// Fields of a server reply the client cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub stratum: u8,
    pub transmit: NtpTimestamp,
    /// `transmit` as Unix time.
    pub time: UnixTime,
}

/// A client-mode request with every timestamp left at zero.
pub fn request_packet() -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    // LI = 0 (no warning), VN = 4, Mode = 3 (client)
    packet[0] = (VERSION << 3) | MODE_CLIENT;
    packet
}

/// Validate a server reply and extract its transmit timestamp.
pub fn parse_reply(buf: &[u8]) -> Result<Reply, SntpError> {
    if buf.len() < PACKET_LEN {
        return Err(SntpError::Truncated(buf.len()));
    }

    let mode = buf[0] & 0x07;
    if mode != MODE_SERVER {
        return Err(SntpError::UnexpectedMode(mode));
    }
    let stratum = buf[1];
    if stratum == 0 {
        return Err(SntpError::KissOfDeath);
    }

    let transmit = NtpTimestamp::read(&buf[TRANSMIT_OFFSET..TRANSMIT_OFFSET + 8]);
    if transmit.seconds == 0 && transmit.fraction == 0 {
        return Err(SntpError::ZeroTimestamp);
    }
    let time = transmit.to_unix().ok_or(SntpError::BeforeUnixEpoch)?;

    Ok(Reply {
        stratum,
        transmit,
        time,
    })
}
