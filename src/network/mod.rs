//! A network abstraction layer for embedded systems
//!
//! The forecast client never touches a socket API directly. The platform
//! provides a TCP connector and a UDP socket through the traits below, and
//! the protocol code in [`application`] drives them.
//!

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Application-layer protocols (HTTP, SNTP)
pub mod application;

/// Adapters over `std::net` for hosted targets
#[cfg(feature = "std")]
pub mod hosted;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, Read, Timeout, UdpSocket, Write};
}

// Core synchronous traits
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// Bounds every blocking read/write on a connection or socket.
pub trait Timeout {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Apply `timeout_ms` to subsequent reads and writes. `0` disables the timeout.
    fn set_timeout(&mut self, timeout_ms: u32) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
///
/// `remote` is `host:port`. Implementations resolve the host themselves and
/// should report a failed lookup as [`error::Error::InvalidAddress`] and a
/// failed socket allocation as [`error::Error::SocketError`], so callers can
/// tell those apart from a refused connection.
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}

// UDP
pub trait UdpSocket {
    type Error: core::fmt::Debug;
    fn send_to(&mut self, remote: &str, buf: &[u8]) -> Result<usize, Self::Error>;
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}
