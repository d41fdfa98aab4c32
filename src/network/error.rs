//! Common error types for network operations

/// A common error type for network operations.
///
/// Platform connectors and sockets report their failures with this type so
/// the forecast client can map them onto resolution, socket, connect and
/// transport failures.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on a connection that is not open.
    NotOpen,
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// A connection attempt was refused.
    ConnectionRefused,
    /// A timeout occurred.
    Timeout,
    /// The connection was closed.
    ConnectionClosed,
    /// The address could not be parsed or resolved.
    InvalidAddress,
    /// No socket could be allocated.
    SocketError,
    /// A protocol-specific error occurred.
    ProtocolError,
    /// A fixed-size buffer ran out of room.
    BufferFull,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotOpen => defmt::write!(f, "NotOpen"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::SocketError => defmt::write!(f, "SocketError"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
            Error::BufferFull => defmt::write!(f, "BufferFull"),
        }
    }
}
