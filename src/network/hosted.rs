//! `std::net` implementations of the network traits.
//!
//! Used on Linux-class devices and in host-side tools and tests.

use super::error::Error;
use super::{Close, Connect, Connection, Read, Timeout, UdpSocket, Write};
use std::io::{self, ErrorKind, Read as _, Write as _};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket as NetUdpSocket};
use std::time::Duration;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

fn resolve(remote: &str) -> Result<SocketAddr, Error> {
    remote
        .to_socket_addrs()
        .map_err(|_| Error::InvalidAddress)?
        .find(SocketAddr::is_ipv4)
        .ok_or(Error::InvalidAddress)
}

fn map_io(e: io::Error, fallback: Error) -> Error {
    match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => Error::Timeout,
        ErrorKind::ConnectionRefused => Error::ConnectionRefused,
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe => {
            Error::ConnectionClosed
        }
        _ => fallback,
    }
}

fn timeout(timeout_ms: u32) -> Option<Duration> {
    (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms as u64))
}

/// Opens IPv4 TCP connections with `TcpStream`.
#[derive(Debug, Clone, Copy)]
pub struct TcpConnector {
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connect for TcpConnector {
    type Connection = TcpConnection;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        let addr = resolve(remote)?;
        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout)
            .map_err(|e| map_io(e, Error::ConnectionRefused))?;
        Ok(TcpConnection { stream })
    }
}

#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
}

impl TcpConnection {
    pub fn from_stream(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl Read for TcpConnection {
    type Error = Error;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.stream.read(buf).map_err(|e| map_io(e, Error::ReadError))
    }
}

impl Write for TcpConnection {
    type Error = Error;
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.stream.write(buf).map_err(|e| map_io(e, Error::WriteError))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream.flush().map_err(|e| map_io(e, Error::WriteError))
    }
}

impl Close for TcpConnection {
    type Error = Error;
    fn close(self) -> Result<(), Self::Error> {
        // The descriptor itself is released when `stream` drops.
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(_) => Err(Error::NotOpen),
        }
    }
}

impl Timeout for TcpConnection {
    type Error = Error;
    fn set_timeout(&mut self, timeout_ms: u32) -> Result<(), Self::Error> {
        self.stream
            .set_read_timeout(timeout(timeout_ms))
            .and_then(|()| self.stream.set_write_timeout(timeout(timeout_ms)))
            .map_err(|_| Error::SocketError)
    }
}

impl Connection for TcpConnection {}

/// An unconnected IPv4 UDP socket.
#[derive(Debug)]
pub struct StdUdpSocket {
    socket: NetUdpSocket,
}

impl StdUdpSocket {
    /// Bind to an ephemeral local port.
    pub fn bind() -> Result<Self, Error> {
        let socket = NetUdpSocket::bind("0.0.0.0:0").map_err(|_| Error::SocketError)?;
        Ok(Self { socket })
    }
}

impl UdpSocket for StdUdpSocket {
    type Error = Error;

    fn send_to(&mut self, remote: &str, buf: &[u8]) -> Result<usize, Self::Error> {
        let addr = resolve(remote)?;
        self.socket
            .send_to(buf, addr)
            .map_err(|e| map_io(e, Error::WriteError))
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.socket.recv(buf).map_err(|e| map_io(e, Error::ReadError))
    }
}

impl Timeout for StdUdpSocket {
    type Error = Error;
    fn set_timeout(&mut self, timeout_ms: u32) -> Result<(), Self::Error> {
        self.socket
            .set_read_timeout(timeout(timeout_ms))
            .and_then(|()| self.socket.set_write_timeout(timeout(timeout_ms)))
            .map_err(|_| Error::SocketError)
    }
}
