//! In-memory transports and clock shared by the integration tests.

#![allow(dead_code)]

use skycast::network::error::Error;
use skycast::network::*;
use skycast::time::{Clock, UnixTime};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// What happened to the connections a [`MockNetwork`] handed out.
#[derive(Debug, Default)]
pub struct Tap {
    pub connects: Cell<usize>,
    pub closes: Cell<usize>,
    pub remote: RefCell<String>,
    pub written: RefCell<Vec<u8>>,
    pub timeout_ms: Cell<Option<u32>>,
}

#[derive(Debug)]
pub struct MockConnection {
    /// Pieces returned by successive reads; an `Err` simulates a transport failure.
    reads: VecDeque<Result<Vec<u8>, Error>>,
    tap: Rc<Tap>,
    /// Clock moved forward by the given milliseconds on every read.
    slow: Option<(Rc<Cell<UnixTime>>, u64)>,
}

impl Read for MockConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if let Some((time, millis)) = &self.slow {
            time.set(UnixTime::from_millis(time.get().as_millis() + millis));
        }
        match self.reads.pop_front() {
            None => Ok(0),
            Some(Err(e)) => Err(e),
            Some(Ok(mut piece)) => {
                let len = buf.len().min(piece.len());
                buf[..len].copy_from_slice(&piece[..len]);
                if len < piece.len() {
                    self.reads.push_front(Ok(piece.split_off(len)));
                }
                Ok(len)
            }
        }
    }
}

impl Write for MockConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        // Accept at most 64 bytes per call to exercise partial writes.
        let len = buf.len().min(64);
        self.tap.written.borrow_mut().extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        self.tap.closes.set(self.tap.closes.get() + 1);
        Ok(())
    }
}

impl Timeout for MockConnection {
    type Error = Error;

    fn set_timeout(&mut self, timeout_ms: u32) -> Result<(), Self::Error> {
        self.tap.timeout_ms.set(Some(timeout_ms));
        Ok(())
    }
}

impl Connection for MockConnection {}

/// Hands out one scripted connection per `connect`, or fails with `refuse`.
#[derive(Debug)]
pub struct MockNetwork {
    pub tap: Rc<Tap>,
    pub refuse: Option<Error>,
    pub reads: Vec<Result<Vec<u8>, Error>>,
    pub slow: Option<(Rc<Cell<UnixTime>>, u64)>,
}

impl MockNetwork {
    /// Serve `response` split into pieces of `piece_len` bytes.
    pub fn serving(response: &[u8], piece_len: usize) -> Self {
        Self {
            tap: Rc::default(),
            refuse: None,
            reads: response.chunks(piece_len).map(|c| Ok(c.to_vec())).collect(),
            slow: None,
        }
    }

    /// Every read on the handed-out connection advances `clock` by `millis`.
    pub fn advancing(mut self, clock: &MockClock, millis: u64) -> Self {
        self.slow = Some((Rc::clone(&clock.time), millis));
        self
    }

    pub fn refusing(error: Error) -> Self {
        Self {
            tap: Rc::default(),
            refuse: Some(error),
            reads: Vec::new(),
            slow: None,
        }
    }
}

impl Connect for MockNetwork {
    type Connection = MockConnection;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        self.tap.connects.set(self.tap.connects.get() + 1);
        *self.tap.remote.borrow_mut() = remote.to_string();
        if let Some(e) = self.refuse {
            return Err(e);
        }
        Ok(MockConnection {
            reads: self.reads.drain(..).collect(),
            tap: Rc::clone(&self.tap),
            slow: self.slow.clone(),
        })
    }
}

/// A settable clock, optionally broken. The time is shared so a connection
/// can advance it.
#[derive(Debug, Default)]
pub struct MockClock {
    pub time: Rc<Cell<UnixTime>>,
    pub sets: Cell<usize>,
    pub broken: bool,
}

impl MockClock {
    pub fn at(seconds: u64) -> Self {
        Self {
            time: Rc::new(Cell::new(UnixTime::from_secs(seconds))),
            ..Default::default()
        }
    }
}

impl Clock for MockClock {
    type Error = ();

    fn now(&self) -> Result<UnixTime, Self::Error> {
        if self.broken { Err(()) } else { Ok(self.time.get()) }
    }

    fn set(&mut self, time: UnixTime) -> Result<(), Self::Error> {
        if self.broken {
            return Err(());
        }
        self.time.set(time);
        self.sets.set(self.sets.get() + 1);
        Ok(())
    }
}

/// UDP socket with a canned reply (or none, like an unreachable server).
#[derive(Debug, Default)]
pub struct MockUdpSocket {
    pub reply: Option<Vec<u8>>,
    pub sent_to: Vec<String>,
    pub sent: Vec<Vec<u8>>,
    pub timeout_ms: Option<u32>,
    pub unresolvable: bool,
}

impl UdpSocket for MockUdpSocket {
    type Error = Error;

    fn send_to(&mut self, remote: &str, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.unresolvable {
            return Err(Error::InvalidAddress);
        }
        self.sent_to.push(remote.to_string());
        self.sent.push(buf.to_vec());
        Ok(buf.len())
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.reply.take() {
            Some(reply) => {
                let len = buf.len().min(reply.len());
                buf[..len].copy_from_slice(&reply[..len]);
                Ok(len)
            }
            None => Err(Error::Timeout),
        }
    }
}

impl Timeout for MockUdpSocket {
    type Error = Error;

    fn set_timeout(&mut self, timeout_ms: u32) -> Result<(), Self::Error> {
        self.timeout_ms = Some(timeout_ms);
        Ok(())
    }
}

/// 24 hourly values `base + step * hour` as a JSON array.
pub fn hourly(base: f32, step: f32) -> String {
    let values: Vec<String> = (0..24).map(|h| format!("{}", base + step * h as f32)).collect();
    format!("[{}]", values.join(","))
}

/// A complete forecast document.
pub fn forecast_document() -> String {
    format!(
        r#"{{"latitude":47.38,"longitude":8.54,"generationtime_ms":0.1,"utc_offset_seconds":0,
"current":{{"time":"2024-06-01T13:30","interval":900,"temperature_2m":21.5,"relative_humidity_2m":48,"wind_speed_10m":7.9}},
"hourly":{{"temperature_2m":{},"relative_humidity_2m":{},"wind_speed_10m":{},"uv_index":{}}}}}"#,
        hourly(12.0, 0.5),
        hourly(90.0, -2.0),
        hourly(3.0, 0.25),
        hourly(0.0, 0.5),
    )
}

/// A response framed by the server closing the connection.
pub fn until_close_response(body: &str) -> Vec<u8> {
    format!("HTTP/1.0 200 OK\r\nContent-Type: application/json\r\n\r\n{body}").into_bytes()
}

pub fn http_response(status: &str, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

pub fn chunked_response(body: &str, chunk_len: usize) -> Vec<u8> {
    let mut out = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
    for chunk in body.as_bytes().chunks(chunk_len) {
        out.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        out.extend_from_slice(chunk);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}
