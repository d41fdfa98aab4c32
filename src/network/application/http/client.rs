use crate::fmt::Dbg;
use crate::network::error::Error;
use crate::network::{Connection, Read, Timeout, Write};
use heapless::{String, Vec};

const MAX_HEADERS: usize = 16;
const MAX_HEADER_NAME_LEN: usize = 64;
const MAX_HEADER_VALUE_LEN: usize = 256;
const REQUEST_BUFFER_LEN: usize = 1024;

/// Capacity of the receive buffer: status line, headers and body must fit.
pub const RESPONSE_BUFFER_LEN: usize = 3072;

const USER_AGENT: &str = concat!("skycast/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Header {
    pub name: String<MAX_HEADER_NAME_LEN>,
    pub value: String<MAX_HEADER_VALUE_LEN>,
}

impl Header {
    pub fn new(name: &str, value: &str) -> Result<Self, Error> {
        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::BufferFull)?,
            value: String::try_from(value).map_err(|_| Error::BufferFull)?,
        })
    }
}

/// A bodiless GET request.
#[derive(Debug)]
pub struct Request<'a> {
    pub path: &'a str,
    pub headers: Vec<Header, MAX_HEADERS>,
}

impl<'a> Request<'a> {
    pub fn get(path: &'a str) -> Self {
        Self {
            path,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        self.headers
            .push(Header::new(name, value)?)
            .map_err(|_| Error::BufferFull)?;
        Ok(self)
    }
}

#[derive(Debug)]
pub struct Response {
    pub status_code: u16,
    pub headers: Vec<Header, MAX_HEADERS>,
    pub body: Vec<u8, RESPONSE_BUFFER_LEN>,
}

impl Response {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn body_str(&self) -> Result<&str, Error> {
        core::str::from_utf8(&self.body).map_err(|_| Error::ProtocolError)
    }
}

/// How the end of the body is signalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    ContentLength(usize),
    Chunked,
    UntilClose,
}

#[derive(Debug)]
pub struct Client<C: Connection> {
    connection: C,
}

impl<C> Client<C>
where
    C: Connection,
    <C as Read>::Error: Into<Error>,
    <C as Write>::Error: Into<Error>,
{
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Send `request` and read the whole response.
    ///
    /// The response (head and body) must fit in [`RESPONSE_BUFFER_LEN`]
    /// bytes, otherwise [`Error::BufferFull`] is returned. Chunked bodies are
    /// decoded before they are returned.
    pub fn request(&mut self, request: &Request) -> Result<Response, Error> {
        self.exchange(request, |_| Ok(()))
    }

    /// Like [`Client::request`], but the whole exchange must finish before a
    /// deadline.
    ///
    /// `remaining_ms` reports the milliseconds left until the deadline, or
    /// `None` once it has passed. It is consulted before every write and read
    /// and the connection timeout is narrowed to what is left, so a server
    /// trickling its response cannot stretch the exchange. Running out of
    /// time fails with [`Error::Timeout`].
    pub fn request_within<D>(&mut self, request: &Request, mut remaining_ms: D) -> Result<Response, Error>
    where
        C: Timeout,
        D: FnMut() -> Option<u32>,
    {
        self.exchange(request, |connection: &mut C| {
            let Some(ms) = remaining_ms().filter(|&ms| ms > 0) else {
                warn!("HTTP exchange ran out of time");
                return Err(Error::Timeout);
            };
            connection.set_timeout(ms).map_err(|e| {
                error!("cannot apply timeout: {:?}", Dbg(&e));
                Error::SocketError
            })
        })
    }

    /// `budget` runs before every write and read, and once more when the
    /// response is complete.
    fn exchange<B>(&mut self, request: &Request, mut budget: B) -> Result<Response, Error>
    where
        B: FnMut(&mut C) -> Result<(), Error>,
    {
        let request_buf = encode_request(request)?;

        let mut written = 0;
        while written < request_buf.len() {
            budget(&mut self.connection)?;
            match self.connection.write(&request_buf[written..]).map_err(Into::<Error>::into)? {
                0 => return Err(Error::WriteError),
                n => written += n,
            }
        }
        self.connection.flush().map_err(Into::<Error>::into)?;

        let mut response_buf = [0u8; RESPONSE_BUFFER_LEN];
        let mut total_read = 0;
        let mut head: Option<(usize, Framing)> = None;

        loop {
            if total_read == response_buf.len() {
                // An until-close body may end exactly at the buffer boundary.
                if matches!(head, Some((_, Framing::UntilClose))) {
                    budget(&mut self.connection)?;
                    let mut scratch = [0u8; 1];
                    if self.connection.read(&mut scratch).map_err(Into::<Error>::into)? == 0 {
                        break;
                    }
                }
                error!("response exceeds {} byte buffer", RESPONSE_BUFFER_LEN);
                return Err(Error::BufferFull);
            }

            budget(&mut self.connection)?;
            let n = self
                .connection
                .read(&mut response_buf[total_read..])
                .map_err(Into::<Error>::into)?;
            if n == 0 {
                if total_read == 0 {
                    return Err(Error::ConnectionClosed);
                }
                break;
            }
            total_read += n;
            debug!("partial data received ({} bytes)", n);

            if head.is_none() {
                if let Some(pos) = find_slice(&response_buf[..total_read], b"\r\n\r\n") {
                    let (_, headers) = parse_head(&response_buf[..pos])?;
                    head = Some((pos + 4, framing(&headers)));
                }
            }

            if let Some((body_start, framing)) = head {
                let body = &response_buf[body_start..total_read];
                let complete = match framing {
                    Framing::ContentLength(len) => body.len() >= len,
                    Framing::Chunked => walk_chunks(body, |_| Ok(()))?.is_some(),
                    Framing::UntilClose => false,
                };
                if complete {
                    break;
                }
            }
        }
        budget(&mut self.connection)?;
        info!("all data received ({} bytes)", total_read);

        let response_data = &response_buf[..total_read];
        let header_end_pos = find_slice(response_data, b"\r\n\r\n").ok_or(Error::ProtocolError)?;
        let (status_code, headers) = parse_head(&response_data[..header_end_pos])?;
        let body_data = &response_data[header_end_pos + 4..];

        let mut body: Vec<u8, RESPONSE_BUFFER_LEN> = Vec::new();
        match framing(&headers) {
            Framing::ContentLength(len) => {
                if body_data.len() < len {
                    return Err(Error::ConnectionClosed);
                }
                body.extend_from_slice(&body_data[..len])
                    .map_err(|_| Error::BufferFull)?;
            }
            Framing::Chunked => {
                let end = walk_chunks(body_data, |chunk| {
                    body.extend_from_slice(chunk).map_err(|_| Error::BufferFull)
                })?;
                if end.is_none() {
                    return Err(Error::ConnectionClosed);
                }
            }
            Framing::UntilClose => {
                body.extend_from_slice(body_data)
                    .map_err(|_| Error::BufferFull)?;
            }
        }

        Ok(Response {
            status_code,
            headers,
            body,
        })
    }

    /// Get a mutable reference to the underlying connection
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Give the connection back, e.g. to close it.
    pub fn into_inner(self) -> C {
        self.connection
    }
}

fn encode_request(request: &Request) -> Result<Vec<u8, REQUEST_BUFFER_LEN>, Error> {
    let mut buf: Vec<u8, REQUEST_BUFFER_LEN> = Vec::new();
    let mut push = |bytes: &[u8]| buf.extend_from_slice(bytes).map_err(|_| Error::BufferFull);

    // Request line
    push(b"GET ")?;
    push(request.path.as_bytes())?;
    push(b" HTTP/1.1\r\n")?;

    // Headers
    let mut has_user_agent = false;
    for header in &request.headers {
        if header.name.eq_ignore_ascii_case("User-Agent") {
            has_user_agent = true;
        }
        push(header.name.as_bytes())?;
        push(b": ")?;
        push(header.value.as_bytes())?;
        push(b"\r\n")?;
    }

    if !has_user_agent {
        push(b"User-Agent: ")?;
        push(USER_AGENT.as_bytes())?;
        push(b"\r\n")?;
    }
    push(b"\r\n")?;

    Ok(buf)
}

/// Parse the status line and headers (everything before the blank line).
fn parse_head(head: &[u8]) -> Result<(u16, Vec<Header, MAX_HEADERS>), Error> {
    let header_str = core::str::from_utf8(head).map_err(|_| Error::ProtocolError)?;
    let mut lines = header_str.lines();

    // Parse status line
    let status_line = lines.next().ok_or(Error::ProtocolError)?;
    let mut status_parts = status_line.splitn(3, ' ');
    let version = status_parts.next().ok_or(Error::ProtocolError)?;
    if !version.starts_with("HTTP/") {
        return Err(Error::ProtocolError);
    }
    let status_code = status_parts
        .next()
        .ok_or(Error::ProtocolError)?
        .parse::<u16>()
        .map_err(|_| Error::ProtocolError)?;

    let mut headers: Vec<Header, MAX_HEADERS> = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once(':').ok_or(Error::ProtocolError)?;
        let (name, value) = (name.trim(), value.trim());

        // Headers we cannot store are dropped; only framing headers matter here.
        let Ok(header) = Header::new(name, value) else {
            trace!("dropping oversized header {}", name);
            continue;
        };
        if headers.push(header).is_err() {
            trace!("dropping header {}", name);
        }
    }

    Ok((status_code, headers))
}

fn framing(headers: &[Header]) -> Framing {
    let lookup = |name: &str| {
        headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    };

    if lookup("Transfer-Encoding").is_some_and(|v| v.eq_ignore_ascii_case("chunked")) {
        return Framing::Chunked;
    }
    match lookup("Content-Length").and_then(|v| v.parse::<usize>().ok()) {
        Some(len) => Framing::ContentLength(len),
        None => Framing::UntilClose,
    }
}

/// Walk a chunked body, feeding each chunk's payload to `sink`.
///
/// Returns the offset just past the terminating chunk (and trailers), or
/// `None` if `data` ends before the terminating chunk.
fn walk_chunks<F>(data: &[u8], mut sink: F) -> Result<Option<usize>, Error>
where
    F: FnMut(&[u8]) -> Result<(), Error>,
{
    let mut pos = 0;
    loop {
        let Some(line_len) = find_slice(&data[pos..], b"\r\n") else {
            return Ok(None);
        };
        let line = core::str::from_utf8(&data[pos..pos + line_len]).map_err(|_| Error::ProtocolError)?;
        let size_str = line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_str, 16).map_err(|_| Error::ProtocolError)?;
        let start = pos + line_len + 2;

        if size == 0 {
            // Skip trailer lines up to the blank line.
            let mut trailer = start;
            loop {
                match find_slice(&data[trailer..], b"\r\n") {
                    Some(0) => return Ok(Some(trailer + 2)),
                    Some(n) => trailer += n + 2,
                    None => return Ok(None),
                }
            }
        }

        // The size comes from the peer; anything past usize is bogus.
        let end = start.checked_add(size).ok_or(Error::ProtocolError)?;
        let next = end.checked_add(2).ok_or(Error::ProtocolError)?;
        if data.len() < next {
            return Ok(None);
        }
        if &data[end..next] != b"\r\n" {
            return Err(Error::ProtocolError);
        }
        sink(&data[start..end])?;
        pos = next;
    }
}

/// Finds the first occurrence of a slice in another slice and returns its starting position.
fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
