//! HTTP/1.1 protocol implementation for embedded systems.
//!
//! A blocking, single-request client over any [`crate::network::Connection`].
//! The whole response is read into a fixed receive buffer
//! ([`client::RESPONSE_BUFFER_LEN`] bytes), so memory use is predictable and
//! responses larger than the buffer are rejected rather than truncated.
//!
//! Bodies framed by `Content-Length`, `Transfer-Encoding: chunked`, or by the
//! server closing the connection are all supported. Only bodiless GET
//! requests are sent. [`Client::request_within`] bounds the whole exchange
//! by a deadline.
//!
//! ```rust,no_run
//! use skycast::network::application::http::{Client, Request};
//! # use skycast::network::Connection;
//! # use skycast::network::error::Error;
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl skycast::network::Read for MockConnection {
//! #     type Error = Error;
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl skycast::network::Write for MockConnection {
//! #     type Error = Error;
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl skycast::network::Close for MockConnection {
//! #     type Error = Error;
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! let mut client = Client::new(MockConnection);
//! let request = Request::get("/v1/forecast?latitude=47.37&longitude=8.54")
//!     .with_header("Host", "api.open-meteo.com")?;
//! let response = client.request(&request)?;
//! # Ok::<(), Error>(())
//! ```

/// HTTP client implementation and supporting types.
pub mod client;

pub use client::{Client, Header, Request, Response, RESPONSE_BUFFER_LEN};
