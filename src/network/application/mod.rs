//! # Application Layer Network Protocols
//!
//! The two protocols the forecast client speaks:
//!
//! - **[`http`]**: HTTP/1.1 client used to fetch the forecast document
//! - **[`sntp`]**: SNTPv4 packet codec used to set the device clock
//!
//! Both work on top of the transport traits in [`crate::network`] and use
//! fixed-size buffers only.

/// HTTP client implementation.
pub mod http;

/// SNTP (Simple Network Time Protocol) client packet codec.
pub mod sntp;
