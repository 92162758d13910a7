//! Collection of common implementations for `quickfuzz_core`
//!
//! `quickfuzz_common` is a collection of ready to use implementations of the `Transport` trait
//! of [quickfuzz_core](https://github.com/qtc-de/quickfuzz/).

//! Currently there are the following implementations:

//! - `TcpTransport`: Connects to a TCP server and sends the payloads over plain TCP.
//! - `TlsTransport`: Wraps the TCP connection into TLS. The server certificate is not verified,
//!   a client certificate can be presented.
//! - `TargetTransport`: Either of the two, selected by the `tls` flag of the `TargetConfig`.
//!
//!
#![deny(missing_docs)]
#![deny(unsafe_code, clippy::unwrap_used)]
#![warn(clippy::pedantic)]

/// A collection of differed `Transport` implementations
pub mod transport;
