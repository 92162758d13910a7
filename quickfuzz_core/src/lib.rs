//!
//! `quickfuzz` is a quick service identification tool. It sends a corpus of payloads to a TCP
//! (optionally TLS) port and reports which payloads made the service respond, what it responded,
//! or why no response was captured.
//!
//! Unknown services on uncommon ports often speak a protocol that is easy to recognize once it
//! answers at all. Instead of guessing by hand, `quickfuzz` throws a folder of well known
//! requests (HTTP, SMTP, XML, JSON, binary handshakes, ...) at the port and shows the replies.
//!
//! To use `quickfuzz_core` you have to implement the `Transport` trait, which opens one
//! `Connection` per payload. Ready to use TCP and TLS transports can be found in the
//! `quickfuzz_common` crate.
//!
//! The following code shows the basic setup to fuzz a local service:
//!
//! ```rs
//! #[tokio::main]
//! async fn main() {
//!     let target = TargetConfig::new("127.0.0.1", 8000);
//!     let transport = TcpTransport::new(&target);
//!
//!     let mut fuzzer = Fuzzer::new(transport, FuzzerConfig::new(target));
//!     fuzzer.add_parameter(b"$IP$".to_vec(), b"127.0.0.1".to_vec());
//!     fuzzer.load_payloads(Path::new("payloads"));
//!
//!     fuzzer.start_fuzzing().await;
//!     print!("{}", fuzzer.get_results());
//! }
//! ```
//!

#![deny(missing_docs)]
#![deny(unsafe_code, clippy::unwrap_used)]
#![warn(clippy::pedantic)]

/// Contains the `Transport` and `Connection` traits that have to be implemented to reach a
/// target. There are common implementations in the `quickfuzz_common` crate.
pub mod traits;

/// Contains the fuzzer, its config and the run statistics.
pub mod fuzz;

/// Opens connections to the target with retrying and checks if the target blocks.
pub mod connection;

/// A single payload and its outcome.
pub mod payload;

/// Parameters which are substituted into the payloads.
pub mod parameters;

/// Loads payloads from a folder.
pub mod corpus;

/// Decoding of bytes into text or hex escaped strings.
pub mod encoding;

/// Text and JSON rendering of the payload outcomes.
pub mod report;

/// ANSI colors for the text report.
pub mod colored;

/// Manage the logger. This initializes the `tracing_subscriber`.
pub mod log;

/// Results file of a run.
pub mod output;

/// Contains all the different errors `quickfuzz_core` can return.
pub mod error;

#[cfg(test)]
pub(crate) mod testing;
