/// Implements the `Transport` trait for TCP
pub mod tcp;

/// Implements the `Transport` trait for TLS over TCP
pub mod tls;

/// Picks TCP or TLS from the target config at runtime
pub mod target;
