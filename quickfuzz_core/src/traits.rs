use crate::error::QuickFuzzError;
use std::future::Future;

/// Transport layer to reach the target. A transport is shared between all workers of a run and
/// hands out a fresh [`Connection`] for every payload.
pub trait Transport: Send + Sync + 'static {
    /// The connection type returned by [`Transport::open`]
    type Conn: Connection;

    /// Human readable description of the target, used in log messages
    fn title(&self) -> String;

    /// Performs a single connection attempt to the target. Retrying is handled by the
    /// `ConnectionManager`, so implementations must not retry on their own.
    /// # Errors
    /// A refused connection must be reported as `QuickFuzzError::IoError` with the kind
    /// `ConnectionRefused`.
    fn open(&self) -> impl Future<Output = Result<Self::Conn, QuickFuzzError>> + Send;
}

/// A single connection to the target. It is owned by exactly one worker and used for exactly one
/// payload.
pub trait Connection: Send + 'static {
    /// Read data from the target.
    /// - If no error happen the function must return the lenght that was read from the target.
    /// - If the length is 0 the peer closed the connection.
    /// # Errors
    /// A reset by the peer must be reported as `QuickFuzzError::IoError` with the kind
    /// `ConnectionReset`.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, QuickFuzzError>> + Send;

    /// Write the whole buffer to the target.
    /// # Errors
    fn write(&mut self, buf: &[u8]) -> impl Future<Output = Result<(), QuickFuzzError>> + Send;

    /// Closes the connection
    /// # Errors
    fn close(&mut self) -> impl Future<Output = Result<(), QuickFuzzError>> + Send;
}
