use crate::error::{QuickFuzzError, QuickFuzzResult};
use crate::traits::{Connection, Transport};
use std::time::Duration;
use tokio::time::sleep;

/// Default number of connections opened by [`ConnectionManager::is_blocking`]
pub const DEFAULT_PROBE_CONNECTIONS: usize = 5;

/// Delay between two probe connections
const PROBE_STAGGER: Duration = Duration::from_millis(100);

/// Opens connections to the target. A refused connection is retried after `connect_timeout`
/// until `max_retries` is reached, so a dead target costs every worker at most
/// `max_retries + 1` attempts.
pub struct ConnectionManager<T: Transport> {
    transport: T,
    connect_timeout: Duration,
    max_retries: usize,
}

impl<T: Transport> ConnectionManager<T> {
    /// Creates a new connection manager for the given transport
    pub fn new(transport: T, connect_timeout: Duration, max_retries: usize) -> Self {
        Self {
            transport,
            connect_timeout,
            max_retries,
        }
    }

    /// The wrapped transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Establishes a new connection, retrying refused attempts.
    /// # Errors
    /// `QuickFuzzError::RetriesExhausted` if the target refused `max_retries + 1` times in a row,
    /// every other transport error is returned as is.
    pub async fn connect(&self) -> QuickFuzzResult<T::Conn> {
        let mut retry_count = 0;
        loop {
            match self.transport.open().await {
                Ok(conn) => return Ok(conn),
                Err(err) if err.is_connection_refused() => {
                    tracing::warn!("Connection refused by {}.", self.transport.title());
                    if retry_count == self.max_retries {
                        tracing::error!(
                            "Maximum number of retries reached. Stopping current worker..."
                        );
                        return Err(QuickFuzzError::RetriesExhausted {
                            target: self.transport.title(),
                            retries: self.max_retries,
                        });
                    }
                    retry_count += 1;
                    sleep(self.connect_timeout).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Single connection attempt which returns `None` instead of retrying when the target
    /// refuses the connection.
    /// # Errors
    /// Transport errors other than a refused connection.
    pub async fn connect_probe(&self) -> QuickFuzzResult<Option<T::Conn>> {
        match self.transport.open().await {
            Ok(conn) => Ok(Some(conn)),
            Err(err) if err.is_connection_refused() => {
                tracing::warn!("Connection refused by {}.", self.transport.title());
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Checks whether a single connection blocks the targeted port. Opens `sock_num` connections
    /// at the same time and returns how many of them were accepted.
    ///
    /// This is only advisory: a result of 1 means the target probably serves one client at a
    /// time and fuzzing with more than one thread will mostly produce refused connections.
    /// # Errors
    /// Transport errors other than a refused connection.
    pub async fn is_blocking(&self, sock_num: usize) -> QuickFuzzResult<usize> {
        let mut connections = Vec::with_capacity(sock_num);
        for _ in 0..sock_num {
            if let Some(conn) = self.connect_probe().await? {
                connections.push(conn);
            }
            sleep(PROBE_STAGGER).await;
        }

        let accepted = connections.len();
        tracing::debug!("{accepted} of {sock_num} probe connections accepted");

        for mut conn in connections {
            if let Err(err) = conn.close().await {
                tracing::debug!("[CLOSING] {err}");
            }
        }
        Ok(accepted)
    }
}
