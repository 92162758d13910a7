use crate::encoding::Decoded;
use crate::error::QuickFuzzResult;
use crate::parameters::ParameterTable;
use crate::traits::Connection;
use serde::Serialize;
use std::time::Duration;

/// Maximum number of bytes captured as response for a single payload
pub const READ_CHUNK_SIZE: usize = 1024;

/// Reason stored when the target did not answer in time
pub const REASON_TIMEOUT: &str = "Server Timeout.";

/// Reason stored when the target reset the connection while we were waiting for a response
pub const REASON_RESET: &str = "Connection reset by server.";

/// A single payload and, after it was sent, the outcome.
///
/// Either `success` is set together with `result`, or `reason` explains why no response was
/// captured. A payload that was never sent has both strings empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    data: Vec<u8>,
    success: bool,
    result: String,
    reason: String,
}

/// One entry of the structured result document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadRecord {
    /// A response was captured
    pub success: bool,
    /// Failure reason, empty if successful
    pub reason: String,
    /// The data that was sent, as text or hex escaped
    pub data: String,
    /// The captured response, empty if failed
    pub result: String,
}

impl Payload {
    /// Creates a payload that was not sent yet
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    /// The raw bytes of the payload (after `prepare`, including the substitutions)
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True if a response was captured
    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    /// The captured response, empty if none was captured
    #[must_use]
    pub fn result(&self) -> &str {
        &self.result
    }

    /// The failure reason, empty if the payload was successful or not sent yet
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Replaces the parameters inside of the payload data. Returns the number of parameters.
    pub fn prepare(&mut self, parameters: &ParameterTable) -> usize {
        if !parameters.is_empty() {
            self.data = parameters.apply(&self.data);
        }
        parameters.len()
    }

    /// Sends the payload over `conn` and waits up to `timeout` for a single response chunk.
    ///
    /// A timeout or a reset by the peer are stored as reason and are not errors.
    /// # Errors
    /// Any other transport failure while writing or reading.
    pub async fn send<C: Connection>(
        &mut self,
        conn: &mut C,
        timeout: Duration,
    ) -> QuickFuzzResult<()> {
        self.reset();
        conn.write(&self.data).await?;

        let mut buf = [0u8; READ_CHUNK_SIZE];
        match tokio::time::timeout(timeout, conn.read(&mut buf)).await {
            Ok(Ok(size)) => {
                let response = Decoded::from_bytes(&buf[..size]);
                self.result = response.as_str().trim().to_owned();
                self.success = true;
            }
            Ok(Err(err)) if err.is_connection_reset() => {
                self.reason = REASON_RESET.to_owned();
            }
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                self.reason = REASON_TIMEOUT.to_owned();
            }
        }
        Ok(())
    }

    /// Forgets the outcome of an earlier send
    fn reset(&mut self) {
        self.success = false;
        self.result.clear();
        self.reason.clear();
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.success = false;
        self.result.clear();
        self.reason = reason.into();
    }

    #[cfg(test)]
    pub(crate) fn mark_success(&mut self, result: &str) {
        self.success = true;
        self.reason.clear();
        self.result = result.to_owned();
    }

    /// The payload data as text, or hex escaped if it is not valid UTF-8
    #[must_use]
    pub fn decoded_data(&self) -> Decoded {
        Decoded::from_bytes(&self.data)
    }

    /// Converts the payload into a serializable record
    #[must_use]
    pub fn to_record(&self) -> PayloadRecord {
        PayloadRecord {
            success: self.success,
            reason: self.reason.clone(),
            data: self.decoded_data().into_string(),
            result: self.result.clone(),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Payload::new(data)
    }
}

impl From<&[u8]> for Payload {
    fn from(data: &[u8]) -> Self {
        Payload::new(data)
    }
}
