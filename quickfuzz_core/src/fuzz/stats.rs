use crate::payload::{Payload, REASON_RESET, REASON_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Outcome counters of a fuzzer run.
pub struct Stats {
    /// The title of the target
    pub title: String,

    /// Number of payloads that were dispatched
    pub total_payloads: usize,

    /// Payloads which received a response
    pub total_successes: usize,

    /// Payloads without response within the server timeout
    pub total_timeouts: usize,

    /// Payloads where the target reset the connection
    pub total_resets: usize,

    /// Payloads whose worker gave up, either because the target kept refusing connections or
    /// the transport failed
    pub total_errors: usize,

    /// Wall time of the run
    pub elapsed: Duration,
}

impl Stats {
    pub(crate) fn new(title: String) -> Self {
        Self {
            title,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, payload: &Payload) {
        self.total_payloads += 1;
        if payload.success() {
            self.total_successes += 1;
        } else if payload.reason() == REASON_TIMEOUT {
            self.total_timeouts += 1;
        } else if payload.reason() == REASON_RESET {
            self.total_resets += 1;
        } else {
            self.total_errors += 1;
        }
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} payloads in {:.2?} ({} responses, {} timeouts, {} resets, {} errors)",
            self.title,
            self.total_payloads,
            self.elapsed,
            self.total_successes,
            self.total_timeouts,
            self.total_resets,
            self.total_errors
        )
    }
}
