use crate::connection::ConnectionManager;
use crate::corpus::load_payload_dir;
use crate::error::{QuickFuzzError, QuickFuzzResult};
use crate::fuzz::config::FuzzerConfig;
use crate::fuzz::stats::Stats;
use crate::parameters::ParameterTable;
use crate::payload::Payload;
use crate::report::{OutputSink, Reporter};
use crate::traits::{Connection, Transport};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Reason stored for a payload whose worker task panicked
pub const REASON_ABORTED: &str = "Worker aborted.";

/// The fuzzer sends every payload over its own connection to the target and records the
/// outcome inside of the payload. Up to `threads` payloads are in flight at the same time.
pub struct Fuzzer<T: Transport> {
    config: FuzzerConfig,
    connection: Arc<ConnectionManager<T>>,
    parameters: ParameterTable,
    payloads: Vec<Payload>,
    reporter: Reporter,
}

/// Everything a worker needs to process one payload. Shared read-only between all workers of a
/// run.
struct Worker<T: Transport> {
    connection: Arc<ConnectionManager<T>>,
    parameters: ParameterTable,
    server_timeout: Duration,
    verbose: bool,
    reporter: Reporter,
}

impl<T: Transport> Worker<T> {
    /// Takes a payload and sends it to the targeted host. Every failure ends up in the payload,
    /// a worker never fails the run.
    async fn fuzz(&self, mut payload: Payload) -> Payload {
        let mut conn = match self.connection.connect().await {
            Ok(conn) => conn,
            Err(err) => {
                payload.fail(err.to_string());
                if self.verbose {
                    self.reporter.print_summary(&payload);
                }
                return payload;
            }
        };

        payload.prepare(&self.parameters);

        if let Err(err) = payload.send(&mut conn, self.server_timeout).await {
            tracing::warn!("[SENDING] {err}");
            payload.fail(err.to_string());
        }

        if self.verbose {
            self.reporter.print_summary(&payload);
        }

        if let Err(err) = conn.close().await {
            tracing::debug!("[CLOSING] {err}");
        }
        payload
    }
}

impl<T: Transport> Fuzzer<T> {
    /// Creates a new fuzzer without payloads. The live output goes to stdout.
    pub fn new(transport: T, config: FuzzerConfig) -> Self {
        let connection = ConnectionManager::new(
            transport,
            config.connect_timeout,
            config.max_retries,
        );
        let reporter = Reporter::new(config.colors, config.no_failed);
        Self {
            config,
            connection: Arc::new(connection),
            parameters: ParameterTable::new(),
            payloads: Vec::new(),
            reporter,
        }
    }

    /// Redirects the payload summaries to the given sink
    #[must_use]
    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.reporter = self.reporter.with_sink(sink);
        self
    }

    /// The config of this fuzzer
    pub fn config(&self) -> &FuzzerConfig {
        &self.config
    }

    /// The payloads of this fuzzer, in the order they were added
    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    /// The parameters which are substituted in every payload
    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    /// Adds a payload. Returns the number of payloads.
    pub fn add_payload(&mut self, payload: Payload) -> usize {
        self.payloads.push(payload);
        self.payloads.len()
    }

    /// Adds several payloads. Returns the number of payloads.
    pub fn add_payloads(&mut self, payloads: impl IntoIterator<Item = Payload>) -> usize {
        self.payloads.extend(payloads);
        self.payloads.len()
    }

    /// Loads every payload of `payload_dir`, see [`load_payload_dir`]. A folder that can not be
    /// read is reported and otherwise ignored. Returns the number of payloads.
    pub fn load_payloads(&mut self, payload_dir: &Path) -> usize {
        match load_payload_dir(payload_dir) {
            Ok(payloads) => {
                tracing::debug!(
                    "Loaded {} payloads from {}",
                    payloads.len(),
                    payload_dir.display()
                );
                self.payloads.extend(payloads);
            }
            Err(QuickFuzzError::IoError { err }) if err.kind() == ErrorKind::NotFound => {
                tracing::error!("Payload folder '{}' not found!", payload_dir.display());
            }
            Err(err) => {
                tracing::error!(
                    "Could not load payloads from '{}': {err}",
                    payload_dir.display()
                );
            }
        }
        self.payloads.len()
    }

    /// Adds a parameter that is replaced in every payload. Returns the number of parameters.
    pub fn add_parameter(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> usize {
        self.parameters.insert(key, value)
    }

    /// Checks how many simultaneous connections the target accepts, see
    /// [`ConnectionManager::is_blocking`].
    /// # Errors
    /// Any connection error other than a refusal.
    pub async fn is_blocking(&self, sock_num: usize) -> QuickFuzzResult<usize> {
        self.connection.is_blocking(sock_num).await
    }

    /// Sends every payload to the target. The payloads keep their order, the outcome of each one
    /// is stored inside of it.
    pub async fn start_fuzzing(&mut self) -> Stats {
        let started = Instant::now();
        let mut stats = Stats::new(self.connection.transport().title());

        tracing::info!(
            "Sending {} payloads to {} using {} threads.",
            self.payloads.len(),
            self.connection.transport().title(),
            self.config.threads
        );

        let worker = Arc::new(Worker {
            connection: self.connection.clone(),
            parameters: self.parameters.clone(),
            server_timeout: self.config.server_timeout,
            verbose: self.config.verbose,
            reporter: self.reporter.clone(),
        });
        let permits = self.config.threads.clamp(1, Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));

        let payloads = std::mem::take(&mut self.payloads);
        let mut tasks = Vec::with_capacity(payloads.len());

        for payload in payloads {
            let original = payload.data().to_vec();
            let worker = worker.clone();
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                // the semaphore is never closed
                break;
            };
            let task = tokio::spawn(async move {
                let payload = worker.fuzz(payload).await;
                drop(permit);
                payload
            });
            tasks.push((original, task));
        }

        for (original, task) in tasks {
            let payload = match task.await {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::error!("{REASON_ABORTED} {err}");
                    let mut payload = Payload::new(original);
                    payload.fail(REASON_ABORTED);
                    payload
                }
            };
            stats.record(&payload);
            self.payloads.push(payload);
        }

        stats.elapsed = started.elapsed();
        tracing::info!("{stats}");
        stats
    }

    /// Summary of all payloads as text. If printed, this is the same output as in verbose mode.
    pub fn get_results(&self) -> String {
        self.reporter.results(&self.payloads)
    }

    /// Summary of all payloads as JSON, see [`Reporter::results_json`].
    /// # Errors
    /// Serialization failures.
    pub fn get_results_json(&self) -> QuickFuzzResult<String> {
        self.reporter.results_json(&self.payloads)
    }
}
