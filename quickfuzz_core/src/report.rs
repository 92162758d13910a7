//! Renders payload outcomes either as marker prefixed text blocks or as a JSON document.
//!
//! Workers print their summaries while other workers are still running. Every summary is
//! therefore built as one complete string first and then handed to the [`OutputSink`] in a
//! single write, so the lines of one payload are never interleaved with another one.

use crate::colored::{Color, ColorScheme, Colored};
use crate::error::QuickFuzzResult;
use crate::payload::{Payload, PayloadRecord};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Prefixes every line of `text` with the `[+]` marker followed by `indent` levels of four
/// spaces.
#[must_use]
pub fn apply_format(text: &str, indent: usize) -> String {
    let indent = "    ".repeat(indent);
    text.split('\n')
        .map(|line| format!("[+] {indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A writer shared by all workers. Each call to [`OutputSink::write_block`] is atomic.
#[derive(Clone)]
pub struct OutputSink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl OutputSink {
    /// Wraps the given writer
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Sink writing to stdout
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Writes the block in one go and flushes it.
    /// # Errors
    /// If the underlying writer fails or another writer panicked while holding the sink.
    pub fn write_block(&self, block: &str) -> std::io::Result<()> {
        let Ok(mut writer) = self.inner.lock() else {
            return Err(std::io::Error::other("output sink is poisoned"));
        };
        writer.write_all(block.as_bytes())?;
        writer.flush()
    }
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::stdout()
    }
}

/// Formats payload outcomes
#[derive(Clone)]
pub struct Reporter {
    colors: ColorScheme,
    no_failed: bool,
    sink: OutputSink,
}

impl Reporter {
    /// Creates a reporter printing to stdout
    #[must_use]
    pub fn new(colors: ColorScheme, no_failed: bool) -> Self {
        Self {
            colors,
            no_failed,
            sink: OutputSink::stdout(),
        }
    }

    /// Replaces the sink used by [`Reporter::print_summary`]
    #[must_use]
    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    fn line(&self, out: &mut String, text: &str, color: Option<Color>) {
        out.push_str(&text.paint(color));
        out.push('\n');
    }

    /// Renders the summary of a single payload: the data that was sent and either the response
    /// or the failure reason. Failed payloads render as an empty string if failures are
    /// suppressed.
    #[must_use]
    pub fn summary(&self, payload: &Payload) -> String {
        let mut out = String::new();
        if !payload.success() && self.no_failed {
            return out;
        }

        let data = payload.decoded_data();
        let data = if data.is_text() {
            data.as_str().trim()
        } else {
            data.as_str()
        };

        self.line(&mut out, "[+] Payload:", self.colors.info);
        self.line(&mut out, &apply_format(data, 1), self.colors.payload);

        if payload.success() {
            self.line(&mut out, "[+] Response:", self.colors.info);
            self.line(
                &mut out,
                &apply_format(payload.result(), 1),
                self.colors.success,
            );
        } else {
            let failed = format!("[-] Failed: {}", payload.reason());
            self.line(&mut out, &failed, self.colors.error);
        }
        out
    }

    /// Prints the summary of a single payload as one atomic block
    pub fn print_summary(&self, payload: &Payload) {
        let summary = self.summary(payload);
        if summary.is_empty() {
            return;
        }
        if let Err(err) = self.sink.write_block(&summary) {
            tracing::error!("Could not print payload summary: {err}");
        }
    }

    fn visible<'a>(&self, payloads: &'a [Payload]) -> impl Iterator<Item = &'a Payload> {
        let no_failed = self.no_failed;
        payloads.iter().filter(move |p| !no_failed || p.success())
    }

    /// Concatenated summaries of all payloads. This is the same output as printed live in
    /// verbose mode.
    #[must_use]
    pub fn results(&self, payloads: &[Payload]) -> String {
        self.visible(payloads)
            .map(|payload| self.summary(payload))
            .collect()
    }

    /// The structured records of all payloads
    #[must_use]
    pub fn records(&self, payloads: &[Payload]) -> Vec<PayloadRecord> {
        self.visible(payloads).map(Payload::to_record).collect()
    }

    /// All payloads as a JSON array of `{success, reason, data, result}` objects.
    /// # Errors
    pub fn results_json(&self, payloads: &[Payload]) -> QuickFuzzResult<String> {
        Ok(serde_json::to_string(&self.records(payloads))?)
    }
}
