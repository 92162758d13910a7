//! In-memory transport used by the unit tests of this crate.

use crate::error::QuickFuzzError;
use crate::traits::{Connection, Transport};
use std::io::ErrorKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Debug)]
pub(crate) enum MockResponse {
    /// Always answers with the given bytes
    Reply(Vec<u8>),
    /// Answers with whatever was written
    Echo,
    /// Answers only if the written data equals the trigger, otherwise stays silent
    ReplyTo { trigger: Vec<u8>, reply: Vec<u8> },
    /// Never answers
    Silent,
    /// Resets the connection after the write
    Reset,
    /// Closes the connection without data
    Close,
}

#[derive(Default)]
struct Gauge {
    active: AtomicUsize,
    peak: AtomicUsize,
}

pub(crate) struct MockTransport {
    response: MockResponse,
    refusals: AtomicUsize,
    attempts: AtomicUsize,
    accept_limit: Option<usize>,
    fail_close: bool,
    gauge: Arc<Gauge>,
}

impl MockTransport {
    pub(crate) fn new(response: MockResponse) -> Self {
        Self {
            response,
            refusals: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
            accept_limit: None,
            fail_close: false,
            gauge: Arc::default(),
        }
    }

    /// Refuses the next `n` connection attempts
    pub(crate) fn refuse_first(self, n: usize) -> Self {
        self.refusals.store(n, Ordering::SeqCst);
        self
    }

    /// Refuses connections while `limit` connections are open
    pub(crate) fn accept_limit(mut self, limit: usize) -> Self {
        self.accept_limit = Some(limit);
        self
    }

    /// Connections report an error when they are closed
    pub(crate) fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Highest number of connections that were open at the same time
    pub(crate) fn peak_connections(&self) -> usize {
        self.gauge.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn open_connections(&self) -> usize {
        self.gauge.active.load(Ordering::SeqCst)
    }
}

fn refused() -> QuickFuzzError {
    std::io::Error::from(ErrorKind::ConnectionRefused).into()
}

impl Transport for MockTransport {
    type Conn = MockConnection;

    fn title(&self) -> String {
        "mock".to_owned()
    }

    async fn open(&self) -> Result<MockConnection, QuickFuzzError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self
            .refusals
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(refused());
        }
        if let Some(limit) = self.accept_limit
            && self.gauge.active.load(Ordering::SeqCst) >= limit
        {
            return Err(refused());
        }
        let mut conn = MockConnection::new(self.response.clone());
        conn.fail_close = self.fail_close;
        conn.attach(self.gauge.clone());
        Ok(conn)
    }
}

pub(crate) struct MockConnection {
    response: MockResponse,
    written: Vec<u8>,
    fail_close: bool,
    gauge: Option<Arc<Gauge>>,
}

impl MockConnection {
    pub(crate) fn new(response: MockResponse) -> Self {
        Self {
            response,
            written: Vec::new(),
            fail_close: false,
            gauge: None,
        }
    }

    fn attach(&mut self, gauge: Arc<Gauge>) {
        let active = gauge.active.fetch_add(1, Ordering::SeqCst) + 1;
        gauge.peak.fetch_max(active, Ordering::SeqCst);
        self.gauge = Some(gauge);
    }

    pub(crate) fn written(&self) -> &[u8] {
        &self.written
    }

    fn detach(&mut self) {
        if let Some(gauge) = self.gauge.take() {
            gauge.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn fill(buf: &mut [u8], bytes: &[u8]) -> usize {
        let size = bytes.len().min(buf.len());
        buf[..size].copy_from_slice(&bytes[..size]);
        size
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.detach();
    }
}

impl Connection for MockConnection {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, QuickFuzzError> {
        // yield once so the worker really suspends like on a socket
        tokio::task::yield_now().await;
        match &self.response {
            MockResponse::Reply(bytes) => Ok(Self::fill(buf, bytes)),
            MockResponse::Echo => Ok(Self::fill(buf, &self.written)),
            MockResponse::ReplyTo { trigger, reply } if *trigger == self.written => {
                Ok(Self::fill(buf, reply))
            }
            MockResponse::ReplyTo { .. } | MockResponse::Silent => {
                std::future::pending::<Result<usize, QuickFuzzError>>().await
            }
            MockResponse::Reset => Err(std::io::Error::from(ErrorKind::ConnectionReset).into()),
            MockResponse::Close => Ok(0),
        }
    }

    async fn write(&mut self, buf: &[u8]) -> Result<(), QuickFuzzError> {
        self.written.extend_from_slice(buf);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), QuickFuzzError> {
        self.detach();
        if self.fail_close {
            return Err(std::io::Error::from(ErrorKind::NotConnected).into());
        }
        Ok(())
    }
}

/// Writer collecting everything into a shared buffer
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        let buf = self.0.lock().expect("buffer lock");
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
