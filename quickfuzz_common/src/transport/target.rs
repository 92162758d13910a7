use crate::transport::tcp::{TcpConnection, TcpTransport};
use crate::transport::tls::{TlsConnection, TlsTransport};
use quickfuzz_core::error::{QuickFuzzError, QuickFuzzResult};
use quickfuzz_core::fuzz::config::TargetConfig;
use quickfuzz_core::traits::{Connection, Transport};

/// Plain TCP or TLS, depending on the `tls` flag of the target
#[derive(Clone)]
pub enum TargetTransport {
    /// Plain TCP
    Tcp(TcpTransport),
    /// TLS over TCP
    Tls(TlsTransport),
}

impl TargetTransport {
    /// Creates the transport described by `target`.
    /// # Errors
    /// Invalid TLS options, see [`TargetConfig::validate`] and [`TlsTransport::new`].
    pub fn from_config(target: &TargetConfig) -> QuickFuzzResult<Self> {
        target.validate()?;
        if target.tls {
            Ok(TargetTransport::Tls(TlsTransport::new(target)?))
        } else {
            Ok(TargetTransport::Tcp(TcpTransport::new(target)))
        }
    }
}

impl Transport for TargetTransport {
    type Conn = TargetConnection;

    fn title(&self) -> String {
        match self {
            TargetTransport::Tcp(transport) => transport.title(),
            TargetTransport::Tls(transport) => transport.title(),
        }
    }

    async fn open(&self) -> Result<TargetConnection, QuickFuzzError> {
        Ok(match self {
            TargetTransport::Tcp(transport) => TargetConnection::Tcp(transport.open().await?),
            TargetTransport::Tls(transport) => {
                TargetConnection::Tls(Box::new(transport.open().await?))
            }
        })
    }
}

/// Connection returned by [`TargetTransport`]
pub enum TargetConnection {
    /// Plain TCP
    Tcp(TcpConnection),
    /// TLS over TCP
    Tls(Box<TlsConnection>),
}

impl Connection for TargetConnection {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, QuickFuzzError> {
        match self {
            TargetConnection::Tcp(conn) => conn.read(buf).await,
            TargetConnection::Tls(conn) => conn.read(buf).await,
        }
    }

    async fn write(&mut self, buf: &[u8]) -> Result<(), QuickFuzzError> {
        match self {
            TargetConnection::Tcp(conn) => conn.write(buf).await,
            TargetConnection::Tls(conn) => conn.write(buf).await,
        }
    }

    async fn close(&mut self) -> Result<(), QuickFuzzError> {
        match self {
            TargetConnection::Tcp(conn) => conn.close().await,
            TargetConnection::Tls(conn) => conn.close().await,
        }
    }
}
