use quickfuzz_core::error::QuickFuzzError;
use quickfuzz_core::fuzz::config::TargetConfig;
use quickfuzz_core::traits::{Connection, Transport};
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Basic TCP Client Transport Layer
#[derive(Clone, Debug)]
pub struct TcpTransport {
    host: String,
    port: u16,
}

impl TcpTransport {
    /// Create a instance of Tcp Transport
    #[must_use]
    pub fn new(target: &TargetConfig) -> Self {
        Self {
            host: target.host.clone(),
            port: target.port,
        }
    }

    /// Opens the plain TCP stream, used by the TLS transport as well
    pub(crate) async fn connect_stream(host: &str, port: u16) -> Result<TcpStream, QuickFuzzError> {
        let stream = TcpStream::connect((host, port)).await?;
        let _ = stream.set_nodelay(true);
        Ok(stream)
    }
}

impl Transport for TcpTransport {
    type Conn = TcpConnection;

    fn title(&self) -> String {
        format!("tcp_client ({}:{})", self.host, self.port)
    }

    async fn open(&self) -> Result<TcpConnection, QuickFuzzError> {
        let stream = Self::connect_stream(&self.host, self.port).await?;
        Ok(TcpConnection { stream })
    }
}

/// A connected TCP stream
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
}

impl Connection for TcpConnection {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, QuickFuzzError> {
        Ok(self.stream.read(buf).await?)
    }

    async fn write(&mut self, buf: &[u8]) -> Result<(), QuickFuzzError> {
        self.stream.write_all(buf).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), QuickFuzzError> {
        let _ = self.stream.flush().await;
        let _ = self.stream.shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickfuzz_core::connection::ConnectionManager;
    use quickfuzz_core::payload::{Payload, REASON_RESET, REASON_TIMEOUT};
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, TcpTransport) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let transport = TcpTransport::new(&TargetConfig::new("127.0.0.1", port));
        (listener, transport)
    }

    #[tokio::test]
    async fn test_helo_response() {
        let (listener, transport) = listener().await;
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut buf = [0u8; 64];
            let size = stream.read(&mut buf).await.expect("read");
            if &buf[..size] == b"helo\n" {
                stream.write_all(b"helo 127.0.0.1\n").await.expect("write");
            }
        });

        let mut conn = transport.open().await.expect("connect");
        let mut payload = Payload::new(b"helo\n".to_vec());
        payload
            .send(&mut conn, Duration::from_secs(2))
            .await
            .expect("send");
        conn.close().await.expect("close");

        assert!(payload.success());
        assert_eq!(payload.result(), "helo 127.0.0.1");
    }

    #[tokio::test]
    async fn test_silent_server() {
        let (listener, transport) = listener().await;
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(3)).await;
            drop(stream);
        });

        let mut conn = transport.open().await.expect("connect");
        let mut payload = Payload::new(b"helo\n".to_vec());
        payload
            .send(&mut conn, Duration::from_secs(1))
            .await
            .expect("send");

        assert!(!payload.success());
        assert_eq!(payload.reason(), REASON_TIMEOUT);
        server.abort();
    }

    #[tokio::test]
    #[allow(deprecated)]
    async fn test_reset_by_server() {
        let (listener, transport) = listener().await;
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut buf = [0u8; 64];
            let _ = stream.read(&mut buf).await;
            // closing with a zero linger sends a RST instead of a FIN
            stream.set_linger(Some(Duration::ZERO)).expect("linger");
            drop(stream);
        });

        let mut conn = transport.open().await.expect("connect");
        let mut payload = Payload::new(b"garbage\n".to_vec());
        payload
            .send(&mut conn, Duration::from_secs(2))
            .await
            .expect("send");

        assert!(!payload.success());
        assert_eq!(payload.reason(), REASON_RESET);
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let (listener, transport) = listener().await;
        drop(listener);

        let err = transport.open().await.err().expect("must be refused");
        assert!(err.is_connection_refused());

        let manager = ConnectionManager::new(transport, Duration::from_millis(10), 1);
        assert!(matches!(
            manager.connect().await.err(),
            Some(QuickFuzzError::RetriesExhausted { retries: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_blocking_probe() {
        let (listener, transport) = listener().await;
        let manager = ConnectionManager::new(transport.clone(), Duration::from_millis(10), 1);
        // the kernel accepts into the backlog even without calling accept
        assert_eq!(manager.is_blocking(3).await.expect("probe"), 3);
        drop(listener);

        let manager = ConnectionManager::new(transport, Duration::from_millis(10), 1);
        assert_eq!(manager.is_blocking(2).await.expect("probe"), 0);
    }
}
