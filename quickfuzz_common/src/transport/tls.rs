use crate::transport::tcp::TcpTransport;
use quickfuzz_core::error::{QuickFuzzError, QuickFuzzResult};
use quickfuzz_core::fuzz::config::TargetConfig;
use quickfuzz_core::traits::{Connection, Transport};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::crypto::{CryptoProvider, ring};
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use tokio_rustls::rustls::{self, ClientConfig, DigitallySignedStruct, SignatureScheme};

fn tls_error(err: impl std::fmt::Display) -> QuickFuzzError {
    QuickFuzzError::Tls {
        err_msg: err.to_string(),
    }
}

/// Accepts every server certificate. The targets are test services with self signed or
/// otherwise broken certificates, there is nothing to trust.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

/// Loads the client certificate chain from `cert` and the private key from `key`, or from
/// `cert` as well if no key file is given.
fn load_client_cert(
    cert: &Path,
    key: Option<&Path>,
) -> QuickFuzzResult<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>)> {
    let mut reader = BufReader::new(File::open(cert)?);
    let certs = rustls_pemfile::certs(&mut reader).collect::<Result<Vec<_>, _>>()?;
    if certs.is_empty() {
        return Err(tls_error(format!(
            "no certificate found in {}",
            cert.display()
        )));
    }

    let key_path = key.unwrap_or(cert);
    let mut reader = BufReader::new(File::open(key_path)?);
    let Some(private_key) = rustls_pemfile::private_key(&mut reader)? else {
        return Err(tls_error(format!(
            "no private key found in {}",
            key_path.display()
        )));
    };
    Ok((certs, private_key))
}

fn client_config(target: &TargetConfig) -> QuickFuzzResult<ClientConfig> {
    let provider = Arc::new(ring::default_provider());
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(tls_error)?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)));

    match &target.tls_cert {
        Some(cert) => {
            let (certs, key) = load_client_cert(cert, target.tls_key.as_deref())?;
            tracing::debug!("Using client certificate {}", cert.display());
            builder
                .with_client_auth_cert(certs, key)
                .map_err(tls_error)
        }
        None => Ok(builder.with_no_client_auth()),
    }
}

/// TLS over TCP. The server certificate and host name are never verified.
#[derive(Clone)]
pub struct TlsTransport {
    host: String,
    port: u16,
    server_name: ServerName<'static>,
    connector: TlsConnector,
}

impl TlsTransport {
    /// Builds the TLS client config, including the optional client certificate.
    /// # Errors
    /// `QuickFuzzError::Tls` if the client certificate can not be loaded or the host is neither
    /// an IP address nor a valid DNS name.
    pub fn new(target: &TargetConfig) -> QuickFuzzResult<Self> {
        let config = client_config(target)?;
        let server_name = ServerName::try_from(target.host.clone()).map_err(tls_error)?;
        Ok(Self {
            host: target.host.clone(),
            port: target.port,
            server_name,
            connector: TlsConnector::from(Arc::new(config)),
        })
    }
}

impl Transport for TlsTransport {
    type Conn = TlsConnection;

    fn title(&self) -> String {
        format!("tls_client ({}:{})", self.host, self.port)
    }

    async fn open(&self) -> Result<TlsConnection, QuickFuzzError> {
        let stream = TcpTransport::connect_stream(&self.host, self.port).await?;
        let stream = self
            .connector
            .connect(self.server_name.clone(), stream)
            .await
            .map_err(tls_error)?;
        Ok(TlsConnection { stream })
    }
}

/// An established TLS session
pub struct TlsConnection {
    stream: TlsStream<TcpStream>,
}

impl Connection for TlsConnection {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, QuickFuzzError> {
        match self.stream.read(buf).await {
            Ok(size) => Ok(size),
            // peer closed without close_notify
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&mut self, buf: &[u8]) -> Result<(), QuickFuzzError> {
        self.stream.write_all(buf).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), QuickFuzzError> {
        let _ = self.stream.shutdown().await;
        Ok(())
    }
}
