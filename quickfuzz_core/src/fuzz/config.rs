use crate::colored::ColorScheme;
use crate::error::{QuickFuzzError, QuickFuzzResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Where to connect to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Host name or IP address of the target
    pub host: String,
    /// Port of the target
    pub port: u16,
    /// Wrap the connection into TLS. The server certificate is never verified.
    pub tls: bool,
    /// PEM file with the client certificate (may also contain the key)
    pub tls_cert: Option<PathBuf>,
    /// PEM file with the private key of the client certificate
    pub tls_key: Option<PathBuf>,
}

impl TargetConfig {
    /// Plain TCP target
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            tls: false,
            tls_cert: None,
            tls_key: None,
        }
    }

    /// Enables TLS for the target
    #[must_use]
    pub fn with_tls(mut self) -> Self {
        self.tls = true;
        self
    }

    /// Checks the TLS client certificate options.
    /// # Errors
    /// `QuickFuzzError::Config` if a key is given without a certificate or one of the files does
    /// not exist.
    pub fn validate(&self) -> QuickFuzzResult<()> {
        match (&self.tls_cert, &self.tls_key) {
            (None, Some(_)) => Err(QuickFuzzError::Config {
                err_msg: "Key parameter needs a certificate file!".into(),
            }),
            (Some(cert), key) => {
                if !cert.is_file() || key.as_ref().is_some_and(|key| !key.is_file()) {
                    return Err(QuickFuzzError::Config {
                        err_msg: "Certificate or key file not found!".into(),
                    });
                }
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }
}

impl Display for TargetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scheme = if self.tls { "tls" } else { "tcp" };
        write!(f, "{scheme}://{}:{}", self.host, self.port)
    }
}

/// Settings of a fuzzer run. They are not changed while the run is in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzerConfig {
    /// The target
    pub target: TargetConfig,
    /// Time to wait before reconnecting after the target refused a connection
    pub connect_timeout: Duration,
    /// Number of reconnects per payload
    pub max_retries: usize,
    /// Time to wait for a server response
    pub server_timeout: Duration,
    /// Number of payloads in flight at the same time
    pub threads: usize,
    /// Print the summary of every payload as soon as it finished
    pub verbose: bool,
    /// Leave out payloads without response in the results
    pub no_failed: bool,
    /// Output colors
    pub colors: ColorScheme,
}

impl FuzzerConfig {
    /// Config with the default settings for the given target
    #[must_use]
    pub fn new(target: TargetConfig) -> Self {
        Self {
            target,
            connect_timeout: Duration::from_secs(2),
            max_retries: 2,
            server_timeout: Duration::from_secs(2),
            threads: 5,
            verbose: false,
            no_failed: false,
            colors: ColorScheme::default(),
        }
    }

    /// Validates the config.
    /// # Errors
    /// `QuickFuzzError::Config` for zero or too many threads or invalid TLS options.
    pub fn validate(&self) -> QuickFuzzResult<()> {
        if self.threads == 0 {
            return Err(QuickFuzzError::Config {
                err_msg: "At least one thread is required.".into(),
            });
        }
        if self.threads > Semaphore::MAX_PERMITS {
            return Err(QuickFuzzError::Config {
                err_msg: format!("At most {} threads are supported.", Semaphore::MAX_PERMITS),
            });
        }
        self.target.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FuzzerConfig::new(TargetConfig::new("127.0.0.1", 8000));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.threads, 5);
        assert!(config.validate().is_ok());
        assert_eq!(config.target.to_string(), "tcp://127.0.0.1:8000");
    }

    #[test]
    fn zero_threads_rejected() {
        let mut config = FuzzerConfig::new(TargetConfig::new("127.0.0.1", 8000));
        config.threads = 0;
        assert!(matches!(
            config.validate(),
            Err(QuickFuzzError::Config { .. })
        ));
    }

    #[test]
    fn too_many_threads_rejected() {
        let mut config = FuzzerConfig::new(TargetConfig::new("127.0.0.1", 8000));
        config.threads = Semaphore::MAX_PERMITS;
        assert!(config.validate().is_ok());
        config.threads = usize::MAX;
        assert!(matches!(
            config.validate(),
            Err(QuickFuzzError::Config { .. })
        ));
    }

    #[test]
    fn key_requires_certificate() {
        let mut target = TargetConfig::new("127.0.0.1", 443).with_tls();
        target.tls_key = Some("client.key".into());
        assert!(matches!(
            target.validate(),
            Err(QuickFuzzError::Config { .. })
        ));
    }

    #[test]
    fn certificate_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cert = dir.path().join("client.pem");

        let mut target = TargetConfig::new("127.0.0.1", 443).with_tls();
        target.tls_cert = Some(cert.clone());
        assert!(target.validate().is_err());

        std::fs::write(&cert, "pem").expect("write");
        assert!(target.validate().is_ok());

        target.tls_key = Some(dir.path().join("missing.key"));
        assert!(target.validate().is_err());
    }
}
