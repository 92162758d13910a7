use clap::Parser;
use quickfuzz_common::transport::target::TargetTransport;
use quickfuzz_core::colored::{ColorScheme, Colored};
use quickfuzz_core::connection::DEFAULT_PROBE_CONNECTIONS;
use quickfuzz_core::error::QuickFuzzResult;
use quickfuzz_core::fuzz::config::{FuzzerConfig, TargetConfig};
use quickfuzz_core::fuzz::engine::Fuzzer;
use quickfuzz_core::log::Logger;
use quickfuzz_core::output::Output;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "quickfuzz", version, about = "quickfuzz - quick service identification")]
struct QuickFuzzCliArgs {
    /// IP address or host name of the target
    ip: String,
    /// Port of the target
    port: u16,
    /// Folder containing the payloads [default: ~/.local/share/quickfuzz/payloads]
    #[arg(long, short)]
    payloads: Option<PathBuf>,
    /// Number of payloads sent at the same time
    #[arg(long, short, default_value_t = 5)]
    threads: usize,
    /// Seconds to wait before reconnecting after a refused connection
    #[arg(long, default_value = "2", value_parser = parse_seconds)]
    connect_timeout: Duration,
    /// Number of reconnects per payload
    #[arg(long, default_value_t = 2)]
    max_retries: usize,
    /// Seconds to wait for a server response
    #[arg(long, default_value = "2", value_parser = parse_seconds)]
    server_timeout: Duration,
    /// Use TLS (the server certificate is not verified)
    #[arg(long)]
    ssl: bool,
    /// PEM file with a client certificate (may also contain the key)
    #[arg(long, requires = "ssl")]
    ssl_cert: Option<PathBuf>,
    /// PEM file with the key of the client certificate
    #[arg(long, requires = "ssl")]
    ssl_key: Option<PathBuf>,
    /// Replace KEY with VALUE inside of every payload (can be used multiple times)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_parameter)]
    params: Vec<(String, String)>,
    /// Do not colorize the output
    #[arg(long, default_value_t = false)]
    no_color: bool,
    /// Only show payloads which received a response
    #[arg(long, default_value_t = false)]
    no_failed: bool,
    /// Print the result of each payload as soon as it is done
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
    /// Print the results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Write the JSON results into this file
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Replace an existing output file
    #[arg(long, default_value_t = false)]
    overwrite: bool,
    /// Only check how many simultaneous connections the target accepts [default: 5]
    #[arg(long, value_name = "CONNECTIONS", num_args = 0..=1)]
    check_blocking: Option<Option<usize>>,
    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value.parse().map_err(|err| format!("{err}"))?;
    Duration::try_from_secs_f64(seconds).map_err(|err| format!("{err}"))
}

fn parse_parameter(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, _)) if key.is_empty() => Err("the key must not be empty".into()),
        Some((key, value)) => Ok((key.to_owned(), value.to_owned())),
        None => Err(format!("expected KEY=VALUE, got `{value}`")),
    }
}

fn default_payload_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".local/share/quickfuzz/payloads")
}

impl QuickFuzzCliArgs {
    /// Number of probe connections if only the blocking check was requested
    fn blocking_check_connections(&self) -> Option<usize> {
        self.check_blocking
            .map(|sock_num| sock_num.unwrap_or(DEFAULT_PROBE_CONNECTIONS))
    }

    fn fuzzer_config(&self) -> FuzzerConfig {
        let mut target = TargetConfig::new(self.ip.clone(), self.port);
        target.tls = self.ssl;
        target.tls_cert.clone_from(&self.ssl_cert);
        target.tls_key.clone_from(&self.ssl_key);

        let mut config = FuzzerConfig::new(target);
        config.connect_timeout = self.connect_timeout;
        config.max_retries = self.max_retries;
        config.server_timeout = self.server_timeout;
        config.threads = self.threads;
        config.verbose = self.verbose;
        config.no_failed = self.no_failed;
        if self.no_color {
            config.colors = ColorScheme::plain();
        }
        config
    }
}

/// Parses the command line, runs the fuzzer and prints the results
pub(crate) async fn start_cli() -> QuickFuzzResult<()> {
    let args = QuickFuzzCliArgs::parse();
    let logger = Logger::init(args.debug);
    tracing::debug!("Log level: {}", logger.level());
    run(&args).await
}

async fn run(args: &QuickFuzzCliArgs) -> QuickFuzzResult<()> {
    let config = args.fuzzer_config();
    config.validate()?;
    let colors = config.colors;

    let output = args
        .output
        .clone()
        .map(|path| Output::init(path, args.overwrite))
        .transpose()?;

    let transport = TargetTransport::from_config(&config.target)?;
    let mut fuzzer = Fuzzer::new(transport, config);

    if let Some(sock_num) = args.blocking_check_connections() {
        let accepted = fuzzer.is_blocking(sock_num).await?;
        let message = format!("[+] {accepted} of {sock_num} connections were accepted.");
        if accepted <= 1 {
            println!("{}", message.paint(colors.warning));
            println!(
                "{}",
                "[+] The target seems to block, consider using --threads 1.".paint(colors.warning)
            );
        } else {
            println!("{}", message.paint(colors.success));
        }
        return Ok(());
    }

    for (key, value) in &args.params {
        fuzzer.add_parameter(key.as_bytes(), value.as_bytes());
    }

    let payload_dir = args.payloads.clone().unwrap_or_else(default_payload_dir);
    if fuzzer.load_payloads(&payload_dir) == 0 {
        tracing::warn!("No payloads to send.");
    }

    fuzzer.start_fuzzing().await;

    if args.json {
        println!("{}", fuzzer.get_results_json()?);
    } else if !args.verbose {
        print!("{}", fuzzer.get_results());
    }

    if let Some(output) = output {
        output.write(&fuzzer.get_results_json()?)?;
    }
    Ok(())
}
