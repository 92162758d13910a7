use quickfuzz_common::transport::target::TargetTransport;
use quickfuzz_core::colored::ColorScheme;
use quickfuzz_core::fuzz::config::{FuzzerConfig, TargetConfig};
use quickfuzz_core::fuzz::engine::Fuzzer;
use quickfuzz_core::payload::REASON_TIMEOUT;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Answers `helo\n` and `subscribe\n`, stays silent for everything else
async fn handle_client(mut stream: TcpStream) {
    let mut buf = [0u8; 2048];
    let Ok(size) = stream.read(&mut buf).await else {
        return;
    };
    let response: &[u8] = match &buf[..size] {
        b"helo\n" => b"helo 127.0.0.1\n",
        b"subscribe\n" => b"Subscription accepted\n",
        _ => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            return;
        }
    };
    let _ = stream.write_all(response).await;
}

async fn start_target() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(handle_client(stream));
        }
    });
    port
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fuzz_local_target() {
    let port = start_target().await;

    let payload_dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        payload_dir.path().join("oneliners.txt"),
        b"helo\nsubscribe\n$CMD$\n",
    )
    .expect("write");
    std::fs::write(payload_dir.path().join("req.bin"), b"\x16\x03\x01\xff").expect("write");

    let target = TargetConfig::new("127.0.0.1", port);
    let mut config = FuzzerConfig::new(target.clone());
    config.threads = 3;
    config.server_timeout = Duration::from_secs(1);
    config.colors = ColorScheme::plain();

    let transport = TargetTransport::from_config(&target).expect("transport");
    let mut fuzzer = Fuzzer::new(transport, config);
    assert_eq!(fuzzer.load_payloads(payload_dir.path()), 4);
    fuzzer.add_parameter(b"$CMD$".to_vec(), b"helo".to_vec());

    let stats = fuzzer.start_fuzzing().await;
    assert_eq!(stats.total_payloads, 4);
    assert_eq!(stats.total_successes, 3);
    assert_eq!(stats.total_timeouts, 1);

    // oneliners.txt sorts before req.bin
    let payloads = fuzzer.payloads();
    assert_eq!(payloads[0].result(), "helo 127.0.0.1");
    assert_eq!(payloads[1].result(), "Subscription accepted");
    assert_eq!(payloads[2].data(), b"helo\n");
    assert_eq!(payloads[2].result(), "helo 127.0.0.1");
    assert_eq!(payloads[3].reason(), REASON_TIMEOUT);

    let text = fuzzer.get_results();
    assert!(text.contains("[+] Payload:\n[+]     \\x16\\x03\\x01\\xff\n[-] Failed: Server Timeout.\n"));

    let json: serde_json::Value =
        serde_json::from_str(&fuzzer.get_results_json().expect("json")).expect("valid json");
    assert_eq!(json[3]["data"], "\\x16\\x03\\x01\\xff");
    assert_eq!(json[0]["success"], true);
}

#[tokio::test]
async fn dead_target_fails_every_payload() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let target = TargetConfig::new("127.0.0.1", port);
    let mut config = FuzzerConfig::new(target.clone());
    config.connect_timeout = Duration::from_millis(10);
    config.max_retries = 1;

    let transport = TargetTransport::from_config(&target).expect("transport");
    let mut fuzzer = Fuzzer::new(transport, config);
    fuzzer.add_payload(b"helo\n".to_vec().into());
    fuzzer.add_payload(b"subscribe\n".to_vec().into());

    let stats = fuzzer.start_fuzzing().await;
    assert_eq!(stats.total_errors, 2);
    assert!(
        fuzzer
            .payloads()
            .iter()
            .all(|p| !p.success() && p.reason().starts_with("Maximum number of retries (1)"))
    );
}
