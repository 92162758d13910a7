mod cli;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = cli::start_cli().await {
        eprintln!("[-] {err}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}
