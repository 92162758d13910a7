use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpSocket, TcpStream};

/// Small TCP service that only answers a few inputs. Run quickfuzz against it to check that the
/// expected payloads get a response.
#[derive(Debug, Parser)]
struct Args {
    /// Port to listen on
    #[arg(default_value_t = 8000)]
    port: u16,
    /// IP address to listen on
    #[arg(default_value = "127.0.0.1")]
    ip: String,
    /// Backlog of the listening socket
    #[arg(default_value_t = 10)]
    connections: u32,
    /// Respond to `helo\n`
    #[arg(long)]
    helo: bool,
    /// Respond to any JSON document
    #[arg(long)]
    json: bool,
    /// Respond to `subscribe\n`
    #[arg(long)]
    subscribe: bool,
    /// Respond to any XML document
    #[arg(long)]
    xml: bool,
}

impl Args {
    fn response(&self, data: &[u8]) -> Option<&'static [u8]> {
        let text = std::str::from_utf8(data).ok()?;
        if self.helo && text == "helo\n" {
            return Some(b"helo 127.0.0.1\n");
        }
        if self.subscribe && text == "subscribe\n" {
            return Some(b"Subscription accepted\n");
        }
        if self.xml && roxmltree::Document::parse(text).is_ok() {
            return Some(b"Error: Function tag is missing.\n");
        }
        if self.json && serde_json::from_str::<serde_json::Value>(text).is_ok() {
            return Some(b"Error: Function node is missing.\n");
        }
        None
    }
}

async fn handle_client(mut stream: TcpStream, args: Arc<Args>) {
    let mut buffer = [0u8; 2048];
    loop {
        let size = match stream.read(&mut buffer).await {
            Ok(0) | Err(_) => return,
            Ok(size) => size,
        };
        if let Some(response) = args.response(&buffer[..size]) {
            let _ = stream.write_all(response).await;
            return;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Arc::new(Args::parse());

    let addr = format!("{}:{}", args.ip, args.port)
        .parse()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(args.connections)?;
    println!("[+] Socket server listening on {addr}");

    println!("[+] Waiting for connections");
    loop {
        let (stream, peer) = listener.accept().await?;
        println!("[+] Connection from: {peer}");
        tokio::spawn(handle_client(stream, args.clone()));
    }
}
