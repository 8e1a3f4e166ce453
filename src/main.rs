use clap::Parser;
use raw_handshake::config::{ChecksumMode, HandshakeConfig};
use raw_handshake::handshake::{self, HandshakeError};
use raw_handshake::rawsocket::RawSocket;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "raw-handshake", about = "TCP three-way handshake over a raw socket to 127.0.0.1:12345")]
struct Args {
    /// Give up waiting for the SYN-ACK after this many milliseconds (waits forever by default)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    recv_timeout_ms: Option<u64>,

    /// Fill in real IPv4 and TCP checksums instead of leaving them zero
    #[arg(long)]
    compute_checksums: bool,
}

impl Args {
    fn config(&self) -> HandshakeConfig {
        let checksum = if self.compute_checksums {
            ChecksumMode::Compute
        } else {
            ChecksumMode::Unset
        };

        HandshakeConfig::default()
            .checksum(checksum)
            .recv_timeout(self.recv_timeout_ms.map(Duration::from_millis))
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    info!("Client starting TCP handshake...");
    exit_code(handshake::connect(args.config(), RawSocket::open))
}

/// 0 once the final ACK is out, 1 on any fatal error.
fn exit_code<T>(result: Result<T, HandshakeError>) -> ExitCode {
    match result {
        Ok(_established) => {
            info!("Handshake complete.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
