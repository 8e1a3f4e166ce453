use crate::packet::PacketKind;
use nix::errno::Errno;
use std::time::Duration;
use thiserror::Error;

/// Everything that ends a handshake run. All variants are fatal; mismatched
/// replies never surface here.
#[derive(Error, Debug, PartialEq)]
pub enum HandshakeError {
    #[error("Socket creation failed: {0}")]
    Socket(Errno), // EPERM without CAP_NET_RAW

    #[error("setsockopt({option}) failed: {source}")]
    SocketOption { option: &'static str, source: Errno },

    #[error("sendto() failed for {kind}: {source}")]
    Send { kind: PacketKind, source: Errno },

    #[error("recvfrom() failed: {0}")]
    Recv(Errno),

    #[error("No matching SYN-ACK within {0:?}")]
    Timeout(Duration),
}
