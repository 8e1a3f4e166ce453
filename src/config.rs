use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

// -- Addressing --

pub const LOOPBACK: Ipv4Addr = Ipv4Addr::LOCALHOST;
pub const CLIENT_PORT: u16 = 54321;
pub const SERVER_PORT: u16 = 12345;

// -- Sequence numbers --

pub const SYN_SEQ_NO: u32 = 200;
pub const SERVER_SEQ_NO: u32 = 400;
pub const FINAL_ACK_SEQ_NO: u32 = 600;

/// Ack number the server must send back for our SYN
pub const EXPECTED_ACK_NO: u32 = SYN_SEQ_NO + 1;
/// Ack number we put in the final ACK
pub const FINAL_ACK_ACK_NO: u32 = SERVER_SEQ_NO + 1;

// -- Header fields --

pub const SYN_IP_ID: u16 = 11111;
pub const FINAL_ACK_IP_ID: u16 = 22222;
pub const TTL: u8 = 64;
pub const WINDOW_SIZE: u16 = 8192;
pub const IPPROTO_TCP: u8 = 6;

pub const IP_HEADER_LEN: usize = 20;
pub const TCP_HEADER_LEN: usize = 20;
pub const PACKET_LEN: usize = IP_HEADER_LEN + TCP_HEADER_LEN;

/// Large enough for any IPv4 datagram
pub const RECV_BUF_LEN: usize = 65536;

pub fn server_addr() -> SocketAddrV4 {
    SocketAddrV4::new(LOOPBACK, SERVER_PORT)
}

/// Whether outgoing headers carry real checksums or zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumMode {
    /// Leave both checksum fields zero on the wire.
    #[default]
    Unset,
    /// Fill in the IPv4 header checksum and the TCP pseudo-header checksum.
    Compute,
}

/// Runtime knobs for a handshake run. The default reproduces the fixed script:
/// zero checksums and a receive loop that waits forever.
#[derive(Debug, Clone, Default)]
pub struct HandshakeConfig {
    pub checksum: ChecksumMode,
    pub recv_timeout: Option<Duration>,
}

impl HandshakeConfig {
    pub fn checksum(mut self, mode: ChecksumMode) -> Self {
        self.checksum = mode;
        self
    }

    pub fn recv_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.recv_timeout = timeout;
        self
    }
}

// -- Unit tests --
