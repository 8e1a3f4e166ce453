use bitflags::bitflags;
use std::fmt;

bitflags! {
    // Bit positions [ CWR, ECE, URG, ACK, PSH, RST, SYN, FIN ]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TcpFlags: u8 {
        const CWR = 1 << 7;
        const ECE = 1 << 6;
        const URG = 1 << 5;
        const ACK = 1 << 4;
        const PSH = 1 << 3;
        const RST = 1 << 2;
        const SYN = 1 << 1;
        const FIN = 1 << 0;
    }
}

impl TcpFlags {
    fn bit(&self, flag: TcpFlags) -> u8 {
        self.contains(flag) as u8
    }
}

/// Renders the handshake-relevant bits, e.g. `SYN: 1 ACK: 1 FIN: 0 RST: 0 PSH: 0`.
impl fmt::Display for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SYN: {} ACK: {} FIN: {} RST: {} PSH: {}",
            self.bit(TcpFlags::SYN),
            self.bit(TcpFlags::ACK),
            self.bit(TcpFlags::FIN),
            self.bit(TcpFlags::RST),
            self.bit(TcpFlags::PSH),
        )
    }
}

// -- Unit tests --
