use crate::tcp::TcpHeader;
use std::fmt;

/// Where the client is in the three-step exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Init,        // Nothing sent yet
    SynSent,     // SYN sent, waiting for SYN-ACK
    Established, // SYN-ACK matched, final ACK sent
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandshakeState::Init => "INIT",
            HandshakeState::SynSent => "SYN_SENT",
            HandshakeState::Established => "ESTABLISHED",
        };
        f.write_str(name)
    }
}

// Typestate markers for `Handshake<P, S>`

#[derive(Debug)]
pub struct Init;

#[derive(Debug)]
pub struct SynSent;

/// Holds the SYN-ACK that completed the handshake.
#[derive(Debug)]
pub struct Established {
    pub syn_ack: TcpHeader,
}

pub trait State {
    const STATE: HandshakeState;
}

impl State for Init {
    const STATE: HandshakeState = HandshakeState::Init;
}

impl State for SynSent {
    const STATE: HandshakeState = HandshakeState::SynSent;
}

impl State for Established {
    const STATE: HandshakeState = HandshakeState::Established;
}
