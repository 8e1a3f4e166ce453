use crate::config::HandshakeConfig;
use crate::handshake::errors::HandshakeError;
use crate::handshake::matcher::{ExpectedReply, ReplyMatcher};
use crate::handshake::state::{Established, HandshakeState, Init, State, SynSent};
use crate::packet::builder::{self, PacketKind};
use crate::rawsocket::PacketIo;
use crate::tcp::TcpHeader;
use tracing::{debug, info};

/// The client side of the fixed three-packet exchange. Each state only exposes
/// the step that is legal from it.
#[derive(Debug)]
pub struct Handshake<P, S> {
    io: P,
    config: HandshakeConfig,
    state: S,
}

/// Shared helper methods
impl<P: PacketIo, S: State> Handshake<P, S> {
    pub fn state(&self) -> HandshakeState {
        S::STATE
    }

    /// Build and send one of our two packets. A send error is fatal.
    fn send(&mut self, kind: PacketKind) -> Result<(), HandshakeError> {
        let packet = builder::build(kind, self.config.checksum);
        debug!(%kind, packet = %hex::encode(packet), "sending");

        self.io
            .send_packet(&packet)
            .map_err(|source| HandshakeError::Send { kind, source })?;

        info!("SENT {} packet with SEQ={}", kind, kind.seq_no());
        Ok(())
    }

    fn transition<T: State>(self, next: T) -> Handshake<P, T> {
        debug!(from = %S::STATE, to = %T::STATE, "state change");
        Handshake {
            io: self.io,
            config: self.config,
            state: next,
        }
    }
}

impl<P: PacketIo> Handshake<P, Init> {
    pub fn new(io: P, config: HandshakeConfig) -> Self {
        Handshake { io, config, state: Init }
    }

    /// INIT -> SYN_SENT
    pub fn send_syn(mut self) -> Result<Handshake<P, SynSent>, HandshakeError> {
        self.send(PacketKind::Syn)?;
        Ok(self.transition(SynSent))
    }
}

impl<P: PacketIo> Handshake<P, SynSent> {
    /// SYN_SENT -> ESTABLISHED. Blocks until the expected SYN-ACK shows up, then
    /// sends the final ACK.
    pub fn complete(mut self) -> Result<Handshake<P, Established>, HandshakeError> {
        let mut matcher = ReplyMatcher::new(ExpectedReply::default(), self.config.recv_timeout);
        let (_iph, syn_ack) = matcher.wait_for(&mut self.io)?;

        self.send(PacketKind::FinalAck)?;
        Ok(self.transition(Established { syn_ack }))
    }
}

impl<P: PacketIo> Handshake<P, Established> {
    /// The SYN-ACK that completed the handshake.
    pub fn syn_ack(&self) -> &TcpHeader {
        &self.state.syn_ack
    }
}

/// Run SYN -> SYN-ACK -> ACK over an already open endpoint.
pub fn run<P: PacketIo>(io: P, config: HandshakeConfig) -> Result<Handshake<P, Established>, HandshakeError> {
    Handshake::new(io, config).send_syn()?.complete()
}

/// Open the endpoint with `open`, then run the handshake over it. Nothing is sent
/// when opening fails.
pub fn connect<P, F>(config: HandshakeConfig, open: F) -> Result<Handshake<P, Established>, HandshakeError>
where
    P: PacketIo,
    F: FnOnce(&HandshakeConfig) -> Result<P, HandshakeError>,
{
    let io = open(&config)?;
    run(io, config)
}

// -- Unit tests --
