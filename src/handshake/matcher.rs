use crate::config::{CLIENT_PORT, EXPECTED_ACK_NO, RECV_BUF_LEN, SERVER_PORT, SERVER_SEQ_NO};
use crate::handshake::errors::HandshakeError;
use crate::ip::IpHeader;
use crate::packet;
use crate::rawsocket::socket::is_fatal;
use crate::rawsocket::PacketIo;
use crate::tcp::{TcpFlags, TcpHeader};
use nix::errno::Errno;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// The SYN-ACK the server has to send back for our SYN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedReply {
    pub client_port: u16,
    pub server_port: u16,
    pub ack_no: u32,
    pub seq_no: u32,
}

impl Default for ExpectedReply {
    fn default() -> Self {
        ExpectedReply {
            client_port: CLIENT_PORT,
            server_port: SERVER_PORT,
            ack_no: EXPECTED_ACK_NO,
            seq_no: SERVER_SEQ_NO,
        }
    }
}

/// Why a received segment is not the SYN-ACK we wait for.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("destination port {0} is not ours")]
    NotForUs(u16),

    #[error("source port {0} is not the server")]
    NotFromServer(u16),

    #[error("flags [{0}] are not SYN+ACK")]
    NotSynAck(TcpFlags),

    #[error("ack number {found} != {expected}")]
    WrongAck { expected: u32, found: u32 },

    #[error("seq number {found} != {expected}")]
    WrongSeq { expected: u32, found: u32 },
}

impl Rejection {
    /// True when the segment got past the port and flag checks.
    pub fn is_syn_ack(&self) -> bool {
        matches!(self, Rejection::WrongAck { .. } | Rejection::WrongSeq { .. })
    }
}

impl ExpectedReply {
    /// Check a segment against the expected SYN-ACK, in wire order: ports, flags,
    /// then ack and seq numbers.
    pub fn check(&self, tcph: &TcpHeader) -> Result<(), Rejection> {
        if tcph.dst_port != self.client_port {
            return Err(Rejection::NotForUs(tcph.dst_port));
        }
        if tcph.src_port != self.server_port {
            return Err(Rejection::NotFromServer(tcph.src_port));
        }
        if !tcph.flags.contains(TcpFlags::SYN | TcpFlags::ACK) {
            return Err(Rejection::NotSynAck(tcph.flags));
        }
        if tcph.ack_no != self.ack_no {
            return Err(Rejection::WrongAck { expected: self.ack_no, found: tcph.ack_no });
        }
        if tcph.seq_no != self.seq_no {
            return Err(Rejection::WrongSeq { expected: self.seq_no, found: tcph.seq_no });
        }
        Ok(())
    }
}

/// Reads datagrams until one is the expected SYN-ACK. Anything else is dropped.
#[derive(Debug)]
pub struct ReplyMatcher {
    expected: ExpectedReply,
    timeout: Option<Duration>,
    buf: Vec<u8>,
}

impl ReplyMatcher {
    /// `timeout: None` waits forever.
    pub fn new(expected: ExpectedReply, timeout: Option<Duration>) -> Self {
        ReplyMatcher {
            expected,
            timeout,
            buf: vec![0u8; RECV_BUF_LEN],
        }
    }

    /// Block until the expected SYN-ACK arrives and return its headers.
    ///
    /// Fails only on an unrecoverable receive error or when the optional timeout
    /// runs out. Transient receive errors are logged and retried. Noise arriving
    /// late does not extend the timeout.
    pub fn wait_for<P: PacketIo>(&mut self, io: &mut P) -> Result<(IpHeader, TcpHeader), HandshakeError> {
        let started = Instant::now();

        loop {
            // Each receive may only block for what is left of the overall timeout
            if let Some(timeout) = self.timeout {
                let remaining = timeout.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    return Err(HandshakeError::Timeout(timeout));
                }
                io.set_recv_timeout(remaining)
                    .map_err(|source| HandshakeError::SocketOption { option: "SO_RCVTIMEO", source })?;
            }

            let n = match io.recv_packet(&mut self.buf) {
                Ok(n) => n,
                Err(errno) if is_fatal(errno) => return Err(HandshakeError::Recv(errno)),
                Err(Errno::EAGAIN) if self.timeout.is_some() => continue, // SO_RCVTIMEO tick
                Err(errno) => {
                    warn!(%errno, "recvfrom() failed, retrying");
                    continue;
                }
            };

            let (iph, tcph) = match packet::unwrap(&self.buf[..n]) {
                Ok(headers) => headers,
                Err(err) => {
                    trace!(len = n, %err, "dropping unparseable datagram");
                    continue;
                }
            };

            let verdict = self.expected.check(&tcph);
            if verdict.is_ok() || verdict.is_err_and(|rejection| rejection.is_syn_ack()) {
                info!("TCP Flags: {} SEQ: {}", tcph.flags, tcph.seq_no);
            }

            match verdict {
                Ok(()) => {
                    info!("RECEIVED SYN-ACK (SEQ={}, ACK={})", tcph.seq_no, tcph.ack_no);
                    return Ok((iph, tcph));
                }
                Err(rejection) => {
                    debug!(src = %iph.src_ip, %rejection, "dropping segment");
                }
            }
        }
    }
}

// -- Unit tests --
