//! End-to-end runs of the handshake against scripted peers.
//!
//! No raw socket is opened here: each test plugs an in-memory `PacketIo` into
//! the driver and inspects what the client put on the wire.

use nix::errno::Errno;
use raw_handshake::config::{ChecksumMode, HandshakeConfig};
use raw_handshake::handshake::{self, HandshakeError, HandshakeState};
use raw_handshake::ip::IpHeader;
use raw_handshake::packet::{self, builder, PacketKind};
use raw_handshake::rawsocket::PacketIo;
use raw_handshake::tcp::{TcpFlags, TcpHeader};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn reply(seq_no: u32, ack_no: u32, flags: TcpFlags) -> Vec<u8> {
    let iph = IpHeader {
        total_len: 40,
        ttl: 64,
        protocol: 6,
        src_ip: Ipv4Addr::LOCALHOST,
        dst_ip: Ipv4Addr::LOCALHOST,
        ..Default::default()
    };
    let tcph = TcpHeader {
        src_port: 12345,
        dst_port: 54321,
        seq_no,
        ack_no,
        flags,
        window: 8192,
        ..Default::default()
    };
    packet::wrap(&iph, &tcph).to_vec()
}

fn syn_ack() -> Vec<u8> {
    reply(400, 201, TcpFlags::SYN | TcpFlags::ACK)
}

/// Hands out queued datagrams; once the queue is empty it either reports a dead
/// descriptor or, with `idle`, behaves like a socket whose receive timeout fires.
#[derive(Default)]
struct ScriptedPeer {
    replies: VecDeque<Vec<u8>>,
    idle: bool,
    sent: Vec<Vec<u8>>,
    consumed_at_send: Vec<usize>,
    consumed: usize,
}

impl ScriptedPeer {
    fn new(replies: Vec<Vec<u8>>) -> Self {
        ScriptedPeer { replies: replies.into(), ..Default::default() }
    }
}

impl PacketIo for ScriptedPeer {
    fn send_packet(&mut self, packet: &[u8]) -> Result<usize, Errno> {
        self.sent.push(packet.to_vec());
        self.consumed_at_send.push(self.consumed);
        Ok(packet.len())
    }

    fn recv_packet(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        match self.replies.pop_front() {
            Some(data) => {
                self.consumed += 1;
                buf[..data.len()].copy_from_slice(&data);
                Ok(data.len())
            }
            None if self.idle => {
                thread::sleep(Duration::from_millis(2));
                Err(Errno::EAGAIN)
            }
            None => Err(Errno::EBADF),
        }
    }
}

/// A peer fed from another thread. `recv_packet` blocks like a socket with no
/// timeout.
struct ChannelPeer {
    inbox: Receiver<Vec<u8>>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl PacketIo for ChannelPeer {
    fn send_packet(&mut self, packet: &[u8]) -> Result<usize, Errno> {
        self.sent.lock().unwrap().push(packet.to_vec());
        Ok(packet.len())
    }

    fn recv_packet(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        match self.inbox.recv() {
            Ok(data) => {
                buf[..data.len()].copy_from_slice(&data);
                Ok(data.len())
            }
            Err(_) => Err(Errno::EBADF),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn handshake_completes_with_expected_syn_ack() {
    // The raw socket also sees our own SYN on loopback
    let own_syn = builder::build(PacketKind::Syn, ChecksumMode::Unset).to_vec();
    let mut peer = ScriptedPeer::new(vec![own_syn, syn_ack()]);

    let established = handshake::run(&mut peer, HandshakeConfig::default()).unwrap();
    assert_eq!(established.state(), HandshakeState::Established);

    let matched = established.syn_ack();
    assert_eq!(matched.seq_no, 400);
    assert_eq!(matched.ack_no, 201);

    assert_eq!(peer.sent.len(), 2);
    assert_eq!(
        hex::encode(&peer.sent[0]),
        "450000282b670000400600007f0000017f000001d4313039000000c8000000005002200000000000"
    );
    assert_eq!(
        hex::encode(&peer.sent[1]),
        "4500002856ce0000400600007f0000017f000001d431303900000258000001915010200000000000"
    );

    let (_iph, final_ack) = packet::unwrap(&peer.sent[1]).unwrap();
    assert_eq!(final_ack.seq_no, 600);
    assert_eq!(final_ack.ack_no, 401);
    assert_eq!(final_ack.flags, TcpFlags::ACK);
}

#[test]
fn final_ack_waits_for_matching_reply() {
    let mut peer = ScriptedPeer::new(vec![
        reply(400, 999, TcpFlags::SYN | TcpFlags::ACK),
        reply(400, 201, TcpFlags::RST | TcpFlags::ACK),
        reply(401, 201, TcpFlags::SYN | TcpFlags::ACK),
        syn_ack(),
    ]);

    handshake::run(&mut peer, HandshakeConfig::default()).unwrap();

    // SYN before any reply, final ACK only after the fourth one
    assert_eq!(peer.consumed_at_send, vec![0, 4]);
}

#[test]
fn wrong_ack_keeps_client_waiting() {
    let (tx, inbox) = mpsc::channel();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let peer = ChannelPeer { inbox, sent: Arc::clone(&sent) };

    let client = thread::spawn(move || {
        handshake::run(peer, HandshakeConfig::default()).map(|established| established.state())
    });

    tx.send(reply(400, 999, TcpFlags::SYN | TcpFlags::ACK)).unwrap();
    thread::sleep(Duration::from_millis(100));

    assert!(!client.is_finished(), "client gave up on a mismatched reply");
    assert_eq!(sent.lock().unwrap().len(), 1, "final ACK sent too early");

    tx.send(syn_ack()).unwrap();
    let result = client.join().expect("client thread panicked");
    assert_eq!(result, Ok(HandshakeState::Established));
    assert_eq!(sent.lock().unwrap().len(), 2);
}

#[test]
fn receive_timeout_is_fatal_when_configured() {
    let mut peer = ScriptedPeer::new(vec![reply(400, 999, TcpFlags::SYN | TcpFlags::ACK)]);
    peer.idle = true;

    let timeout = Duration::from_millis(50);
    let config = HandshakeConfig::default().recv_timeout(Some(timeout));
    let result = handshake::run(&mut peer, config);

    assert_eq!(result.err(), Some(HandshakeError::Timeout(timeout)));
    assert_eq!(peer.sent.len(), 1);
}

#[test]
fn socket_open_failure_sends_nothing() {
    let mut opened = 0;
    let result = handshake::connect(HandshakeConfig::default(), |_config| -> Result<ScriptedPeer, _> {
        opened += 1;
        Err(HandshakeError::Socket(Errno::EPERM))
    });

    assert_eq!(opened, 1);
    assert_eq!(result.err(), Some(HandshakeError::Socket(Errno::EPERM)));
}

#[test]
fn checksums_filled_when_requested() {
    let mut peer = ScriptedPeer::new(vec![syn_ack()]);
    let config = HandshakeConfig::default().checksum(ChecksumMode::Compute);

    handshake::run(&mut peer, config).unwrap();

    for sent in &peer.sent {
        let (iph, _tcph) = packet::unwrap(sent).unwrap();
        assert_eq!(IpHeader::checksum(&sent[..20]), 0);
        assert_eq!(TcpHeader::checksum(&sent[20..], &iph), 0);
    }
}

#[test]
fn reply_with_ip_options_is_matched() {
    let plain = syn_ack();
    let mut with_options = [&plain[..20], &[1u8, 1, 1, 0][..], &plain[20..]].concat();
    with_options[0] = 0x46;

    let mut peer = ScriptedPeer::new(vec![with_options]);
    let established = handshake::run(&mut peer, HandshakeConfig::default()).unwrap();
    assert_eq!(established.syn_ack().seq_no, 400);
}
