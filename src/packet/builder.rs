use crate::config::{
    ChecksumMode, CLIENT_PORT, FINAL_ACK_ACK_NO, FINAL_ACK_IP_ID, FINAL_ACK_SEQ_NO, IPPROTO_TCP,
    LOOPBACK, PACKET_LEN, SERVER_PORT, SYN_IP_ID, SYN_SEQ_NO, TTL, WINDOW_SIZE,
};
use crate::ip::{IpFlags, IpHeader};
use crate::packet;
use crate::tcp::{TcpFlags, TcpHeader};
use std::fmt;

/// The two packets the client ever puts on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Syn,
    FinalAck,
}

impl PacketKind {
    pub fn ip_id(self) -> u16 {
        match self {
            PacketKind::Syn => SYN_IP_ID,
            PacketKind::FinalAck => FINAL_ACK_IP_ID,
        }
    }

    pub fn seq_no(self) -> u32 {
        match self {
            PacketKind::Syn => SYN_SEQ_NO,
            PacketKind::FinalAck => FINAL_ACK_SEQ_NO,
        }
    }

    pub fn ack_no(self) -> u32 {
        match self {
            PacketKind::Syn => 0,
            PacketKind::FinalAck => FINAL_ACK_ACK_NO,
        }
    }

    pub fn tcp_flags(self) -> TcpFlags {
        match self {
            PacketKind::Syn => TcpFlags::SYN,
            PacketKind::FinalAck => TcpFlags::ACK,
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketKind::Syn => write!(f, "SYN"),
            PacketKind::FinalAck => write!(f, "final ACK"),
        }
    }
}

/// Header pair for `kind`, with both checksum fields zero.
pub fn headers(kind: PacketKind) -> (IpHeader, TcpHeader) {
    let iph = IpHeader {
        version: 4,
        ihl: 5,
        tos: 0,
        total_len: PACKET_LEN as u16,
        id: kind.ip_id(),
        flags: IpFlags::empty(),
        frag_offset: 0,
        ttl: TTL,
        protocol: IPPROTO_TCP,
        checksum: 0,
        src_ip: LOOPBACK,
        dst_ip: LOOPBACK,
    };

    let tcph = TcpHeader {
        src_port: CLIENT_PORT,
        dst_port: SERVER_PORT,
        seq_no: kind.seq_no(),
        ack_no: kind.ack_no(),
        data_offset: 5,
        reserved: 0,
        flags: kind.tcp_flags(),
        window: WINDOW_SIZE,
        checksum: 0,
        urgent: 0,
    };

    (iph, tcph)
}

/// Build the 40-byte IPv4+TCP packet for `kind`.
///
/// With `ChecksumMode::Unset` both checksum fields stay zero on the wire. With
/// `ChecksumMode::Compute` the IPv4 header checksum and the TCP checksum (over
/// the pseudo-header) are filled in.
pub fn build(kind: PacketKind, mode: ChecksumMode) -> [u8; PACKET_LEN] {
    let (mut iph, mut tcph) = headers(kind);

    if mode == ChecksumMode::Compute {
        iph.checksum = IpHeader::checksum(&iph.to_bytes());
        tcph.checksum = TcpHeader::checksum(&tcph.to_bytes(), &iph);
    }

    packet::wrap(&iph, &tcph)
}

// -- Unit tests --
