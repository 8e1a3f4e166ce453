pub mod builder;
pub mod errors;

use crate::config::{IP_HEADER_LEN, PACKET_LEN};
use crate::ip::IpHeader;
use crate::packet::errors::HeaderError;
use crate::tcp::TcpHeader;

pub use builder::PacketKind;

/// Pack an option-less `IpHeader` and `TcpHeader` into a 40-byte packet.
pub fn wrap(iph: &IpHeader, tcph: &TcpHeader) -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[..IP_HEADER_LEN].copy_from_slice(&iph.to_bytes());
    packet[IP_HEADER_LEN..].copy_from_slice(&tcph.to_bytes());
    packet
}

/// Unpack a raw datagram into an `IpHeader` and `TcpHeader`. The TCP header is
/// read from `ihl * 4`, so IP options are tolerated. Checksums are not verified.
pub fn unwrap(datagram: &[u8]) -> Result<(IpHeader, TcpHeader), HeaderError> {
    let iph = IpHeader::parse(datagram)?;
    let tcph = TcpHeader::parse(&datagram[iph.header_len()..])?;
    Ok((iph, tcph))
}

// Unit test helpers


// -- Unit tests --
