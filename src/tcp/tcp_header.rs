use crate::config::TCP_HEADER_LEN;
use crate::ip::ip_header::IpHeader;
use crate::packet::errors::HeaderError;
use crate::tcp::tcp_flags::TcpFlags;

#[derive(Debug, Clone, PartialEq)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq_no: u32,
    pub ack_no: u32,
    pub data_offset: u8, // Upper 4 bits
    pub reserved: u8,    // Lower 4 bits
    pub flags: TcpFlags,
    pub window: u16,
    pub checksum: u16,
    pub urgent: u16,
}

impl Default for TcpHeader {
    fn default() -> Self {
        TcpHeader {
            src_port: 0,
            dst_port: 0,
            seq_no: 0,
            ack_no: 0,
            data_offset: 5,
            reserved: 0,
            flags: TcpFlags::empty(),
            window: 0,
            checksum: 0,
            urgent: 0,
        }
    }
}

impl TcpHeader {
    /// Convert a `TcpHeader` into a byte array of size 20.
    /// The checksum field is written as-is; see `TcpHeader::checksum`.
    pub fn to_bytes(&self) -> [u8; TCP_HEADER_LEN] {
        let mut buf = [0u8; TCP_HEADER_LEN];

        buf[0..2].copy_from_slice(&self.src_port.to_be_bytes());
        buf[2..4].copy_from_slice(&self.dst_port.to_be_bytes());
        buf[4..8].copy_from_slice(&self.seq_no.to_be_bytes());
        buf[8..12].copy_from_slice(&self.ack_no.to_be_bytes());
        buf[12] = (self.data_offset << 4) | self.reserved;
        buf[13] = self.flags.bits();
        buf[14..16].copy_from_slice(&self.window.to_be_bytes());
        buf[16..18].copy_from_slice(&self.checksum.to_be_bytes());
        buf[18..20].copy_from_slice(&self.urgent.to_be_bytes());

        buf
    }

    /// Parse the fixed part of a TCP header. Options and payload are skipped and
    /// the checksum is not verified.
    pub fn parse(buf: &[u8]) -> Result<Self, HeaderError> {
        if buf.len() < TCP_HEADER_LEN {
            return Err(HeaderError::BufferTooSmall { expected: TCP_HEADER_LEN, found: buf.len() });
        }

        let data_offset = buf[12] >> 4;
        if data_offset < 5 {
            return Err(HeaderError::Malformed("TCP".to_string()));
        }

        Ok(TcpHeader {
            src_port: u16::from_be_bytes([buf[0], buf[1]]),
            dst_port: u16::from_be_bytes([buf[2], buf[3]]),
            seq_no: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            ack_no: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
            data_offset,
            reserved: buf[12] & 0x0f,
            flags: TcpFlags::from_bits_truncate(buf[13]),
            window: u16::from_be_bytes([buf[14], buf[15]]),
            checksum: u16::from_be_bytes([buf[16], buf[17]]),
            urgent: u16::from_be_bytes([buf[18], buf[19]]),
        })
    }

    /// Compute the checksum of a TCP segment (header, options and payload) using
    /// the pseudo-header taken from `iph`.
    pub fn checksum(data: &[u8], iph: &IpHeader) -> u16 {
        let mut sum: u32 = 0;

        // Pseudo-header
        let src_bytes = iph.src_ip.octets();
        let dst_bytes = iph.dst_ip.octets();

        sum += ((src_bytes[0] as u32) << 8) | (src_bytes[1] as u32);
        sum += ((src_bytes[2] as u32) << 8) | (src_bytes[3] as u32);
        sum += ((dst_bytes[0] as u32) << 8) | (dst_bytes[1] as u32);
        sum += ((dst_bytes[2] as u32) << 8) | (dst_bytes[3] as u32);

        // Add protocol and TCP segment length
        sum += iph.protocol as u32;
        sum += data.len() as u32;

        // Sum the segment, padding an odd trailing byte with zero
        for chunk in data.chunks(2) {
            let hi = chunk[0] as u32;
            let lo = chunk.get(1).copied().unwrap_or(0) as u32;
            sum += (hi << 8) | lo;
        }

        // Fold the carry bits
        while sum >> 16 != 0 {
            sum = (sum & 0xffff) + (sum >> 16);
        }

        !(sum as u16)
    }
}

// -- Unit tests --
