use crate::config::IP_HEADER_LEN;
use crate::ip::ip_flags::IpFlags;
use crate::packet::errors::HeaderError;
use std::net::Ipv4Addr;

#[derive(Debug, Clone, PartialEq)]
pub struct IpHeader {
    pub version: u8, // Always 4 for IPv4
    pub ihl: u8,     // 5 when we send out, may carry options when receiving
    pub tos: u8,
    pub total_len: u16,
    pub id: u16,
    pub flags: IpFlags,   // 3 bits, part of u16
    pub frag_offset: u16, // 13 bits, part of u16
    pub ttl: u8,
    pub protocol: u8, // Always 6 for TCP
    pub checksum: u16,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
}

impl IpHeader {
    /// Length of the header in bytes, options included.
    pub fn header_len(&self) -> usize {
        self.ihl as usize * 4
    }

    /// Convert an `IpHeader` into a byte array of size 20.
    /// The checksum field is written as-is; see `IpHeader::checksum`.
    pub fn to_bytes(&self) -> [u8; IP_HEADER_LEN] {
        let mut buf = [0u8; IP_HEADER_LEN];

        buf[0] = (self.version << 4) | self.ihl;
        buf[1] = self.tos;
        buf[2..4].copy_from_slice(&self.total_len.to_be_bytes());
        buf[4..6].copy_from_slice(&self.id.to_be_bytes());
        let flags = self.flags.pack(self.frag_offset);
        buf[6..8].copy_from_slice(&flags.to_be_bytes());
        buf[8] = self.ttl;
        buf[9] = self.protocol;
        buf[10..12].copy_from_slice(&self.checksum.to_be_bytes());
        buf[12..16].copy_from_slice(&self.src_ip.octets());
        buf[16..20].copy_from_slice(&self.dst_ip.octets());

        buf
    }

    /// Parse a byte array into an `IpHeader`. Options are skipped and the checksum
    /// is not verified.
    pub fn parse(buf: &[u8]) -> Result<Self, HeaderError> {
        if buf.len() < IP_HEADER_LEN {
            return Err(HeaderError::BufferTooSmall { expected: IP_HEADER_LEN, found: buf.len() });
        }

        let version = buf[0] >> 4;
        let ihl = buf[0] & 0x0f;
        if version != 4 || ihl < 5 {
            return Err(HeaderError::Malformed("IPv4".to_string()));
        }

        let header_len = ihl as usize * 4;
        if buf.len() < header_len {
            return Err(HeaderError::BufferTooSmall { expected: header_len, found: buf.len() });
        }

        let combo_flags = u16::from_be_bytes([buf[6], buf[7]]);
        let (flags, frag_offset) = IpFlags::unpack(combo_flags);

        Ok(IpHeader {
            version,
            ihl,
            tos: buf[1],
            total_len: u16::from_be_bytes([buf[2], buf[3]]),
            id: u16::from_be_bytes([buf[4], buf[5]]),
            flags,
            frag_offset,
            ttl: buf[8],
            protocol: buf[9],
            checksum: u16::from_be_bytes([buf[10], buf[11]]),
            src_ip: Ipv4Addr::new(buf[12], buf[13], buf[14], buf[15]),
            dst_ip: Ipv4Addr::new(buf[16], buf[17], buf[18], buf[19]),
        })
    }

    /// Compute the checksum for an IPv4 header.
    /// Over a header that already carries a valid checksum this returns 0.
    /// Wiki: https://en.wikipedia.org/wiki/IPv4_header_checksum.
    pub fn checksum(data: &[u8]) -> u16 {
        // Sum every 2 bytes as a 16-bit value
        let mut sum: u32 = data
            .chunks(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk.get(1).copied().unwrap_or(0)]) as u32)
            .sum();

        // Fold the carry bits
        while sum >> 16 != 0 {
            sum = (sum & 0xffff) + (sum >> 16);
        }

        !(sum as u16)
    }
}

impl Default for IpHeader {
    fn default() -> Self {
        IpHeader {
            version: 4,
            ihl: 5,
            tos: 0,
            total_len: 0,
            id: 0,
            flags: IpFlags::empty(),
            frag_offset: 0,
            ttl: 0,
            protocol: 0,
            checksum: 0,
            src_ip: Ipv4Addr::UNSPECIFIED,
            dst_ip: Ipv4Addr::UNSPECIFIED,
        }
    }
}

// -- Unit tests --
