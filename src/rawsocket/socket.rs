use crate::config::{server_addr, HandshakeConfig};
use crate::handshake::errors::HandshakeError;
use crate::rawsocket::PacketIo;
use nix::errno::Errno;
use nix::sys::socket::sockopt::ReceiveTimeout;
use nix::sys::socket::{
    recvfrom, sendto, setsockopt, socket, AddressFamily, MsgFlags, SockFlag, SockProtocol, SockType,
    SockaddrIn,
};
use nix::sys::time::TimeVal;
use std::mem;
use std::os::fd::{AsRawFd, OwnedFd};
use std::time::Duration;
use tracing::debug;

/// Open a raw IPv4 socket that sees TCP traffic.
pub fn new_raw_socket() -> Result<OwnedFd, Errno> {
    socket(AddressFamily::Inet, SockType::Raw, SockFlag::empty(), SockProtocol::Tcp)
}

/// Tell the kernel that every outgoing buffer already starts with an IPv4 header.
/// Fails with `ENOPROTOOPT` on anything but a raw socket.
pub fn set_header_included(fd: &OwnedFd) -> Result<(), Errno> {
    let on: libc::c_int = 1;
    // SAFETY: `fd` is open for the duration of the call and `on` outlives it.
    let res = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            libc::IPPROTO_IP,
            libc::IP_HDRINCL,
            &on as *const libc::c_int as *const libc::c_void,
            mem::size_of_val(&on) as libc::socklen_t,
        )
    };
    Errno::result(res).map(drop)
}

/// Longest SO_RCVTIMEO we hand to the kernel, about 68 years
const MAX_TIMEOUT_SECS: u64 = i32::MAX as u64;

/// Convert to a `timeval` for SO_RCVTIMEO. Huge durations are clamped and a zero
/// duration becomes 1us, since a zero `timeval` means "block forever".
fn to_timeval(duration: Duration) -> TimeVal {
    let secs = duration.as_secs().min(MAX_TIMEOUT_SECS);
    let micros = if secs == 0 { duration.subsec_micros().max(1) } else { duration.subsec_micros() };
    TimeVal::new(secs as libc::time_t, micros as libc::suseconds_t)
}

pub fn set_timeout(fd: &OwnedFd, duration: Duration) -> Result<(), Errno> {
    setsockopt(fd, ReceiveTimeout, &to_timeval(duration))
}

/// Errors after which the descriptor is unusable. Anything else from `recvfrom`
/// is worth retrying.
pub fn is_fatal(errno: Errno) -> bool {
    matches!(errno, Errno::EBADF | Errno::ENOTSOCK | Errno::EFAULT | Errno::EINVAL)
}

/// A raw socket with IP_HDRINCL set, aimed at the loopback server.
#[derive(Debug)]
pub struct RawSocket {
    fd: OwnedFd,
    dest: SockaddrIn,
}

impl RawSocket {
    pub fn open(config: &HandshakeConfig) -> Result<Self, HandshakeError> {
        let fd = new_raw_socket().map_err(HandshakeError::Socket)?;

        set_header_included(&fd)
            .map_err(|source| HandshakeError::SocketOption { option: "IP_HDRINCL", source })?;

        if let Some(timeout) = config.recv_timeout {
            set_timeout(&fd, timeout)
                .map_err(|source| HandshakeError::SocketOption { option: "SO_RCVTIMEO", source })?;
        }

        let dest = SockaddrIn::from(server_addr());
        debug!(fd = fd.as_raw_fd(), %dest, "raw socket ready");
        Ok(RawSocket { fd, dest })
    }
}

impl PacketIo for RawSocket {
    fn send_packet(&mut self, packet: &[u8]) -> Result<usize, Errno> {
        sendto(self.fd.as_raw_fd(), packet, &self.dest, MsgFlags::empty())
    }

    fn recv_packet(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        let (n, _from) = recvfrom::<SockaddrIn>(self.fd.as_raw_fd(), buf)?;
        Ok(n)
    }

    fn set_recv_timeout(&mut self, timeout: Duration) -> Result<(), Errno> {
        set_timeout(&self.fd, timeout)
    }
}

// -- Unit tests --
