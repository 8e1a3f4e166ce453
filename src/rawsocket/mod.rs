pub mod socket;

use nix::errno::Errno;
use std::time::Duration;

pub use socket::RawSocket;

/// Datagram-level I/O the handshake runs over. `RawSocket` is the real one;
/// tests plug in scripted peers.
pub trait PacketIo {
    /// Send one complete IPv4 datagram.
    fn send_packet(&mut self, packet: &[u8]) -> Result<usize, Errno>;

    /// Block until one IPv4 datagram arrives and copy it into `buf`.
    fn recv_packet(&mut self, buf: &mut [u8]) -> Result<usize, Errno>;

    /// Bound how long the next `recv_packet` may block before it fails with
    /// `EAGAIN`. Endpoints that never block can ignore it.
    fn set_recv_timeout(&mut self, _timeout: Duration) -> Result<(), Errno> {
        Ok(())
    }
}

impl<P: PacketIo + ?Sized> PacketIo for &mut P {
    fn send_packet(&mut self, packet: &[u8]) -> Result<usize, Errno> {
        (**self).send_packet(packet)
    }

    fn recv_packet(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        (**self).recv_packet(buf)
    }

    fn set_recv_timeout(&mut self, timeout: Duration) -> Result<(), Errno> {
        (**self).set_recv_timeout(timeout)
    }
}
