pub mod tcp_flags;
pub mod tcp_header;

pub use tcp_flags::TcpFlags;
pub use tcp_header::TcpHeader;
