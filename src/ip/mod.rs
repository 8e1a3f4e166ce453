pub mod ip_flags;
pub mod ip_header;

pub use ip_flags::IpFlags;
pub use ip_header::IpHeader;
