pub mod driver;
pub mod errors;
pub mod matcher;
pub mod state;

pub use driver::{connect, run, Handshake};
pub use errors::HandshakeError;
pub use matcher::{ExpectedReply, Rejection, ReplyMatcher};
pub use state::HandshakeState;
