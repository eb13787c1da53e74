//! Renderer wire protocol: message types and length-prefixed framing

pub mod framing;
pub mod messages;

pub use framing::{read_frame, write_frame};
pub use messages::WireMessage;
