//! Protocol module containing message types, the JSON codec, and the sequencer.

pub mod codec;
pub mod messages;
pub mod sequence;

pub use codec::{decode_reply, encode_event, encode_handshake, ProtocolError};
pub use messages::*;
pub use sequence::Sequencer;
