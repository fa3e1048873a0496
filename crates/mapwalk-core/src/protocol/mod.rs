//! Protocol module containing message types and the JSON codec.

pub mod codec;
pub mod messages;

pub use codec::{
    decode_server_message, encode_announcement, encode_movement, encode_server_message,
    ProtocolError,
};
pub use messages::*;
