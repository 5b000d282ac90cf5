//! MessagePack-derived encoding and decoding, as used by the RSQL wire
//! protocol.
//!
//! The protocol uses the plain MessagePack primitives (nil, bool, integers,
//! float64, str, bin, array, map); extension types are not supported.

mod buffer_in;
mod buffer_out;
mod msgp_type;
pub(crate) mod prefix;

pub(crate) use self::{
    buffer_in::BufferIn,
    buffer_out::{BufferOut, SimpleValue},
    msgp_type::MsgpType,
};
