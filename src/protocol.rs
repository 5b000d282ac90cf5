pub(crate) mod batch;
pub(crate) mod msgp;
pub mod parts;
mod reply_type;
mod request_type;

pub(crate) use self::{reply_type::ReplyType, request_type::RequestType};
