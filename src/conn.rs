mod connect_params;
mod connection_core;
mod write_core;

pub use self::connect_params::{ConnectParams, ConnectParamsBuilder, IntoConnectParams};
pub(crate) use self::connection_core::ConnectionCore;
pub(crate) use self::write_core::{AmWriteCore, WriteCore};
