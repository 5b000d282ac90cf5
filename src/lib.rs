//! A synchronous driver for the RSQL database server, written in pure rust.
//!
//! The driver talks RSQL's MessagePack-derived binary protocol over a plain
//! TCP connection: it serializes SQL batch requests and decodes tabular
//! results, server errors, and status messages.
//!
//! The main entry point is [`Connection`]:
//!
//! ```rust,no_run
//! use rsqldrv::{Connection, RsqlResult};
//!
//! fn main() -> RsqlResult<()> {
//!     let mut connection =
//!         Connection::new("server = 127.0.0.1:7777; login = john; password = secret")?;
//!     let mut cursor = connection.query("SELECT id, name FROM master.dbo.employees")?;
//!     while cursor.next_row()? {
//!         println!("{:?}", cursor.values()?);
//!     }
//!     Ok(())
//! }
//! ```

#![deny(missing_debug_implementations)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

mod conn;
mod connection;
mod cursor;
mod protocol;
mod rsql_error;
mod types_impl;

pub use crate::conn::{ConnectParams, ConnectParamsBuilder, IntoConnectParams};
pub use crate::connection::{CancelHandle, Connection};
pub use crate::cursor::Cursor;
pub use crate::protocol::parts::{RsqlValue, ServerError, Severity, TypeId};
pub use crate::rsql_error::{RsqlError, RsqlResult};

/// Non-standard types that are used within the [`RsqlValue`]s of a result row.
pub mod types {
    pub use crate::types_impl::{daydate::DayDate, daytime::DayTime, timestamp::Timestamp};
}

/// Default port of the RSQL server.
pub const DEFAULT_PORT: u16 = 7777;

/// Interval between two keep-alive probes on an idle connection.
pub const KEEPALIVE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(20);

/// Default timeout for establishing and authenticating a connection.
pub const DEFAULT_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);
