mod field;
mod row_layout;
mod rsql_value;
mod server_error;
mod type_id;

pub(crate) use self::field::{fill_row, parse_row, Field};
pub(crate) use self::row_layout::RowLayout;
pub use self::rsql_value::RsqlValue;
pub use self::server_error::{ServerError, Severity};
pub use self::type_id::TypeId;
