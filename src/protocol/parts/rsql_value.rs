use crate::types::{DayDate, DayTime, Timestamp};
use bigdecimal::BigDecimal;

/// A single field value of a result row.
///
/// The variant is determined by the column's server-side data type;
/// database NULL is represented by [`RsqlValue::NULL`] for all types.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[allow(non_camel_case_types)]
pub enum RsqlValue {
    /// Database NULL.
    NULL,
    /// Value of type BOOLEAN or BIT.
    BOOLEAN(bool),
    /// Value of type TINYINT.
    TINYINT(u8),
    /// Value of type SMALLINT.
    SMALLINT(i16),
    /// Value of type INT.
    INT(i32),
    /// Value of type BIGINT.
    BIGINT(i64),
    /// Value of type MONEY or NUMERIC.
    DECIMAL(BigDecimal),
    /// Value of type FLOAT.
    DOUBLE(f64),
    /// Value of type VARCHAR.
    STRING(String),
    /// Value of type VARBINARY.
    BINARY(Vec<u8>),
    /// Value of type DATE.
    DAYDATE(DayDate),
    /// Value of type TIME.
    DAYTIME(DayTime),
    /// Value of type DATETIME.
    TIMESTAMP(Timestamp),
}

impl RsqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RsqlValue::NULL)
    }
}

impl std::fmt::Display for RsqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RsqlValue::NULL => write!(f, "<NULL>"),
            RsqlValue::BOOLEAN(value) => write!(f, "{value}"),
            RsqlValue::TINYINT(value) => write!(f, "{value}"),
            RsqlValue::SMALLINT(value) => write!(f, "{value}"),
            RsqlValue::INT(value) => write!(f, "{value}"),
            RsqlValue::BIGINT(value) => write!(f, "{value}"),
            RsqlValue::DECIMAL(value) => write!(f, "{value}"),
            RsqlValue::DOUBLE(value) => write!(f, "{value}"),
            RsqlValue::STRING(value) => write!(f, "{value}"),
            RsqlValue::BINARY(value) => write!(f, "<binary, len = {}>", value.len()),
            RsqlValue::DAYDATE(value) => write!(f, "{value}"),
            RsqlValue::DAYTIME(value) => write!(f, "{value}"),
            RsqlValue::TIMESTAMP(value) => write!(f, "{value}"),
        }
    }
}
