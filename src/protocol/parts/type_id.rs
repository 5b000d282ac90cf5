use crate::{RsqlError, RsqlResult};

/// ID of the server-side data type of a column.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(non_camel_case_types)]
pub enum TypeId {
    /// Result of a statement that produces no value.
    VOID = 1,
    /// A truth value.
    BOOLEAN = 2,
    /// Variable-length byte string with an upper length bound.
    VARBINARY = 4,
    /// Variable-length or blank-padded character string.
    VARCHAR = 6,
    /// A single bit, transported as 0 or 1.
    BIT = 9,
    /// Unsigned 8-bit integer.
    TINYINT = 10,
    /// Signed 16-bit integer.
    SMALLINT = 11,
    /// Signed 32-bit integer.
    INT = 12,
    /// Signed 64-bit integer.
    BIGINT = 13,
    /// Fixed-point currency value.
    MONEY = 15,
    /// Fixed-point decimal value with precision and scale.
    NUMERIC = 16,
    /// 64-bit floating-point value.
    FLOAT = 17,
    /// Calendar date without time.
    DATE = 19,
    /// Time of day with sub-second precision.
    TIME = 20,
    /// Combination of date and time of day.
    DATETIME = 21,
}

impl TypeId {
    pub(crate) fn try_new(id: u64) -> RsqlResult<Self> {
        match id {
            1 => Ok(Self::VOID),
            2 => Ok(Self::BOOLEAN),
            4 => Ok(Self::VARBINARY),
            6 => Ok(Self::VARCHAR),
            9 => Ok(Self::BIT),
            10 => Ok(Self::TINYINT),
            11 => Ok(Self::SMALLINT),
            12 => Ok(Self::INT),
            13 => Ok(Self::BIGINT),
            15 => Ok(Self::MONEY),
            16 => Ok(Self::NUMERIC),
            17 => Ok(Self::FLOAT),
            19 => Ok(Self::DATE),
            20 => Ok(Self::TIME),
            21 => Ok(Self::DATETIME),
            _ => Err(RsqlError::Protocol(format!("unknown datatype {id}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TypeId;

    #[test]
    fn unknown_datatype_is_rejected() {
        assert_eq!(TypeId::try_new(12).unwrap(), TypeId::INT);
        assert!(TypeId::try_new(3).is_err());
        assert!(TypeId::try_new(22).is_err());
    }
}
