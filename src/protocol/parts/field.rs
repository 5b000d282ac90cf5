use crate::{
    protocol::msgp::{BufferIn, MsgpType},
    protocol::parts::{RsqlValue, TypeId},
    types::{DayDate, DayTime, Timestamp},
    types_impl::decimal,
    RsqlError, RsqlResult,
};
use bigdecimal::BigDecimal;
use std::str::FromStr;

/// One column of a rowset: its type descriptor plus the value of the
/// current row.
///
/// The descriptor is read once per rowset from the layout response; the
/// value slot is overwritten by each data response.
#[derive(Debug)]
#[allow(non_camel_case_types)]
pub(crate) enum Field {
    VOID,
    BOOLEAN(Option<bool>),
    VARBINARY {
        precision: u32,
        value: Option<Vec<u8>>,
    },
    VARCHAR {
        precision: u32,
        fixlen: bool,
        value: Option<String>,
    },
    BIT(Option<bool>),
    TINYINT(Option<u8>),
    SMALLINT(Option<i16>),
    INT(Option<i32>),
    BIGINT(Option<i64>),
    MONEY {
        precision: u32,
        scale: u32,
        value: Option<BigDecimal>,
    },
    NUMERIC {
        precision: u32,
        scale: u32,
        value: Option<BigDecimal>,
    },
    FLOAT(Option<f64>),
    DATE(Option<DayDate>),
    TIME(Option<DayTime>),
    DATETIME(Option<Timestamp>),
}

impl Field {
    // Reads one column descriptor: an array of the datatype id and its
    // type-dependent parameters.
    pub(crate) fn parse_meta<R: std::io::Read>(buffin: &mut BufferIn<R>) -> RsqlResult<Self> {
        let size = buffin.read_array_header()?;
        let type_id = TypeId::try_new(buffin.read_u64()?)?;

        let check_size = |expected: usize| {
            if size == expected {
                Ok(())
            } else {
                Err(RsqlError::Protocol(format!(
                    "bad descriptor for {type_id:?}: array size {size}"
                )))
            }
        };

        match type_id {
            TypeId::VOID => {
                check_size(1)?;
                Ok(Field::VOID)
            }
            TypeId::BOOLEAN => {
                check_size(1)?;
                Ok(Field::BOOLEAN(None))
            }
            TypeId::VARBINARY => {
                check_size(2)?;
                Ok(Field::VARBINARY {
                    precision: buffin.read_u32()?,
                    value: None,
                })
            }
            TypeId::VARCHAR => {
                check_size(3)?;
                Ok(Field::VARCHAR {
                    precision: buffin.read_u32()?,
                    fixlen: buffin.read_bool()?,
                    value: None,
                })
            }
            TypeId::BIT => {
                check_size(1)?;
                Ok(Field::BIT(None))
            }
            TypeId::TINYINT => {
                check_size(1)?;
                Ok(Field::TINYINT(None))
            }
            TypeId::SMALLINT => {
                check_size(1)?;
                Ok(Field::SMALLINT(None))
            }
            TypeId::INT => {
                check_size(1)?;
                Ok(Field::INT(None))
            }
            TypeId::BIGINT => {
                check_size(1)?;
                Ok(Field::BIGINT(None))
            }
            TypeId::MONEY => {
                check_size(3)?;
                Ok(Field::MONEY {
                    precision: buffin.read_u32()?,
                    scale: buffin.read_u32()?,
                    value: None,
                })
            }
            TypeId::NUMERIC => {
                check_size(3)?;
                Ok(Field::NUMERIC {
                    precision: buffin.read_u32()?,
                    scale: buffin.read_u32()?,
                    value: None,
                })
            }
            TypeId::FLOAT => {
                check_size(1)?;
                Ok(Field::FLOAT(None))
            }
            TypeId::DATE => {
                check_size(1)?;
                Ok(Field::DATE(None))
            }
            TypeId::TIME => {
                check_size(1)?;
                Ok(Field::TIME(None))
            }
            TypeId::DATETIME => {
                check_size(1)?;
                Ok(Field::DATETIME(None))
            }
        }
    }

    // Reads the value of this column for the current row. A nil on the wire
    // means NULL for every type.
    pub(crate) fn read_value<R: std::io::Read>(
        &mut self,
        buffin: &mut BufferIn<R>,
    ) -> RsqlResult<()> {
        if buffin.peek_type()? == MsgpType::Nil {
            buffin.read_nil()?;
            self.set_null();
            return Ok(());
        }

        match self {
            Field::VOID => Err(RsqlError::Protocol(
                "received a non-null value for a VOID column".to_string(),
            )),
            Field::BOOLEAN(value) => {
                *value = Some(buffin.read_bool()?);
                Ok(())
            }
            Field::VARBINARY { value, .. } => {
                *value = Some(buffin.read_bytes()?);
                Ok(())
            }
            Field::VARCHAR {
                precision,
                fixlen,
                value,
            } => {
                let mut s = buffin.read_string()?;
                if *fixlen {
                    // blank-pad CHAR values to their declared length
                    let char_count = u32::try_from(s.chars().count()).unwrap_or(u32::MAX);
                    for _ in char_count..*precision {
                        s.push(' ');
                    }
                }
                *value = Some(s);
                Ok(())
            }
            Field::BIT(value) => {
                *value = Some(buffin.read_u8()? != 0);
                Ok(())
            }
            Field::TINYINT(value) => {
                *value = Some(buffin.read_u8()?);
                Ok(())
            }
            Field::SMALLINT(value) => {
                *value = Some(buffin.read_i16()?);
                Ok(())
            }
            Field::INT(value) => {
                *value = Some(buffin.read_i32()?);
                Ok(())
            }
            Field::BIGINT(value) => {
                *value = Some(buffin.read_i64()?);
                Ok(())
            }
            Field::MONEY { value, .. } | Field::NUMERIC { value, .. } => {
                let valstr = buffin.read_string()?;
                *value = Some(BigDecimal::from_str(&valstr).map_err(|e| {
                    RsqlError::Protocol(format!("received decimal value \"{valstr}\" is invalid: {e}"))
                })?);
                Ok(())
            }
            Field::FLOAT(value) => {
                *value = Some(buffin.read_f64()?);
                Ok(())
            }
            Field::DATE(value) => {
                *value = Some(DayDate::new(buffin.read_u32()?));
                Ok(())
            }
            Field::TIME(value) => {
                let size = buffin.read_array_header()?;
                if size != 2 {
                    return Err(RsqlError::Protocol(format!(
                        "reading a TIME value, but got an array of size {size}"
                    )));
                }
                let seconds = buffin.read_u32()?;
                let nanos = buffin.read_u32()?;
                *value = Some(DayTime::new(seconds, nanos));
                Ok(())
            }
            Field::DATETIME(value) => {
                let size = buffin.read_array_header()?;
                if size != 3 {
                    return Err(RsqlError::Protocol(format!(
                        "reading a DATETIME value, but got an array of size {size}"
                    )));
                }
                let days = buffin.read_u32()?;
                let seconds = buffin.read_u32()?;
                let nanos = buffin.read_u32()?;
                *value = Some(Timestamp::new(days, seconds, nanos));
                Ok(())
            }
        }
    }

    fn set_null(&mut self) {
        match self {
            Field::VOID => {}
            Field::BOOLEAN(value) | Field::BIT(value) => *value = None,
            Field::VARBINARY { value, .. } => *value = None,
            Field::VARCHAR { value, .. } => *value = None,
            Field::TINYINT(value) => *value = None,
            Field::SMALLINT(value) => *value = None,
            Field::INT(value) => *value = None,
            Field::BIGINT(value) => *value = None,
            Field::MONEY { value, .. } | Field::NUMERIC { value, .. } => *value = None,
            Field::FLOAT(value) => *value = None,
            Field::DATE(value) => *value = None,
            Field::TIME(value) => *value = None,
            Field::DATETIME(value) => *value = None,
        }
    }

    pub(crate) fn is_null(&self) -> bool {
        match self {
            Field::VOID => true,
            Field::BOOLEAN(value) | Field::BIT(value) => value.is_none(),
            Field::VARBINARY { value, .. } => value.is_none(),
            Field::VARCHAR { value, .. } => value.is_none(),
            Field::TINYINT(value) => value.is_none(),
            Field::SMALLINT(value) => value.is_none(),
            Field::INT(value) => value.is_none(),
            Field::BIGINT(value) => value.is_none(),
            Field::MONEY { value, .. } | Field::NUMERIC { value, .. } => value.is_none(),
            Field::FLOAT(value) => value.is_none(),
            Field::DATE(value) => value.is_none(),
            Field::TIME(value) => value.is_none(),
            Field::DATETIME(value) => value.is_none(),
        }
    }

    pub(crate) fn type_id(&self) -> TypeId {
        match self {
            Field::VOID => TypeId::VOID,
            Field::BOOLEAN(_) => TypeId::BOOLEAN,
            Field::VARBINARY { .. } => TypeId::VARBINARY,
            Field::VARCHAR { .. } => TypeId::VARCHAR,
            Field::BIT(_) => TypeId::BIT,
            Field::TINYINT(_) => TypeId::TINYINT,
            Field::SMALLINT(_) => TypeId::SMALLINT,
            Field::INT(_) => TypeId::INT,
            Field::BIGINT(_) => TypeId::BIGINT,
            Field::MONEY { .. } => TypeId::MONEY,
            Field::NUMERIC { .. } => TypeId::NUMERIC,
            Field::FLOAT(_) => TypeId::FLOAT,
            Field::DATE(_) => TypeId::DATE,
            Field::TIME(_) => TypeId::TIME,
            Field::DATETIME(_) => TypeId::DATETIME,
        }
    }

    /// The current value, with NUMERIC values rescaled to at most 28 digits.
    pub(crate) fn value(&self) -> RsqlResult<RsqlValue> {
        if let Field::NUMERIC {
            value: Some(bd), ..
        } = self
        {
            return Ok(RsqlValue::DECIMAL(decimal::to_decimal28(bd)?));
        }
        Ok(self.precise_value())
    }

    /// The current value exactly as received, without rescaling.
    pub(crate) fn precise_value(&self) -> RsqlValue {
        match self {
            Field::VOID => RsqlValue::NULL,
            Field::BOOLEAN(value) | Field::BIT(value) => {
                value.map_or(RsqlValue::NULL, RsqlValue::BOOLEAN)
            }
            Field::VARBINARY { value, .. } => value
                .as_ref()
                .map_or(RsqlValue::NULL, |v| RsqlValue::BINARY(v.clone())),
            Field::VARCHAR { value, .. } => value
                .as_ref()
                .map_or(RsqlValue::NULL, |v| RsqlValue::STRING(v.clone())),
            Field::TINYINT(value) => value.map_or(RsqlValue::NULL, RsqlValue::TINYINT),
            Field::SMALLINT(value) => value.map_or(RsqlValue::NULL, RsqlValue::SMALLINT),
            Field::INT(value) => value.map_or(RsqlValue::NULL, RsqlValue::INT),
            Field::BIGINT(value) => value.map_or(RsqlValue::NULL, RsqlValue::BIGINT),
            Field::MONEY { value, .. } | Field::NUMERIC { value, .. } => value
                .as_ref()
                .map_or(RsqlValue::NULL, |v| RsqlValue::DECIMAL(v.clone())),
            Field::FLOAT(value) => value.map_or(RsqlValue::NULL, RsqlValue::DOUBLE),
            Field::DATE(value) => value.map_or(RsqlValue::NULL, RsqlValue::DAYDATE),
            Field::TIME(value) => value.map_or(RsqlValue::NULL, RsqlValue::DAYTIME),
            Field::DATETIME(value) => value.map_or(RsqlValue::NULL, RsqlValue::TIMESTAMP),
        }
    }
}

// Reads the column descriptors of a new rowset.
pub(crate) fn parse_row<R: std::io::Read>(buffin: &mut BufferIn<R>) -> RsqlResult<Vec<Field>> {
    let count = buffin.read_array_header()?;
    let mut row = Vec::with_capacity(count);
    for _ in 0..count {
        row.push(Field::parse_meta(buffin)?);
    }
    Ok(row)
}

// Reads the values of one data row into the fields of the rowset.
pub(crate) fn fill_row<R: std::io::Read>(
    buffin: &mut BufferIn<R>,
    row: &mut [Field],
) -> RsqlResult<()> {
    let count = buffin.read_array_header()?;
    if count != row.len() {
        return Err(RsqlError::Protocol(format!(
            "number of values received ({count}) differs from column count ({})",
            row.len()
        )));
    }
    for field in row {
        field.read_value(buffin)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{fill_row, parse_row, Field};
    use crate::{
        protocol::msgp::{BufferIn, BufferOut},
        protocol::parts::{RsqlValue, TypeId},
        RsqlError,
    };
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn buffin(buffout: &BufferOut) -> BufferIn<&[u8]> {
        BufferIn::new(buffout.as_bytes())
    }

    fn int_descriptor(buffout: &mut BufferOut) {
        buffout.append_array_header(1);
        buffout.append_u64(12);
    }

    #[test]
    fn descriptor_parsing() {
        let mut buffout = BufferOut::new();
        // VARCHAR(10), blank-padded
        buffout.append_array_header(3);
        buffout.append_u64(6);
        buffout.append_u64(10);
        buffout.append_bool(true);
        // NUMERIC(12, 4)
        buffout.append_array_header(3);
        buffout.append_u64(16);
        buffout.append_u64(12);
        buffout.append_u64(4);

        let mut buffin = buffin(&buffout);
        let field = Field::parse_meta(&mut buffin).unwrap();
        assert!(matches!(
            field,
            Field::VARCHAR {
                precision: 10,
                fixlen: true,
                value: None
            }
        ));
        assert_eq!(field.type_id(), TypeId::VARCHAR);
        assert!(field.is_null());

        let field = Field::parse_meta(&mut buffin).unwrap();
        assert!(matches!(
            field,
            Field::NUMERIC {
                precision: 12,
                scale: 4,
                value: None
            }
        ));
    }

    #[test]
    fn descriptor_with_wrong_size_is_rejected() {
        let mut buffout = BufferOut::new();
        // INT must come alone in its descriptor array
        buffout.append_array_header(2);
        buffout.append_u64(12);
        buffout.append_u64(0);
        let mut buffin = buffin(&buffout);
        assert!(matches!(
            Field::parse_meta(&mut buffin),
            Err(RsqlError::Protocol(_))
        ));
    }

    #[test]
    fn fixed_length_varchar_is_blank_padded() {
        let mut field = Field::VARCHAR {
            precision: 5,
            fixlen: true,
            value: None,
        };
        let mut buffout = BufferOut::new();
        buffout.append_string("ab");
        field.read_value(&mut buffin(&buffout)).unwrap();
        assert_eq!(field.value().unwrap(), RsqlValue::STRING("ab   ".to_string()));

        // without the fixlen flag the value stays as received
        let mut field = Field::VARCHAR {
            precision: 5,
            fixlen: false,
            value: None,
        };
        field.read_value(&mut buffin(&buffout)).unwrap();
        assert_eq!(field.value().unwrap(), RsqlValue::STRING("ab".to_string()));
    }

    #[test]
    fn bit_accepts_any_nonzero_byte() {
        for (byte, expected) in [(0_u64, false), (1, true), (5, true)] {
            let mut field = Field::BIT(None);
            let mut buffout = BufferOut::new();
            buffout.append_u64(byte);
            field.read_value(&mut buffin(&buffout)).unwrap();
            assert_eq!(field.value().unwrap(), RsqlValue::BOOLEAN(expected));
        }
    }

    #[test]
    fn nil_sets_any_field_to_null() {
        let mut field = Field::INT(Some(42));
        let mut buffout = BufferOut::new();
        buffout.append_nil();
        field.read_value(&mut buffin(&buffout)).unwrap();
        assert!(field.is_null());
        assert_eq!(field.value().unwrap(), RsqlValue::NULL);
    }

    #[test]
    fn numeric_value_is_rescaled_to_28_digits() {
        let field = Field::NUMERIC {
            precision: 30,
            scale: 10,
            value: Some(BigDecimal::from_str("12345678901234567890.1234567890").unwrap()),
        };
        match field.value().unwrap() {
            RsqlValue::DECIMAL(bd) => {
                assert_eq!(bd, BigDecimal::from_str("12345678901234567890.1234568").unwrap());
            }
            other => panic!("unexpected value {other:?}"),
        }
        // precise_value returns the full precision
        match field.precise_value() {
            RsqlValue::DECIMAL(bd) => {
                assert_eq!(
                    bd,
                    BigDecimal::from_str("12345678901234567890.1234567890").unwrap()
                );
            }
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn time_value_must_be_a_pair() {
        let mut field = Field::TIME(None);
        let mut buffout = BufferOut::new();
        buffout.append_array_header(3);
        buffout.append_u64(1);
        buffout.append_u64(2);
        buffout.append_u64(3);
        assert!(matches!(
            field.read_value(&mut buffin(&buffout)),
            Err(RsqlError::Protocol(_))
        ));
    }

    #[test]
    fn row_value_count_must_match_layout() {
        let mut buffout = BufferOut::new();
        buffout.append_array_header(2);
        int_descriptor(&mut buffout);
        int_descriptor(&mut buffout);
        let mut row = parse_row(&mut buffin(&buffout)).unwrap();
        assert_eq!(row.len(), 2);

        let mut buffout = BufferOut::new();
        buffout.append_array_header(1);
        buffout.append_i64(7);
        assert!(matches!(
            fill_row(&mut buffin(&buffout), &mut row),
            Err(RsqlError::Protocol(_))
        ));

        let mut buffout = BufferOut::new();
        buffout.append_array_header(2);
        buffout.append_i64(7);
        buffout.append_i64(-8);
        fill_row(&mut buffin(&buffout), &mut row).unwrap();
        assert_eq!(row[0].value().unwrap(), RsqlValue::INT(7));
        assert_eq!(row[1].value().unwrap(), RsqlValue::INT(-8));
    }
}
