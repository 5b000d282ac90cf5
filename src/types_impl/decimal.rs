use crate::{RsqlError, RsqlResult};
use bigdecimal::{BigDecimal, RoundingMode};

const MAX_DIGITS: u64 = 28;

/// Rescales a decimal so that it has at most 28 significant digits.
///
/// Values with more digits are rounded half-up, giving up one extra digit
/// of scale because rounding can lengthen the integer part (9.99 -> 10.0).
/// Fails when the integer part alone already exceeds 28 digits.
pub(crate) fn to_decimal28(bd: &BigDecimal) -> RsqlResult<BigDecimal> {
    let digits = bd.digits();
    if digits <= MAX_DIGITS {
        return Ok(bd.clone());
    }

    let (_, scale) = bd.as_bigint_and_exponent();
    let excess = i64::try_from(digits - MAX_DIGITS).map_err(|_| value_error(bd))?;
    let new_scale = scale - excess - 1;
    if new_scale < 0 {
        return Err(value_error(bd));
    }

    Ok(bd.with_scale_round(new_scale, RoundingMode::HalfUp))
}

fn value_error(bd: &BigDecimal) -> RsqlError {
    RsqlError::ValueRange(format!(
        "cannot convert decimal value {bd} to a precision of 28"
    ))
}
