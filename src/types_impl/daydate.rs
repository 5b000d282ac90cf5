use crate::{RsqlError, RsqlResult};

// Julian day number of 0001-01-01 (proleptic Gregorian).
const JDN_DAY_ZERO: i32 = 1_721_426;

/// A calendar date, as transported for DATE columns.
///
/// The wire representation is the number of days since 0001-01-01.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct DayDate(u32);

impl DayDate {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Number of days since 0001-01-01.
    pub fn day_number(&self) -> u32 {
        self.0
    }

    /// The date as (year, month, day) in the proleptic Gregorian calendar.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn as_ymd(&self) -> (i64, u32, u32) {
        // days relative to 0000-03-01, so that leap days land at the end
        // of the shifted year
        let z = i64::from(self.0) + 306;
        let era = z / 146_097;
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = yoe + era * 400 + i64::from(month <= 2);
        (year, month as u32, day as u32)
    }

    /// Conversion into a [`time::Date`].
    ///
    /// Fails if the date lies outside the range supported by `time`.
    pub fn to_date(&self) -> RsqlResult<time::Date> {
        let jdn = i32::try_from(self.0)
            .ok()
            .and_then(|days| days.checked_add(JDN_DAY_ZERO))
            .ok_or_else(|| {
                RsqlError::ValueRange(format!("date value {} is out of range", self.0))
            })?;
        time::Date::from_julian_day(jdn)
            .map_err(|e| RsqlError::ValueRange(format!("date value {} is out of range: {e}", self.0)))
    }
}

impl std::fmt::Display for DayDate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (year, month, day) = self.as_ymd();
        write!(f, "{year:04}-{month:02}-{day:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::DayDate;

    #[test]
    fn day_zero_is_year_one() {
        let daydate = DayDate::new(0);
        assert_eq!(daydate.as_ymd(), (1, 1, 1));
        assert_eq!(daydate.to_string(), "0001-01-01");
    }

    #[test]
    fn known_dates() {
        // 2000-01-01 has julian day number 2451545
        let daydate = DayDate::new(730_119);
        assert_eq!(daydate.as_ymd(), (2000, 1, 1));
        assert_eq!(
            daydate.to_date().unwrap(),
            time::Date::from_julian_day(2_451_545).unwrap()
        );

        // day after a leap day
        let daydate = DayDate::new(730_179);
        assert_eq!(daydate.as_ymd(), (2000, 3, 1));
        assert_eq!(DayDate::new(730_178).as_ymd(), (2000, 2, 29));
    }

    #[test]
    fn far_future_date_is_rejected_by_time() {
        assert!(DayDate::new(4_000_000).to_date().is_err());
    }
}
