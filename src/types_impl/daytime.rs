use crate::{RsqlError, RsqlResult};

/// A time of day with nanosecond precision, as transported for TIME columns.
///
/// The wire representation is a pair of seconds since midnight and a
/// nanosecond remainder.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct DayTime {
    seconds: u32,
    nanos: u32,
}

impl DayTime {
    pub(crate) fn new(seconds: u32, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    /// Seconds since midnight.
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Nanoseconds within the current second.
    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// The time as (hour, minute, second).
    pub fn as_hms(&self) -> (u32, u32, u32) {
        (
            self.seconds / 3600,
            (self.seconds % 3600) / 60,
            self.seconds % 60,
        )
    }

    /// Conversion into a [`time::Time`].
    ///
    /// Fails if the value does not denote a valid time of day.
    pub fn to_time(&self) -> RsqlResult<time::Time> {
        let out_of_range = || {
            RsqlError::ValueRange(format!(
                "time value {}s + {}ns is out of range",
                self.seconds, self.nanos
            ))
        };
        let (hour, minute, second) = self.as_hms();
        let hour = u8::try_from(hour).map_err(|_| out_of_range())?;
        let minute = u8::try_from(minute).map_err(|_| out_of_range())?;
        let second = u8::try_from(second).map_err(|_| out_of_range())?;
        time::Time::from_hms_nano(hour, minute, second, self.nanos).map_err(|_| out_of_range())
    }
}

impl std::fmt::Display for DayTime {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (hour, minute, second) = self.as_hms();
        write!(f, "{hour:02}:{minute:02}:{second:02}")?;
        if self.nanos > 0 {
            write!(f, ".{:09}", self.nanos)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DayTime;

    #[test]
    fn hms_breakdown_and_display() {
        let daytime = DayTime::new(12 * 3600 + 34 * 60 + 56, 0);
        assert_eq!(daytime.as_hms(), (12, 34, 56));
        assert_eq!(daytime.to_string(), "12:34:56");

        let daytime = DayTime::new(7, 500_000_000);
        assert_eq!(daytime.to_string(), "00:00:07.500000000");
    }

    #[test]
    fn conversion_to_time() {
        let daytime = DayTime::new(23 * 3600 + 59 * 60 + 59, 999_999_999);
        assert_eq!(
            daytime.to_time().unwrap(),
            time::Time::from_hms_nano(23, 59, 59, 999_999_999).unwrap()
        );

        // more than 24 hours cannot be represented
        assert!(DayTime::new(24 * 3600, 0).to_time().is_err());
    }
}
