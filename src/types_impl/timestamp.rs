use crate::{
    types::{DayDate, DayTime},
    RsqlResult,
};

/// A combined date and time of day, as transported for DATETIME columns.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct Timestamp {
    date: DayDate,
    time: DayTime,
}

impl Timestamp {
    pub(crate) fn new(days: u32, seconds: u32, nanos: u32) -> Self {
        Self {
            date: DayDate::new(days),
            time: DayTime::new(seconds, nanos),
        }
    }

    pub fn date(&self) -> DayDate {
        self.date
    }

    pub fn time(&self) -> DayTime {
        self.time
    }

    /// Conversion into a [`time::PrimitiveDateTime`].
    ///
    /// Fails if either part lies outside the range supported by `time`.
    pub fn to_primitive_date_time(&self) -> RsqlResult<time::PrimitiveDateTime> {
        Ok(time::PrimitiveDateTime::new(
            self.date.to_date()?,
            self.time.to_time()?,
        ))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}
