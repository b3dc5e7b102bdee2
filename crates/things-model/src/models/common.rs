//! Date and timestamp representations used by the Things database.
//!
//! Things stores two kinds of temporal values:
//!
//! - calendar-only dates (start date, deadline, recurrence bookkeeping) as a
//!   packed integer, see [`ThingsDate`];
//! - instants (creation, modification, stop dates) as seconds since the Unix
//!   epoch in a `REAL` column.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Year used by Things as an "open ended" sentinel for end dates and deadlines.
pub const FAR_FUTURE_YEAR: i32 = 4001;

/// A calendar-only date packed the way Things stores it.
///
/// The packed layout is `year << 16 | month << 12 | day << 7`. The packing is
/// monotonic with calendar order, so packed values can be compared directly
/// (the database does exactly that for deadline and start date bounds).
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use things_model::models::ThingsDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
/// let packed = ThingsDate::from_naive(date);
/// assert_eq!(packed.raw(), 2025 << 16 | 1 << 12 | 2 << 7);
/// assert_eq!(packed.to_naive(), Some(date));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThingsDate(i64);

impl ThingsDate {
    /// Wraps a raw packed value read from the database.
    pub const fn from_raw(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw packed value as stored in the database.
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Packs a calendar date.
    pub fn from_naive(date: NaiveDate) -> Self {
        let year = i64::from(date.year());
        let month = i64::from(date.month());
        let day = i64::from(date.day());
        Self(year << 16 | month << 12 | day << 7)
    }

    /// Unpacks into a calendar date, or `None` if the value does not encode a
    /// valid date.
    pub fn to_naive(self) -> Option<NaiveDate> {
        let year = i32::try_from(self.0 >> 16).ok()?;
        let month = ((self.0 >> 12) & 0xF) as u32;
        let day = ((self.0 >> 7) & 0x1F) as u32;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// The 4001-01-01 sentinel Things uses for "no fixed deadline".
    pub fn far_future() -> Self {
        Self(i64::from(FAR_FUTURE_YEAR) << 16 | 1 << 12 | 1 << 7)
    }
}

impl From<NaiveDate> for ThingsDate {
    fn from(date: NaiveDate) -> Self {
        Self::from_naive(date)
    }
}

impl fmt::Display for ThingsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive() {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Converts a `REAL` epoch-seconds column into a UTC timestamp.
///
/// Fractional seconds are kept with nanosecond precision. Returns `None` for
/// values chrono cannot represent.
pub fn timestamp_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1_000_000_000.0).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}

/// Converts a timestamp back into epoch seconds as stored by Things.
pub fn datetime_to_timestamp(value: &DateTime<Utc>) -> f64 {
    value.timestamp() as f64 + f64::from(value.timestamp_subsec_nanos()) / 1_000_000_000.0
}
