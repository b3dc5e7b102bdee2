//! Parsing of date bounds given on the command line.
//!
//! Accepted forms, tried in order:
//!
//! 1. RFC 3339, with or without fractional seconds
//! 2. `YYYY-MM-DD HH:MM:SS` in the local zone
//! 3. `YYYY-MM-DD HH:MM` in the local zone
//! 4. `YYYY-MM-DD`, meaning local midnight
//!
//! A bare date used as an upper bound is moved to the following midnight so
//! that `--created-before 2025-01-02` includes everything on the 2nd.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use things_model::ThingsDate;

use super::error::{FilterError, FilterResult};

/// A parsed date bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBound {
    /// The instant the input names.
    pub instant: DateTime<Utc>,
    /// The calendar date of `instant` in the zone used for parsing.
    pub date: NaiveDate,
    /// True when the input had no time-of-day component.
    pub date_only: bool,
}

/// Parses a date or date-time string, resolving wall-clock forms in `tz`.
pub fn parse_date_or_time<Tz: TimeZone>(input: &str, tz: &Tz) -> FilterResult<DateBound> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FilterError::DateRequired);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        let instant = parsed.with_timezone(&Utc);
        return Ok(DateBound {
            instant,
            date: instant.with_timezone(tz).date_naive(),
            date_only: false,
        });
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            let instant =
                resolve_local(tz, naive).ok_or_else(|| FilterError::invalid_date(input))?;
            return Ok(DateBound {
                instant,
                date: naive.date(),
                date_only: false,
            });
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let instant = resolve_local(tz, date.and_time(NaiveTime::MIN))
            .ok_or_else(|| FilterError::invalid_date(input))?;
        return Ok(DateBound {
            instant,
            date,
            date_only: true,
        });
    }

    Err(FilterError::invalid_date(input))
}

/// Parses a creation/modification bound into epoch seconds.
///
/// With `is_before`, a bare date is advanced one day.
pub fn parse_timestamp_bound<Tz: TimeZone>(
    input: &str,
    is_before: bool,
    tz: &Tz,
) -> FilterResult<f64> {
    let bound = parse_date_or_time(input, tz)?;
    if bound.date_only && is_before {
        let next = bound
            .date
            .succ_opt()
            .and_then(|d| resolve_local(tz, d.and_time(NaiveTime::MIN)))
            .ok_or_else(|| FilterError::invalid_date(input))?;
        return Ok(next.timestamp() as f64);
    }
    Ok(bound.instant.timestamp() as f64)
}

/// Parses a deadline/start bound into a packed calendar date.
pub fn parse_things_date<Tz: TimeZone>(input: &str, tz: &Tz) -> FilterResult<ThingsDate> {
    let bound = parse_date_or_time(input, tz)?;
    Ok(ThingsDate::from_naive(bound.date))
}

/// Maps a wall-clock time in `tz` to an instant.
///
/// Ambiguous times take the earlier instant; times inside a DST gap are
/// pushed forward by an hour.
pub(crate) fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}
