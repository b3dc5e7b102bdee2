//! Calendar arithmetic for fixed-schedule recurrences.

use chrono::{Datelike, Days, NaiveDate};

use super::error::{RepeatError, RepeatResult};
use super::RepeatUnit;

/// Returns the first occurrence on or after `start` of a schedule anchored on
/// `anchor` that repeats every `every` units.
///
/// A `start` before the anchor is raised to the anchor. Month and year steps
/// are always taken from the anchor itself, clamping the day to the length
/// of the target month, so a schedule anchored on the 31st lands on the last
/// day of shorter months without drifting.
pub fn next_schedule_date(
    anchor: NaiveDate,
    start: NaiveDate,
    unit: RepeatUnit,
    every: i64,
) -> RepeatResult<NaiveDate> {
    if every <= 0 {
        return Err(RepeatError::InvalidInterval);
    }
    let start = start.max(anchor);

    match unit {
        RepeatUnit::Day => {
            let diff = (start - anchor).num_days();
            let steps = diff.div_euclid(every) + i64::from(diff.rem_euclid(every) != 0);
            add_days(anchor, in_range(steps.checked_mul(every))?)
        }
        RepeatUnit::Week => {
            let anchor_wd = i64::from(anchor.weekday().num_days_from_sunday());
            let start_wd = i64::from(start.weekday().num_days_from_sunday());
            let days_until = (anchor_wd - start_wd + 7) % 7;
            let mut candidate = add_days(start, days_until)?;
            let weeks = (candidate - anchor).num_days() / 7;
            let remainder = weeks % every;
            if remainder != 0 {
                let days = in_range((every - remainder).checked_mul(7))?;
                candidate = add_days(candidate, days)?;
            }
            Ok(candidate)
        }
        RepeatUnit::Month => {
            let diff = months_between(anchor, start);
            step_until(start, diff / every, |k| {
                add_months(anchor, in_range(k.checked_mul(every))?)
            })
        }
        RepeatUnit::Year => {
            let diff = i64::from(start.year() - anchor.year());
            step_until(start, diff / every, |k| {
                let months = k.checked_mul(every).and_then(|n| n.checked_mul(12));
                add_months(anchor, in_range(months)?)
            })
        }
    }
}

/// Tries step counts from `first` upward until the candidate reaches `start`.
fn step_until<F>(start: NaiveDate, first: i64, candidate_at: F) -> RepeatResult<NaiveDate>
where
    F: Fn(i64) -> RepeatResult<NaiveDate>,
{
    let mut k = first.max(0);
    loop {
        let candidate = candidate_at(k)?;
        if candidate >= start {
            return Ok(candidate);
        }
        k = in_range(k.checked_add(1))?;
    }
}

fn in_range(value: Option<i64>) -> RepeatResult<i64> {
    value.ok_or(RepeatError::DateOutOfRange)
}

fn add_days(date: NaiveDate, days: i64) -> RepeatResult<NaiveDate> {
    let days = u64::try_from(days).map_err(|_| RepeatError::DateOutOfRange)?;
    date.checked_add_days(Days::new(days))
        .ok_or(RepeatError::DateOutOfRange)
}

fn months_between(a: NaiveDate, b: NaiveDate) -> i64 {
    i64::from(b.year() - a.year()) * 12 + i64::from(b.month()) - i64::from(a.month())
}

/// Adds whole months, clamping the day to the last day of the target month.
pub fn add_months(date: NaiveDate, months: i64) -> RepeatResult<NaiveDate> {
    let total = in_range(
        (i64::from(date.year()) * 12 + i64::from(date.month0())).checked_add(months),
    )?;
    let year = i32::try_from(total.div_euclid(12)).map_err(|_| RepeatError::DateOutOfRange)?;
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day).ok_or(RepeatError::DateOutOfRange)
}

fn days_in_month(year: i32, month: u32) -> RepeatResult<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(RepeatError::DateOutOfRange)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(RepeatError::DateOutOfRange)?;
    Ok((next - first).num_days() as u32)
}
