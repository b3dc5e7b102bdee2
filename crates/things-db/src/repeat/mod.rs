//! Recurrence rule engine.
//!
//! A [`RepeatSpec`] describes a schedule the way a user states it ("every 2
//! weeks, on a fixed schedule, starting Tuesday"). [`build_update`] turns it
//! into the [`RepeatUpdate`] that is written to the task's recurrence
//! columns, and [`apply_repeat`] validates the target and performs the write.

mod error;
mod schedule;
mod target;

pub use error::{RepeatError, RepeatResult};
pub use schedule::{add_months, next_schedule_date};
pub use target::{apply_repeat, resolve_repeat_target, RepeatAction, ResolvedTarget};

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveTime, TimeZone};
use things_model::recurrence::RULE_VERSION;
use things_model::{RecurrenceRule, RepeatUpdate, RuleOffset, ThingsDate, FAR_FUTURE_YEAR};

use crate::filter::resolve_local;

/// When the next instance of a repeating item is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatMode {
    /// On a fixed calendar grid.
    Schedule,
    /// A fixed interval after the previous instance is completed.
    AfterCompletion,
}

impl RepeatMode {
    /// Parses a mode word. The empty string means after completion.
    pub fn parse(value: &str) -> RepeatResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "after-completion" | "after" | "completion" | "complete" => {
                Ok(RepeatMode::AfterCompletion)
            }
            "schedule" | "scheduled" | "fixed" | "fixed-schedule" => Ok(RepeatMode::Schedule),
            _ => Err(RepeatError::InvalidMode(value.to_string())),
        }
    }

    /// The `tp` value of the rule.
    pub const fn code(self) -> i64 {
        match self {
            RepeatMode::Schedule => 0,
            RepeatMode::AfterCompletion => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RepeatMode::Schedule => "schedule",
            RepeatMode::AfterCompletion => "after-completion",
        }
    }
}

/// Calendar unit of a repeat interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatUnit {
    Day,
    Week,
    Month,
    Year,
}

impl RepeatUnit {
    /// Parses a unit word such as `week`, `weekly` or `w`.
    pub fn parse(value: &str) -> RepeatResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "day" | "daily" | "d" => Ok(RepeatUnit::Day),
            "week" | "weekly" | "w" => Ok(RepeatUnit::Week),
            "month" | "monthly" | "m" => Ok(RepeatUnit::Month),
            "year" | "yearly" | "y" => Ok(RepeatUnit::Year),
            _ => Err(RepeatError::InvalidUnit(value.to_string())),
        }
    }

    /// The `fu` value of the rule.
    pub const fn code(self) -> i64 {
        match self {
            RepeatUnit::Day => 16,
            RepeatUnit::Week => 256,
            RepeatUnit::Month => 8,
            RepeatUnit::Year => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RepeatUnit::Day => "day",
            RepeatUnit::Week => "week",
            RepeatUnit::Month => "month",
            RepeatUnit::Year => "year",
        }
    }

    /// The offset entry locating `anchor` inside its period.
    fn offset(self, anchor: NaiveDate) -> RuleOffset {
        match self {
            RepeatUnit::Day => RuleOffset::day(0),
            RepeatUnit::Week => {
                RuleOffset::weekday(i64::from(anchor.weekday().num_days_from_sunday()))
            }
            RepeatUnit::Month => RuleOffset::day(i64::from(anchor.day0())),
            RepeatUnit::Year => {
                RuleOffset::day_of_month(i64::from(anchor.day0()), i64::from(anchor.month0()))
            }
        }
    }
}

/// A user-level description of a repeating schedule.
#[derive(Debug, Clone)]
pub struct RepeatSpec<Tz: TimeZone = Local> {
    pub mode: RepeatMode,
    pub unit: RepeatUnit,
    /// Interval in units; must be at least 1.
    pub every: i64,
    /// First occurrence. Only the calendar date in its zone is used.
    pub anchor: DateTime<Tz>,
    /// Last possible occurrence.
    pub end: Option<DateTime<Tz>>,
    /// Days before each occurrence the deadline falls on.
    pub deadline_offset: Option<i64>,
}

impl RepeatSpec<Local> {
    /// A spec anchored on the current local time.
    pub fn new(mode: RepeatMode, unit: RepeatUnit, every: i64) -> Self {
        Self::anchored(mode, unit, every, Local::now())
    }
}

impl<Tz: TimeZone> RepeatSpec<Tz> {
    /// A spec anchored on `anchor`.
    pub fn anchored(mode: RepeatMode, unit: RepeatUnit, every: i64, anchor: DateTime<Tz>) -> Self {
        Self {
            mode,
            unit,
            every,
            anchor,
            end: None,
            deadline_offset: None,
        }
    }

    pub fn with_end(mut self, end: DateTime<Tz>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_deadline_offset(mut self, days: i64) -> Self {
        self.deadline_offset = Some(days);
        self
    }
}

/// Builds the column values for a repeat rule.
///
/// # Errors
///
/// Fails for an interval below 1, an end date before the anchor, a negative
/// deadline offset, or when the rule cannot be encoded.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use things_db::repeat::{build_update, RepeatMode, RepeatSpec, RepeatUnit};
///
/// let anchor = Utc.with_ymd_and_hms(2026, 1, 6, 9, 30, 0).unwrap();
/// let spec = RepeatSpec::anchored(RepeatMode::Schedule, RepeatUnit::Week, 2, anchor);
/// let update = build_update(&spec).unwrap();
///
/// assert_eq!(update.instance_creation_start_date.to_string(), "2026-01-07");
/// assert_eq!(update.next_instance_start_date.unwrap().to_string(), "2026-01-20");
/// assert_eq!(update.rule().unwrap().fu, 256);
/// ```
pub fn build_update<Tz: TimeZone>(spec: &RepeatSpec<Tz>) -> RepeatResult<RepeatUpdate> {
    if spec.every < 1 {
        return Err(RepeatError::InvalidInterval);
    }

    let tz = spec.anchor.timezone();
    let anchor = spec.anchor.date_naive();
    let end = spec.end.as_ref().map(|e| e.with_timezone(&tz).date_naive());
    if end.is_some_and(|end| end < anchor) {
        return Err(RepeatError::EndBeforeStart);
    }
    if spec.deadline_offset.is_some_and(|days| days < 0) {
        return Err(RepeatError::NegativeDeadlineOffset);
    }

    let anchor_epoch = midnight_epoch(&tz, anchor)?;
    let end_date = match end {
        Some(end) => end,
        None => NaiveDate::from_ymd_opt(FAR_FUTURE_YEAR, 1, 1).ok_or(RepeatError::DateOutOfRange)?,
    };

    let rule = RecurrenceRule {
        ed: midnight_epoch(&tz, end_date)?,
        fa: spec.every,
        fu: spec.unit.code(),
        ia: anchor_epoch,
        of: vec![spec.unit.offset(anchor)],
        rc: 0,
        rrv: RULE_VERSION,
        sr: anchor_epoch,
        tp: spec.mode.code(),
        ts: spec.deadline_offset.map_or(0, |days| -days),
    };

    let start = anchor
        .checked_add_days(Days::new(1))
        .ok_or(RepeatError::DateOutOfRange)?;
    let next_instance_start_date = match spec.mode {
        RepeatMode::Schedule => Some(ThingsDate::from_naive(next_schedule_date(
            anchor,
            start,
            spec.unit,
            spec.every,
        )?)),
        RepeatMode::AfterCompletion => None,
    };
    let set_deadline = spec.deadline_offset.is_some();

    Ok(RepeatUpdate {
        recurrence_rule: rule.to_plist_bytes()?,
        instance_creation_start_date: ThingsDate::from_naive(start),
        instance_creation_paused: false,
        instance_creation_count: 0,
        after_completion_reference: None,
        next_instance_start_date,
        deadline: set_deadline.then(ThingsDate::far_future),
        set_deadline,
    })
}

/// Epoch seconds of local midnight on `date`.
fn midnight_epoch<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> RepeatResult<f64> {
    resolve_local(tz, date.and_time(NaiveTime::MIN))
        .map(|dt| dt.timestamp() as f64)
        .ok_or(RepeatError::DateOutOfRange)
}
