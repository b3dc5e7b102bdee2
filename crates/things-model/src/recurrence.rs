//! Recurrence rule wire format.
//!
//! Things keeps the schedule of a repeating to-do or project in the
//! `rt1_recurrenceRule` column as a property list dictionary with short keys.
//! [`RecurrenceRule`] mirrors that dictionary field by field; the fields are
//! declared in key order so the serialized dictionary matches what the app
//! writes itself.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::models::ThingsDate;

/// Rule format revision written by current versions of Things.
pub const RULE_VERSION: i64 = 4;

/// One entry of the `of` array: which day inside the period an instance
/// lands on.
///
/// Only the keys relevant to the unit are present:
/// days use `dy = 0`, weeks use `wd` (Sunday = 0), months use `dy`
/// (zero-based day of month) and years use `dy` plus `mo` (zero-based month).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOffset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dy: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mo: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wd: Option<i64>,
}

impl RuleOffset {
    /// Offset for a specific day (`dy`).
    pub fn day(dy: i64) -> Self {
        Self {
            dy: Some(dy),
            ..Self::default()
        }
    }

    /// Offset for a weekday (`wd`).
    pub fn weekday(wd: i64) -> Self {
        Self {
            wd: Some(wd),
            ..Self::default()
        }
    }

    /// Offset for a day inside a month of the year (`dy` + `mo`).
    pub fn day_of_month(dy: i64, mo: i64) -> Self {
        Self {
            dy: Some(dy),
            mo: Some(mo),
            wd: None,
        }
    }
}

/// The recurrence rule dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    /// End date as epoch seconds (4001-01-01 when open ended).
    pub ed: f64,
    /// Interval ("every N units").
    pub fa: i64,
    /// Unit code.
    pub fu: i64,
    /// Anchor date as epoch seconds.
    pub ia: f64,
    /// Offsets inside the period.
    pub of: Vec<RuleOffset>,
    /// Repeat count, always 0.
    pub rc: i64,
    /// Rule format revision.
    pub rrv: i64,
    /// Start reference, equal to `ia`.
    pub sr: f64,
    /// Type: 0 for a fixed schedule, 1 for after completion.
    pub tp: i64,
    /// Negated deadline offset in days, or 0.
    pub ts: i64,
}

impl RecurrenceRule {
    /// Encodes the rule as an XML property list.
    pub fn to_plist_bytes(&self) -> ModelResult<Vec<u8>> {
        let mut buf = Vec::new();
        plist::to_writer_xml(&mut buf, self).map_err(ModelError::RuleEncode)?;
        Ok(buf)
    }

    /// Decodes a rule blob read from the database.
    ///
    /// Both the XML and the binary property list flavours are accepted.
    pub fn from_plist_bytes(bytes: &[u8]) -> ModelResult<Self> {
        plist::from_bytes(bytes).map_err(ModelError::RuleDecode)
    }
}

/// Values written to a task's recurrence columns.
///
/// A fresh update is built every time a rule is set; clearing a rule does not
/// go through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatUpdate {
    /// Encoded [`RecurrenceRule`].
    pub recurrence_rule: Vec<u8>,
    pub instance_creation_start_date: ThingsDate,
    pub instance_creation_paused: bool,
    pub instance_creation_count: i64,
    pub after_completion_reference: Option<ThingsDate>,
    /// Next generated instance, only set for fixed schedules.
    pub next_instance_start_date: Option<ThingsDate>,
    pub deadline: Option<ThingsDate>,
    /// Whether `deadline` should be written at all.
    pub set_deadline: bool,
}

impl RepeatUpdate {
    /// Decodes the rule carried by this update.
    pub fn rule(&self) -> ModelResult<RecurrenceRule> {
        RecurrenceRule::from_plist_bytes(&self.recurrence_rule)
    }
}
