//! Validating and writing repeat rules against a repository.

use chrono::TimeZone;
use things_model::{RepeatTarget, TaskKind, TaskStatus};
use tracing::debug;

use super::{build_update, RepeatSpec};
use crate::error::{StoreError, StoreResult};
use crate::repository::TaskRepository;
use crate::Result;

/// The row a repeat change is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub id: String,
    /// True when `id` is the repeating template of the requested row.
    pub used_template: bool,
}

/// What to do with a target's recurrence columns.
#[derive(Debug, Clone)]
pub enum RepeatAction<Tz: TimeZone> {
    Set(RepeatSpec<Tz>),
    Clear,
}

/// Finds the row that owns the schedule of `id` and checks it can carry one.
///
/// Generated instances of a repeating item point at their template; the
/// template is returned in their place.
pub fn resolve_repeat_target<R>(repo: &R, id: &str, expected: TaskKind) -> StoreResult<ResolvedTarget>
where
    R: TaskRepository + ?Sized,
{
    let id = id.trim();
    if id.is_empty() {
        return Err(StoreError::IdRequired);
    }

    let mut target = repo.repeat_target(id)?;
    let mut used_template = false;
    if let Some(template_id) = target.repeating_template_id.clone().filter(|t| !t.is_empty()) {
        debug!(instance = id, template = %template_id, "using repeating template");
        target = repo.repeat_target(&template_id)?;
        used_template = true;
    }

    validate(&target, expected)?;
    Ok(ResolvedTarget {
        id: target.uuid,
        used_template,
    })
}

fn validate(target: &RepeatTarget, expected: TaskKind) -> StoreResult<()> {
    let invalid = |reason| StoreError::InvalidRepeatTarget {
        id: target.uuid.clone(),
        reason,
    };
    if target.kind != Some(expected) {
        return Err(invalid("item type mismatch for repeat update"));
    }
    if target.trashed {
        return Err(invalid("cannot update repeating rules for trashed items"));
    }
    if target.status != Some(TaskStatus::Incomplete) {
        return Err(invalid("repeating rules require an incomplete item"));
    }
    Ok(())
}

/// Resolves the target of `id` and sets or clears its repeat rule.
///
/// A rule is fully built before anything is written, so a bad spec leaves the
/// database untouched.
pub fn apply_repeat<R, Tz>(
    repo: &R,
    id: &str,
    expected: TaskKind,
    action: &RepeatAction<Tz>,
) -> Result<ResolvedTarget>
where
    R: TaskRepository + ?Sized,
    Tz: TimeZone,
{
    let update = match action {
        RepeatAction::Set(spec) => Some(build_update(spec)?),
        RepeatAction::Clear => None,
    };

    let target = resolve_repeat_target(repo, id, expected)?;
    match update {
        Some(update) => {
            debug!(id = %target.id, bytes = update.recurrence_rule.len(), "writing repeat rule");
            repo.apply_repeat_rule(&target.id, &update)?;
        }
        None => {
            debug!(id = %target.id, "clearing repeat rule");
            repo.clear_repeat_rule(&target.id)?;
        }
    }
    Ok(target)
}
