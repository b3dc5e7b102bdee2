//! Repeat command implementation.
//!
//! Sets or clears the recurrence rule of a to-do or project. The target is
//! given by ID, or by the title of an item that is still being created, in
//! which case the database is polled until it shows up.

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use things_db::filter::parse_date_or_time;
use things_db::repeat::{resolve_repeat_target, ResolvedTarget};
use things_db::wait::DEFAULT_POLL_INTERVAL_MS;
use things_db::{
    apply_repeat, build_update, wait_for_created, RepeatAction, RepeatMode, RepeatSpec,
    RepeatUnit, SqliteStore, StoreError, SystemClock, WaitPolicy,
};
use tracing::debug;

use super::{CommandContext, Result};
use crate::cli::RepeatArgs;
use crate::output::{format_repeat_json, format_repeat_text, RuleOutput};

/// Executes the repeat command.
///
/// The rule is built before the database is opened, so an invalid schedule
/// fails without touching anything. `--dry-run` opens the database read-only
/// and only resolves the target.
///
/// # Errors
///
/// Returns an error for an invalid schedule, an unknown or unsuitable target,
/// a wait that times out or matches several items, or a failed write.
pub fn execute(ctx: &CommandContext, args: &RepeatArgs) -> Result<()> {
    let action = build_action(args, &Local, Local::now())?;
    let rule = match &action {
        RepeatAction::Set(spec) => Some(RuleOutput::new(
            spec.mode,
            spec.every,
            spec.unit.label(),
            &build_update(spec)?,
        )),
        RepeatAction::Clear => None,
    };

    let store = if args.dry_run {
        ctx.open_store()?
    } else {
        ctx.open_store_writable()?
    };
    let id = target_id(ctx, &store, args)?;
    let expected = args.expected_kind();

    let target: ResolvedTarget = if args.dry_run {
        resolve_repeat_target(&store, &id, expected)?
    } else {
        apply_repeat(&store, &id, expected, &action)?
    };
    debug!(id = %target.id, used_template = target.used_template, dry_run = args.dry_run, "repeat done");

    if ctx.json_output {
        println!("{}", format_repeat_json(&target, rule, args.dry_run)?);
    } else if !ctx.quiet {
        print!(
            "{}",
            format_repeat_text(&target, rule.as_ref(), args.dry_run, ctx.use_colors)
        );
    }

    Ok(())
}

/// The ID given on the command line, or the one found by waiting on `--title`.
fn target_id(ctx: &CommandContext, store: &SqliteStore, args: &RepeatArgs) -> Result<String> {
    if let Some(id) = &args.id {
        return Ok(id.clone());
    }
    let Some(title) = &args.title else {
        return Err(StoreError::IdRequired.into());
    };

    let policy = WaitPolicy {
        interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        timeout: Duration::from_secs(args.timeout),
    };
    if ctx.verbose {
        eprintln!("Waiting up to {}s for \"{}\"...", args.timeout, title);
    }
    Ok(wait_for_created(
        store,
        &SystemClock,
        &policy,
        title,
        args.expected_kind(),
        args.since,
    )?)
}

/// Turns the schedule flags into a repeat action.
///
/// Dates are read in `tz`; without `--start` the schedule is anchored on `now`.
pub fn build_action<Tz: TimeZone>(
    args: &RepeatArgs,
    tz: &Tz,
    now: DateTime<Tz>,
) -> Result<RepeatAction<Tz>> {
    if args.clear {
        return Ok(RepeatAction::Clear);
    }

    let mode = RepeatMode::parse(args.mode.as_deref().unwrap_or(""))?;
    let unit = RepeatUnit::parse(args.unit.as_deref().unwrap_or(""))?;
    let anchor = match &args.start {
        Some(start) => parse_day(start, tz)?,
        None => now,
    };

    let mut spec = RepeatSpec::anchored(mode, unit, args.every, anchor);
    if let Some(until) = &args.until {
        spec = spec.with_end(parse_day(until, tz)?);
    }
    if let Some(days) = args.deadline_offset {
        spec = spec.with_deadline_offset(days);
    }
    Ok(RepeatAction::Set(spec))
}

fn parse_day<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    Ok(parse_date_or_time(value, tz)?.instant.with_timezone(tz))
}
