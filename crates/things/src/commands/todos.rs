//! Todos command implementation.
//!
//! Lists to-dos (and optionally projects or headings) straight from the Things
//! database, filtered by flags and an optional rich query. The sidebar
//! commands (`today`, `logbook`, ...) run the same listing inside a view.

use things_db::filter::DEFAULT_KINDS;
use things_db::{fetch_tasks, fetch_view, ListView, TaskQueryOptions};
use things_model::{Task, ThingsDate};
use tracing::debug;

use super::{CommandContext, Result};
use crate::cli::{OutputFormat, TodosArgs};
use crate::output::helpers::today;
use crate::output::{format_tasks_csv, format_tasks_json, format_tasks_table};

/// Executes the todos command.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, a reference does not
/// resolve, or a filter, sort or rich query is invalid.
pub fn execute(ctx: &CommandContext, args: &TodosArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let opts = build_options(args, ctx.default_limit);
    debug!(?opts, "listing tasks");

    let tasks = fetch_tasks(&store, &opts, false)?;
    print_tasks(ctx, args, &tasks)
}

/// Executes one of the sidebar list commands.
///
/// # Errors
///
/// Same as [`execute`].
pub fn execute_view(ctx: &CommandContext, view: ListView, args: &TodosArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let opts = build_options(args, ctx.default_limit);
    debug!(%view, ?opts, "listing view");

    let tasks = fetch_view(&store, view, &opts, ThingsDate::from_naive(today()))?;
    print_tasks(ctx, args, &tasks)
}

fn print_tasks(ctx: &CommandContext, args: &TodosArgs, tasks: &[Task]) -> Result<()> {
    match output_format(args.format, ctx.json_output, ctx.default_format) {
        OutputFormat::Json => println!("{}", format_tasks_json(tasks)?),
        OutputFormat::Csv => print!("{}", format_tasks_csv(tasks)),
        OutputFormat::Table if !ctx.quiet => {
            print!("{}", format_tasks_table(tasks, today(), ctx.use_colors));
        }
        OutputFormat::Table => {}
    }

    Ok(())
}

/// Maps command-line flags onto engine options.
///
/// `--limit` wins over the configured default; no kinds means to-dos only.
pub fn build_options(args: &TodosArgs, default_limit: Option<usize>) -> TaskQueryOptions {
    let kinds = if args.kind.is_empty() {
        DEFAULT_KINDS.to_vec()
    } else {
        args.kind.iter().map(|k| (*k).into()).collect()
    };

    TaskQueryOptions {
        status: args.status.clone(),
        include_trashed: args.include_trashed,
        all: args.all,
        project: args.project.clone(),
        area: args.area.clone(),
        tag: args.tag.clone(),
        search: args.search.clone(),
        query: args.query.clone(),
        limit: args.limit.or(default_limit),
        offset: args.offset,
        created_before: args.created_before.clone(),
        created_after: args.created_after.clone(),
        modified_before: args.modified_before.clone(),
        modified_after: args.modified_after.clone(),
        due_before: args.due_before.clone(),
        start_before: args.start_before.clone(),
        include_repeating: args.include_repeating,
        repeating_only: args.repeating_only,
        has_url: args.has_url,
        sort: args.sort.clone(),
        kinds,
    }
}

/// Picks the listing format: `--format`, then `--json`, then config, then table.
fn output_format(
    flag: Option<OutputFormat>,
    json: bool,
    configured: Option<OutputFormat>,
) -> OutputFormat {
    flag.or(json.then_some(OutputFormat::Json))
        .or(configured)
        .unwrap_or(OutputFormat::Table)
}
