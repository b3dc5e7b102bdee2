//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the things CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use things_db::wait::DEFAULT_WAIT_TIMEOUT_SECS;
use things_db::ListView;
use things_model::TaskKind;

/// things - Query and schedule Things 3 tasks from the terminal
#[derive(Parser, Debug)]
#[command(name = "things")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the Things database (default: config file, then auto-discovery)
    #[arg(long, global = true, env = "THINGSDB", value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List to-dos, projects or headings
    #[command(alias = "ls")]
    Todos(TodosArgs),

    /// List inbox to-dos
    Inbox(TodosArgs),

    /// List to-dos for today, including overdue deadlines
    Today(TodosArgs),

    /// List to-dos scheduled after today
    Upcoming(TodosArgs),

    /// List anytime to-dos
    Anytime(TodosArgs),

    /// List someday to-dos
    Someday(TodosArgs),

    /// List to-dos with a deadline, soonest first
    Deadlines(TodosArgs),

    /// List completed and canceled to-dos, newest first
    Logbook(TodosArgs),

    /// List completed to-dos
    Completed(TodosArgs),

    /// List canceled to-dos
    Canceled(TodosArgs),

    /// List trashed to-dos
    Trash(TodosArgs),

    /// List repeating templates
    Repeating(TodosArgs),

    /// Set or clear the repeat rule of a to-do or project
    Repeat(RepeatArgs),

    /// View and manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

impl Commands {
    /// The sidebar list a listing command shows, with its flags.
    pub fn list_view(&self) -> Option<(ListView, &TodosArgs)> {
        let view = match self {
            Commands::Inbox(args) => (ListView::Inbox, args),
            Commands::Today(args) => (ListView::Today, args),
            Commands::Upcoming(args) => (ListView::Upcoming, args),
            Commands::Anytime(args) => (ListView::Anytime, args),
            Commands::Someday(args) => (ListView::Someday, args),
            Commands::Deadlines(args) => (ListView::Deadlines, args),
            Commands::Logbook(args) => (ListView::Logbook, args),
            Commands::Completed(args) => (ListView::Completed, args),
            Commands::Canceled(args) => (ListView::Canceled, args),
            Commands::Trash(args) => (ListView::Trash, args),
            Commands::Repeating(args) => (ListView::Repeating, args),
            Commands::Todos(_)
            | Commands::Repeat(_)
            | Commands::Config { .. }
            | Commands::Completions { .. } => return None,
        };
        Some(view)
    }
}

/// Arguments of the listing commands.
#[derive(Args, Debug, Default)]
pub struct TodosArgs {
    /// Status: incomplete, completed, canceled or any
    #[arg(short, long)]
    pub status: Option<String>,

    /// Any status, trashed items included
    #[arg(long)]
    pub all: bool,

    /// Include trashed items
    #[arg(long)]
    pub include_trashed: bool,

    /// Filter by project title or ID
    #[arg(short, long)]
    pub project: Option<String>,

    /// Filter by area title or ID
    #[arg(short, long)]
    pub area: Option<String>,

    /// Filter by tag title or ID
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Search title, notes and area
    #[arg(long)]
    pub search: Option<String>,

    /// Rich query, e.g. 'title:/^call/i AND NOT tag:waiting'
    #[arg(short = 'Q', long)]
    pub query: Option<String>,

    /// Created before a date or RFC 3339 time
    #[arg(long, value_name = "DATE")]
    pub created_before: Option<String>,

    /// Created on or after a date or RFC 3339 time
    #[arg(long, value_name = "DATE")]
    pub created_after: Option<String>,

    /// Modified before a date or RFC 3339 time
    #[arg(long, value_name = "DATE")]
    pub modified_before: Option<String>,

    /// Modified on or after a date or RFC 3339 time
    #[arg(long, value_name = "DATE")]
    pub modified_after: Option<String>,

    /// Deadline on or before YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub due_before: Option<String>,

    /// Start date on or before YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub start_before: Option<String>,

    /// Include repeating templates
    #[arg(long)]
    pub include_repeating: bool,

    /// Only repeating templates
    #[arg(long, conflicts_with = "include_repeating")]
    pub repeating_only: bool,

    /// Only items whose notes contain (true) or lack (false) a URL
    #[arg(long, value_name = "BOOL")]
    pub has_url: Option<bool>,

    /// Sort spec, e.g. '-deadline,title'
    #[arg(long)]
    pub sort: Option<String>,

    /// Maximum number of results
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Number of results to skip
    #[arg(long)]
    pub offset: Option<usize>,

    /// Item kinds to list (default: to-do)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub kind: Vec<KindArg>,

    /// Output format (default: config, then table)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Arguments of the `repeat` command.
#[derive(Args, Debug, Default)]
pub struct RepeatArgs {
    /// ID of the to-do or project
    #[arg(required_unless_present = "title", conflicts_with = "title")]
    pub id: Option<String>,

    /// Wait for a newly created item with this title instead of passing an ID
    #[arg(long)]
    pub title: Option<String>,

    /// Only consider items created at or after this epoch second
    #[arg(long, requires = "title", default_value_t = 0.0)]
    pub since: f64,

    /// Seconds to wait for the created item
    #[arg(long, requires = "title", default_value_t = DEFAULT_WAIT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Repeat interval
    #[arg(short, long, default_value_t = 1)]
    pub every: i64,

    /// Unit: day, week, month or year
    #[arg(short, long, required_unless_present = "clear")]
    pub unit: Option<String>,

    /// Mode: schedule or after-completion (default)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// First occurrence, YYYY-MM-DD (default: today)
    #[arg(long, value_name = "DATE")]
    pub start: Option<String>,

    /// Last possible occurrence, YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub until: Option<String>,

    /// Days before each occurrence the deadline falls on
    #[arg(long, value_name = "DAYS")]
    pub deadline_offset: Option<i64>,

    /// Remove the repeat rule
    #[arg(long, conflicts_with_all = ["unit", "mode", "start", "until", "deadline_offset"])]
    pub clear: bool,

    /// Show what would be written without touching the database
    #[arg(long)]
    pub dry_run: bool,

    /// The target is a project, not a to-do
    #[arg(long)]
    pub project: bool,
}

impl RepeatArgs {
    /// The kind of row the target must be.
    pub fn expected_kind(&self) -> TaskKind {
        if self.project {
            TaskKind::Project
        } else {
            TaskKind::Todo
        }
    }
}

/// Item kinds selectable with `--kind`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    #[value(alias = "to-do")]
    Todo,
    Project,
    Heading,
}

impl From<KindArg> for TaskKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Todo => TaskKind::Todo,
            KindArg::Project => TaskKind::Project,
            KindArg::Heading => TaskKind::Heading,
        }
    }
}

/// Output formats for listings
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parses a format name from the config file.
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print config file path
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key, e.g. output.format
        key: String,

        /// Configuration value
        value: String,
    },

    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_todos_alias_and_filters() {
        let cli = Cli::try_parse_from([
            "things",
            "ls",
            "--project",
            "Garden",
            "--has-url",
            "true",
            "--kind",
            "todo,project",
            "-n",
            "5",
            "--format",
            "csv",
        ])
        .unwrap();

        let Some(Commands::Todos(args)) = cli.command else {
            panic!("expected todos");
        };
        assert_eq!(args.project.as_deref(), Some("Garden"));
        assert_eq!(args.has_url, Some(true));
        assert_eq!(args.kind, vec![KindArg::Todo, KindArg::Project]);
        assert_eq!(args.limit, Some(5));
        assert_eq!(args.format, Some(OutputFormat::Csv));
    }

    #[test]
    fn test_repeating_flags_conflict() {
        let result =
            Cli::try_parse_from(["things", "todos", "--include-repeating", "--repeating-only"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_repeat_requires_unit_unless_clearing() {
        assert!(Cli::try_parse_from(["things", "repeat", "T-1"]).is_err());
        assert!(Cli::try_parse_from(["things", "repeat", "T-1", "--clear"]).is_ok());
        assert!(Cli::try_parse_from(["things", "repeat", "T-1", "--unit", "week"]).is_ok());
    }

    #[test]
    fn test_repeat_clear_conflicts_with_schedule_flags() {
        let result = Cli::try_parse_from(["things", "repeat", "T-1", "--clear", "--unit", "day"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_repeat_by_title_instead_of_id() {
        let cli = Cli::try_parse_from([
            "things", "repeat", "--title", "Water plants", "--since", "1700000000", "-u", "week",
        ])
        .unwrap();
        let Some(Commands::Repeat(args)) = cli.command else {
            panic!("expected repeat");
        };
        assert!(args.id.is_none());
        assert_eq!(args.title.as_deref(), Some("Water plants"));
        assert_eq!(args.since, 1_700_000_000.0);
        assert_eq!(args.expected_kind(), TaskKind::Todo);

        assert!(Cli::try_parse_from(["things", "repeat", "--clear"]).is_err());
    }

    #[test]
    fn test_view_commands_take_listing_flags() {
        let cli = Cli::try_parse_from(["things", "today", "--tag", "errand", "-n", "3"]).unwrap();
        let Some((view, args)) = cli.command.as_ref().and_then(Commands::list_view) else {
            panic!("expected a view command");
        };
        assert_eq!(view, ListView::Today);
        assert_eq!(args.tag.as_deref(), Some("errand"));
        assert_eq!(args.limit, Some(3));

        for view in ListView::ALL {
            let cli = Cli::try_parse_from(["things", view.name()]).unwrap();
            let parsed = cli.command.as_ref().and_then(Commands::list_view);
            assert_eq!(parsed.map(|(v, _)| v), Some(view));
        }

        let cli = Cli::try_parse_from(["things", "todos"]).unwrap();
        assert!(cli.command.as_ref().and_then(Commands::list_view).is_none());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["things", "-q", "-v", "todos"]).is_err());
    }

    #[test]
    fn test_output_format_from_config_name() {
        assert_eq!(OutputFormat::from_name("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("yaml"), None);
    }
}
