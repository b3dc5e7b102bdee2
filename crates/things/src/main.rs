use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{load_config, ConfigSetOptions};
use commands::{CommandContext, CommandError};
use things_db::{StoreError, WaitError};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                eprintln!("{error_json:#}");
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Sends logs to stderr: `--verbose` is debug, `--quiet` is error, warn
/// otherwise. `RUST_LOG` takes precedence when set.
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(cli)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_log_level(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    }
}

fn run(cli: &Cli) -> commands::Result<()> {
    // Config and completions still run with an unreadable config file.
    let config = match &cli.command {
        Some(Commands::Config { .. } | Commands::Completions { .. }) => {
            load_config().unwrap_or_default()
        }
        _ => load_config()?,
    };
    let ctx = CommandContext::new(cli, &config);

    if let Some((view, args)) = cli.command.as_ref().and_then(Commands::list_view) {
        return commands::todos::execute_view(&ctx, view, args);
    }

    match &cli.command {
        Some(Commands::Todos(args)) => commands::todos::execute(&ctx, args),
        Some(Commands::Repeat(args)) => commands::repeat::execute(&ctx, args),
        Some(Commands::Config { command }) => match command {
            None | Some(ConfigCommands::Show) => commands::config::execute_show(&ctx),
            Some(ConfigCommands::Path) => commands::config::execute_path(&ctx),
            Some(ConfigCommands::Init { force }) => commands::config::execute_init(&ctx, *force),
            Some(ConfigCommands::Set { key, value }) => commands::config::execute_set(
                &ctx,
                &ConfigSetOptions {
                    key: key.clone(),
                    value: value.clone(),
                },
            ),
        },
        Some(Commands::Completions { shell }) => Ok(commands::completions::execute(shell)?),
        None => commands::todos::execute(&ctx, &cli::TodosArgs::default()),
        // List views returned above.
        Some(_) => Ok(()),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Store(StoreError::NotFound { .. } | StoreError::TaskNotFound { .. }) => {
            "NOT_FOUND"
        }
        CommandError::Store(StoreError::InvalidRepeatTarget { .. }) => "INVALID_TARGET",
        CommandError::Store(_) => "DATABASE_ERROR",
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::Query(_) => "QUERY_ERROR",
        CommandError::Repeat(_) => "REPEAT_ERROR",
        CommandError::Wait(WaitError::Timeout) => "TIMEOUT",
        CommandError::Wait(_) => "WAIT_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(exit_status(e))
}

fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Filter(_) | CommandError::Query(_) | CommandError::Repeat(_) => 1,
        CommandError::Wait(_) => 2,
        CommandError::Io(_) => 3,
        CommandError::Store(
            StoreError::NotFound { .. }
            | StoreError::TaskNotFound { .. }
            | StoreError::InvalidRepeatTarget { .. }
            | StoreError::IdRequired
            | StoreError::TitleRequired,
        ) => 4,
        CommandError::Store(_) | CommandError::Config(_) => 5,
        CommandError::Json(_) => 1,
    }
}
