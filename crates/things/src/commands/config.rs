//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/things/config.toml.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use things_db::discover_database_path;
use tracing::debug;

use super::{CommandContext, CommandError, Result};
use crate::cli::OutputFormat;

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "THINGS_CONFIG";

/// Environment variable carrying the URL-scheme auth token.
pub const AUTH_TOKEN_ENV: &str = "THINGS_AUTH_TOKEN";

/// Minimum token length to apply masking (show first and last N characters).
const TOKEN_MASK_MIN_LENGTH: usize = 8;

/// Number of characters to show at start/end of a masked token.
const TOKEN_MASK_VISIBLE_CHARS: usize = 4;

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# things - Things 3 CLI Configuration

# Config schema version (do not modify)
version = 1

# Path to main.sqlite (can also use --db or the THINGSDB env var).
# Discovered under ~/Library/Group Containers when unset.
# database = "/path/to/main.sqlite"

# Things URL-scheme auth token (can also use THINGS_AUTH_TOKEN env var)
# auth_token = "your-token-here"

# Output preferences
[output]
# color = true      # Enable colors (respects NO_COLOR env)
# format = "table"  # "table", "json", "csv"

# Listing defaults
[query]
# default_limit = 50
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Database path override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Things URL-scheme auth token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            database: None,
            auth_token: None,
            output: OutputConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Config {
    /// The configured listing format, if it names a known one.
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output
            .format
            .as_deref()
            .and_then(OutputFormat::from_name)
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,

    /// Listing format: table, json or csv.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Listing defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Limit applied when `--limit` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<usize>,
}

/// Gets the config file path.
///
/// Uses `$THINGS_CONFIG`, then `$XDG_CONFIG_HOME/things/config.toml`, then
/// `~/.config/things/config.toml` on all platforms.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("things").join("config.toml"));
    }

    BaseDirs::new()
        .map(|dirs| {
            dirs.home_dir()
                .join(".config")
                .join("things")
                .join("config.toml")
        })
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Loads the configuration from disk.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    migrate_config(config)
}

/// Migrates config to current version if needed.
/// Returns the config as-is if already at current version.
fn migrate_config(mut config: Config) -> Result<Config> {
    // Version 1 is the initial schema; later versions add steps here.
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Saves the configuration to disk.
fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| CommandError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, content)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Resolves the database path with priority: flag/env > config > discovery.
///
/// `flag` already carries `THINGSDB`, which clap reads for `--db`.
pub fn resolve_database_path(flag: Option<&Path>, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = flag.filter(|p| !p.as_os_str().is_empty()) {
        debug!(path = %path.display(), "database path from flag or THINGSDB");
        return Ok(path.to_path_buf());
    }

    if let Some(path) = configured {
        debug!(path = %path.display(), "database path from config");
        return Ok(path.to_path_buf());
    }

    let home = BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| CommandError::Config("Could not determine home directory".to_string()))?;

    discover_database_path(&home).ok_or_else(|| {
        CommandError::Config(
            "Things database not found; pass --db or set THINGSDB".to_string(),
        )
    })
}

/// Resolves the auth token with priority: env > config.
///
/// Things only asks for the token on `things:///update` URL-scheme calls.
/// Nothing here opens those URLs; the token is kept for scripts that do, and
/// `config show` reports which one is in effect.
pub fn resolve_auth_token(config: &Config) -> Option<String> {
    env::var(AUTH_TOKEN_ENV)
        .ok()
        .filter(|t| !t.is_empty())
        .or_else(|| config.auth_token.clone())
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;
    let token = resolve_auth_token(&config);

    if ctx.json_output {
        let masked = Config {
            auth_token: config.auth_token.as_deref().map(mask_token),
            ..config
        };
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "auth_token": token.as_deref().map(mask_token),
            "config": masked,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        println!("Settings:");
        if let Some(ref database) = config.database {
            println!("  database: {}", database.display());
        }
        if let Some(ref token) = token {
            println!("  auth_token: {}", mask_token(token));
        }

        println!("\n[output]");
        if let Some(color) = config.output.color {
            println!("  color: {}", color);
        }
        if let Some(ref format) = config.output.format {
            println!("  format: {}", format);
        }

        println!("\n[query]");
        if let Some(limit) = config.query.default_limit {
            println!("  default_limit: {}", limit);
        }

        if !path.exists() {
            println!("\n(No config file exists. Run 'things config init' to create one.)");
        }
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Executes the config init command.
pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = get_config_path()?;

    if path.exists() && !force {
        return Err(CommandError::Config(format!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }
    fs::write(&path, DEFAULT_CONFIG)
        .map_err(|e| CommandError::Config(format!("Failed to create config file: {}", e)))?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Created default config at: {}", path.display());
    }

    Ok(())
}

/// Options for the config set command.
pub struct ConfigSetOptions {
    /// Configuration key.
    pub key: String,
    /// Configuration value.
    pub value: String,
}

/// Executes the config set command.
pub fn execute_set(ctx: &CommandContext, opts: &ConfigSetOptions) -> Result<()> {
    let mut config = load_config()?;
    let path = get_config_path()?;

    set_value(&mut config, &opts.key, &opts.value)?;
    save_config(&config, &path)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "key": opts.key,
            "value": opts.value,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Set {} = {}", opts.key, opts.value);
    }

    Ok(())
}

fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "database" => config.database = Some(PathBuf::from(value)),
        "auth_token" => config.auth_token = Some(value.to_string()),
        "output.color" => config.output.color = Some(parse_bool(value)?),
        "output.format" => {
            if OutputFormat::from_name(value).is_none() {
                return Err(CommandError::Config(format!(
                    "Invalid format value '{}'. Valid values: table, json, csv",
                    value
                )));
            }
            config.output.format = Some(value.to_lowercase());
        }
        "query.default_limit" => {
            let limit = value.parse::<usize>().map_err(|_| {
                CommandError::Config(format!("Invalid default_limit value '{}'", value))
            })?;
            config.query.default_limit = Some(limit);
        }
        _ => {
            return Err(CommandError::Config(format!(
                "Unknown config key '{}'. Valid keys: database, auth_token, output.color, output.format, query.default_limit",
                key
            )));
        }
    }
    Ok(())
}

/// Masks a token for display, showing only the first and last N characters.
///
/// Uses character-based (not byte-based) indexing to safely handle
/// multi-byte UTF-8 characters.
fn mask_token(token: &str) -> String {
    let char_count = token.chars().count();
    if char_count > TOKEN_MASK_MIN_LENGTH {
        let prefix: String = token.chars().take(TOKEN_MASK_VISIBLE_CHARS).collect();
        let suffix: String = token
            .chars()
            .skip(char_count - TOKEN_MASK_VISIBLE_CHARS)
            .collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "****".to_string()
    }
}

/// Parses a boolean value from string.
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CommandError::Config(format!(
            "Invalid boolean value '{}'. Use true/false, yes/no, 1/0, or on/off",
            s
        ))),
    }
}
