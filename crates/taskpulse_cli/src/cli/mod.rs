use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taskpulse_core::model::{Priority, TaskStatus};

#[derive(Parser, Debug)]
#[command(name = "taskpulse", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    ///
    /// Example: taskpulse serve --listen 0.0.0.0:9002
    Serve {
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        task: TaskCommand,
    },
    /// Show actual vs. ideal remaining main tasks
    ///
    /// Example: taskpulse burndown --record
    Burndown {
        /// Store today's estimate in the burndown history
        #[arg(long)]
        record: bool,
    },
    /// Show project statistics and workload
    Stats,
    /// Replace every task with the contents of a JSON file
    ///
    /// Example: taskpulse import tasks.json
    Import { file: PathBuf },
    /// Print every task as JSON
    Export,
    /// Ask the advisor for a notification and show it on the desktop
    Notify,
    /// Ask the advisor for a project summary
    Summary,
    /// Ask the advisor for a task description
    ///
    /// Example: taskpulse suggest-description "Migrate billing"
    SuggestDescription { name: String },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// List tasks with their progress
    List {
        /// Only tasks without a parent
        #[arg(long)]
        main_only: bool,
        /// Only open tasks whose assignees asked for help
        #[arg(long)]
        help_needed: bool,
    },
    /// Show one task
    Show { id: String },
    /// Create a task
    ///
    /// Example: taskpulse task add "Write docs" --assignee ana@example.com --priority high
    Add(AddArgs),
    /// Change fields of a task
    ///
    /// Example: taskpulse task update task-1 --status "in progress"
    Update(UpdateArgs),
    /// Delete a task and all of its subtasks
    Delete { id: String },
    /// Show the progress of every task
    Progress,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub name: String,
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Repeat for several assignees
    #[arg(long = "assignee", value_name = "EMAIL")]
    pub assignees: Vec<String>,
    #[arg(long, default_value = "medium")]
    pub priority: Priority,
    #[arg(long, default_value = "todo")]
    pub status: TaskStatus,
    #[arg(long, value_name = "ID")]
    pub parent: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub due: Option<String>,
    /// Ask teammates for a hand
    #[arg(long)]
    pub needs_help: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Replaces the assignee list; repeat for several
    #[arg(long = "assignee", value_name = "EMAIL")]
    pub assignees: Vec<String>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
    #[arg(long, value_name = "ID", conflicts_with = "no_parent")]
    pub parent: Option<String>,
    /// Turn the task into a main task
    #[arg(long)]
    pub no_parent: bool,
    /// RFC 3339 timestamp or YYYY-MM-DD
    #[arg(long, value_name = "DATE", conflicts_with = "clear_due")]
    pub due: Option<String>,
    #[arg(long)]
    pub clear_due: bool,
    /// Raise (true) or clear (false) the help request
    #[arg(long, value_name = "BOOL")]
    pub needs_help: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    /// Canonical dotted key, e.g. `model.base_url`.
    pub key: String,
    pub value: String,
}

const TOP_LEVEL_KEYS: &[&str] = &["data_dir", "listen", "strict_completion"];
const MODEL_KEYS: &[&str] = &[
    "base_url",
    "model",
    "transcription_model",
    "api_key_env",
    "timeout_secs",
    "language",
];

/// Parse a raw `KEY=VALUE` override string into a canonical key.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    match (canonical_field.as_str(), remainder) {
        ("model", Some(segment)) => {
            let name = canonicalize_flag_name(segment)
                .ok_or_else(|| "model override requires a field name".to_string())?;
            if !MODEL_KEYS.contains(&name.as_str()) {
                return Err(format!("unknown model field '{name}'"));
            }
            Ok(ParsedConfigOverride {
                key: format!("model.{name}"),
                value,
            })
        }
        ("model", None) => Err("model override requires a field name".to_string()),
        (field, None) if TOP_LEVEL_KEYS.contains(&field) => Ok(ParsedConfigOverride {
            key: field.to_string(),
            value,
        }),
        (field, Some(_)) if TOP_LEVEL_KEYS.contains(&field) => {
            Err(format!("{field} override cannot have subfields"))
        }
        (other, _) => Err(format!("unknown config field '{other}'")),
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
