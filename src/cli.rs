use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command};
use tasktopia::{Config, RemovalMode, Result, TaskBackend, TaskError, TaskStore};

pub const DEFAULT_CONFIG_FILE: &str = "tasktopia.json";

pub fn command() -> Command {
    let task_args = || {
        [
            Arg::new("title").required(true).help("Task title"),
            Arg::new("description").required(true).help("Task description"),
            Arg::new("date").required(true).help("Due date (MM-DD-YY)"),
        ]
    };

    Command::new("tasktopia")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Task list ordered by due date")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("JSON config file [default: tasktopia.json]"),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .value_name("PATH")
                .help("Task file to read and write"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_name("MODE")
                .help("Removal mode for the interactive screen: select or earliest"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Write logs to this file"),
        )
        .subcommand(Command::new("add").about("Add a new task").args(task_args()))
        .subcommand(Command::new("list").about("List tasks by due date"))
        .subcommand(Command::new("done").about("Accomplish the earliest-due task"))
        .subcommand(
            Command::new("remove")
                .about("Remove one task matching all three fields")
                .args(task_args()),
        )
}

/// Config file first, then command-line overrides.
pub fn resolve_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load(&PathBuf::from(path))?,
        None => Config::load_or_default(&PathBuf::from(DEFAULT_CONFIG_FILE))?,
    };
    if let Some(file) = matches.get_one::<String>("file") {
        config.tasks_file = PathBuf::from(file);
    }
    if let Some(mode) = matches.get_one::<String>("mode") {
        config.removal_mode = mode.parse::<RemovalMode>()?;
    }
    if let Some(log_file) = matches.get_one::<String>("log-file") {
        config.log_file = Some(PathBuf::from(log_file));
    }
    Ok(config)
}

/// Runs a one-shot subcommand and returns the text to print.
pub fn run_subcommand<B: TaskBackend>(
    store: &mut TaskStore<B>,
    name: &str,
    sub_matches: &ArgMatches,
) -> std::result::Result<String, String> {
    let field = |id: &str| {
        sub_matches
            .get_one::<String>(id)
            .map(String::as_str)
            .unwrap_or_default()
    };

    let output = match name {
        "add" => store
            .add(field("title"), field("description"), field("date"))
            .map(|task| format!("Added: {task}")),
        "list" => Ok(render_list(store)),
        "done" => store
            .remove_earliest()
            .map(|task| format!("Accomplished: {task}")),
        "remove" => {
            let task = tasktopia::Task::new(field("title"), field("description"), field("date"));
            if store.remove(&task) {
                Ok(format!("Removed: {task}"))
            } else {
                Ok(format!("No task matched: {task}"))
            }
        }
        other => return Err(format!("Unknown command {other:?}. Use --help.")),
    };

    let output = output.map_err(|err| user_message(&err))?;
    if store.is_synced() {
        Ok(output)
    } else {
        Err(format!("{output}\n{}", unsaved_warning()))
    }
}

fn render_list<B: TaskBackend>(store: &TaskStore<B>) -> String {
    if store.is_empty() {
        return "No tasks.".to_string();
    }
    store
        .iter()
        .map(|task| {
            format!(
                "Title: {}\nDescription: {}\nDue Date: {}\n",
                task.title, task.description, task.due_date
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn user_message(err: &TaskError) -> String {
    match err {
        TaskError::Validation { .. } => "Please fill out all fields.".to_string(),
        TaskError::InvalidDateFormat { .. } => {
            "Invalid date format. Please use MM-dd-yy.".to_string()
        }
        TaskError::EmptyStore => "No tasks to accomplish.".to_string(),
        TaskError::Io(err) => format!("File error: {err}"),
        TaskError::Config(msg) => format!("Config error: {msg}"),
    }
}

pub fn unsaved_warning() -> &'static str {
    "Warning: tasks could not be saved to disk."
}
