//! Flat-file persistence: one `title,description,due_date` line per task.
//!
//! Fields are not escaped. A title or description containing a comma
//! changes the field count, and such a line is skipped on the next load.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::task::Task;

pub const DEFAULT_TASKS_FILE: &str = "tasks.txt";

const SEPARATOR: char = ',';

/// Where the store writes through to.
pub trait TaskBackend {
    /// Reads every stored task. A missing store is empty, not an error.
    fn load(&mut self) -> io::Result<Vec<Task>>;

    /// Replaces the stored contents with `tasks`.
    fn save(&mut self, tasks: &[&Task]) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FlatFile {
    path: PathBuf,
}

impl FlatFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TaskBackend for FlatFile {
    fn load(&mut self) -> io::Result<Vec<Task>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no task file yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let mut tasks = Vec::new();
        for (index, raw) in BufReader::new(file).split(b'\n').enumerate() {
            let raw = raw?;
            let line = String::from_utf8_lossy(&raw);
            if let Cow::Owned(_) = line {
                warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    "task line is not valid UTF-8, replacing bad bytes"
                );
            }
            match decode_line(&line) {
                Some(task) => tasks.push(task),
                None => warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    "skipping malformed task line"
                ),
            }
        }
        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    fn save(&mut self, tasks: &[&Task]) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        for task in tasks {
            writeln!(writer, "{}", encode_line(task))?;
        }
        writer.flush()?;
        debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}

pub fn encode_line(task: &Task) -> String {
    format!(
        "{}{SEPARATOR}{}{SEPARATOR}{}",
        task.title, task.description, task.due_date
    )
}

/// Splits a stored line into a task. Trailing empty fields are dropped
/// before counting, and only lines with exactly three fields are accepted.
/// The date is kept as raw text and not validated.
pub fn decode_line(line: &str) -> Option<Task> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut parts: Vec<&str> = line.split(SEPARATOR).collect();
    while parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    match parts.as_slice() {
        [title, description, due_date] => Some(Task::new(*title, *description, *due_date)),
        _ => None,
    }
}

/// In-memory backend. Saves can be made to fail to exercise the
/// memory-ahead-of-disk path.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    pub stored: Vec<Task>,
    pub saves: usize,
    pub fail_saves: bool,
}

impl MemoryBackend {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            stored: tasks,
            ..Self::default()
        }
    }
}

impl TaskBackend for MemoryBackend {
    fn load(&mut self) -> io::Result<Vec<Task>> {
        Ok(self.stored.clone())
    }

    fn save(&mut self, tasks: &[&Task]) -> io::Result<()> {
        if self.fail_saves {
            return Err(io::Error::other("save disabled"));
        }
        self.stored = tasks.iter().map(|&t| t.clone()).collect();
        self.saves += 1;
        Ok(())
    }
}
