use std::collections::{BTreeMap, VecDeque};

use tracing::{info, warn};

use crate::date::{DueDate, SortKey};
use crate::error::{Result, TaskError};
use crate::persist::{FlatFile, TaskBackend};
use crate::task::Task;

/// Tasks ordered by due date, written through to `B` after every mutation.
///
/// Equal dates keep insertion order, so the earliest-due task is also the
/// oldest one added among its ties.
#[derive(Debug)]
pub struct TaskStore<B: TaskBackend = FlatFile> {
    queue: BTreeMap<SortKey, VecDeque<Task>>,
    len: usize,
    backend: B,
    synced: bool,
}

impl<B: TaskBackend> TaskStore<B> {
    /// Builds the store from whatever `backend` holds. A failed load is
    /// logged and leaves the store empty.
    pub fn open(mut backend: B) -> Self {
        let loaded = backend.load().unwrap_or_else(|err| {
            warn!(error = %err, "failed to load tasks, starting empty");
            Vec::new()
        });

        let mut store = Self {
            queue: BTreeMap::new(),
            len: 0,
            backend,
            synced: true,
        };
        for task in loaded {
            store.insert(task);
        }

        let unparsed: usize = store
            .queue
            .iter()
            .filter(|(key, _)| key.is_unparsed())
            .map(|(_, bucket)| bucket.len())
            .sum();
        if unparsed > 0 {
            warn!(count = unparsed, "stored tasks with unreadable due dates");
        }
        info!(count = store.len, "task store ready");
        store
    }

    pub fn add(&mut self, title: &str, description: &str, due_date: &str) -> Result<Task> {
        for (field, value) in [
            ("title", title),
            ("description", description),
            ("due date", due_date),
        ] {
            if value.is_empty() {
                return Err(TaskError::Validation { field });
            }
        }
        DueDate::parse(due_date)?;

        let task = Task::new(title, description, due_date);
        self.insert(task.clone());
        info!(title, due_date, "added task");
        self.flush();
        Ok(task)
    }

    /// Removes one entry equal to `task`. Returns whether anything matched.
    pub fn remove(&mut self, task: &Task) -> bool {
        let removed = self.take(task).is_some();
        if removed {
            info!(title = %task.title, due_date = %task.due_date, "removed task");
            self.flush();
        }
        removed
    }

    /// Removes the earliest-due entry matching `predicate`.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Option<Task>
    where
        F: FnMut(&Task) -> bool,
    {
        let key = self
            .queue
            .iter()
            .find(|(_, bucket)| bucket.iter().any(&mut predicate))
            .map(|(key, _)| key.clone())?;
        let index = self.queue.get(&key)?.iter().position(&mut predicate)?;
        let task = self.pop_at(&key, index)?;

        info!(title = %task.title, due_date = %task.due_date, "removed task");
        self.flush();
        Some(task)
    }

    /// Removes one matching entry per task in `selected`. Returns how many
    /// entries were actually removed.
    pub fn remove_selected(&mut self, selected: &[Task]) -> usize {
        if selected.is_empty() {
            return 0;
        }
        let removed = selected
            .iter()
            .filter(|task| self.take(task).is_some())
            .count();
        info!(requested = selected.len(), removed, "removed selected tasks");
        self.flush();
        removed
    }

    pub fn remove_earliest(&mut self) -> Result<Task> {
        let key = self
            .queue
            .keys()
            .next()
            .cloned()
            .ok_or(TaskError::EmptyStore)?;
        let task = self.pop_at(&key, 0).ok_or(TaskError::EmptyStore)?;

        info!(title = %task.title, due_date = %task.due_date, "accomplished task");
        self.flush();
        Ok(task)
    }

    /// Snapshot of every task, earliest due date first.
    pub fn list_ordered(&self) -> Vec<Task> {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.queue.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// False while the last write-through failed and disk lags memory.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn insert(&mut self, task: Task) {
        let key = SortKey::for_text(&task.due_date);
        self.queue.entry(key).or_default().push_back(task);
        self.len += 1;
    }

    fn take(&mut self, task: &Task) -> Option<Task> {
        let key = SortKey::for_text(&task.due_date);
        let index = self.queue.get(&key)?.iter().position(|t| t == task)?;
        self.pop_at(&key, index)
    }

    fn pop_at(&mut self, key: &SortKey, index: usize) -> Option<Task> {
        let bucket = self.queue.get_mut(key)?;
        let task = bucket.remove(index)?;
        if bucket.is_empty() {
            self.queue.remove(key);
        }
        self.len -= 1;
        Some(task)
    }

    fn flush(&mut self) {
        let tasks: Vec<&Task> = self.queue.values().flatten().collect();
        match self.backend.save(&tasks) {
            Ok(()) => self.synced = true,
            Err(err) => {
                warn!(error = %err, "failed to save tasks, disk is behind memory");
                self.synced = false;
            }
        }
    }
}
