//! Due-date ordered task list with a flat-file store.

pub mod config;
pub mod date;
pub mod error;
pub mod persist;
pub mod store;
pub mod task;

pub use config::{Config, RemovalMode};
pub use date::DueDate;
pub use error::{Result, TaskError};
pub use persist::{FlatFile, MemoryBackend, TaskBackend};
pub use store::TaskStore;
pub use task::Task;
