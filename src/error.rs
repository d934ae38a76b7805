use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("missing required field: {field}")]
    Validation { field: &'static str },

    #[error("invalid date format {input:?}, expected MM-DD-YY")]
    InvalidDateFormat { input: String },

    #[error("no tasks in the store")]
    EmptyStore,

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TaskError>;
