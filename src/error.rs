use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    /// SQLite failure (open, schema, query)
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Terminal read/write failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Task id input that is not an integer or does not fit in an `i64`
    #[error("'{0}' is not a valid task ID.")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, TaskError>;
