use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    /// The task file exists but does not hold a task collection.
    #[error("Task file {} is not a valid task list", .path.display())]
    CorruptData { path: PathBuf },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No task with ID {0} found")]
    NotFound(u32),
    /// The highest stored id is already `u32::MAX`.
    #[error("No task IDs left to assign")]
    IdsExhausted,
    #[error("Failed to access task file")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize tasks")]
    Serialize(#[from] serde_json::Error),
}
