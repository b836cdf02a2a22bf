//! Local task tracking backed by a single JSON file.
//!
//! [`TaskService`] is the entry point: each operation reads the task file through a
//! [`TaskStore`], applies one change to the in-memory [`TaskList`] and writes the
//! whole list back.

pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod table;
pub mod task;

pub use error::TaskError;
pub use service::{CorruptDataPolicy, TaskService};
pub use store::{FileState, Loaded, TaskStore};
pub use task::{Status, Task, TaskList};
