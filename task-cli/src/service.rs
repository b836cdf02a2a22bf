use crate::error::TaskError;
use crate::store::{Loaded, TaskStore};
use crate::task::{Status, Task, TaskList};
use tracing::{info, warn};

/// How operations react when the task file exists but cannot be read as a task list.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum CorruptDataPolicy {
    /// Log a warning and carry on with an empty list.
    #[default]
    Recover,
    /// Fail the operation with [`TaskError::CorruptData`] and leave the file untouched.
    Abort,
}

/// The operations available on the task file.
///
/// Every call is a single load, transform, save cycle against the store; no
/// state is kept between calls.
#[derive(Debug, Clone)]
pub struct TaskService {
    store: TaskStore,
    policy: CorruptDataPolicy,
}

impl TaskService {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            policy: CorruptDataPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CorruptDataPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Adds a new task in the `todo` state.
    ///
    /// # Arguments
    ///
    /// * `description` - The task text. Must not be blank.
    ///
    /// # Returns
    ///
    /// The id assigned to the new task.
    #[tracing::instrument(skip(self))]
    pub fn add(&self, description: String) -> Result<u32, TaskError> {
        let description = validate_description(description)?;
        let mut tasks = self.load()?.into_tasks();
        let id = tasks.add(description)?;
        self.store.save(&tasks)?;
        info!(id, "task added");
        Ok(id)
    }

    /// Replaces the description of an existing task.
    ///
    /// The file is left as it was if no task has the given id.
    #[tracing::instrument(skip(self))]
    pub fn update_description(&self, id: u32, description: String) -> Result<(), TaskError> {
        let description = validate_description(description)?;
        self.modify(|tasks| tasks.update_description(id, description))?;
        info!(id, "task description updated");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn mark_in_progress(&self, id: u32) -> Result<(), TaskError> {
        self.set_status(id, Status::InProgress)
    }

    #[tracing::instrument(skip(self))]
    pub fn mark_done(&self, id: u32) -> Result<(), TaskError> {
        self.set_status(id, Status::Done)
    }

    /// Deletes a task.
    ///
    /// The collection is rewritten even when no task matched, after which
    /// `NotFound` is reported. A task file that does not exist is not created.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, id: u32) -> Result<(), TaskError> {
        let loaded = self.load()?;
        if loaded.is_missing() {
            return Err(TaskError::NotFound(id));
        }

        let mut tasks = loaded.into_tasks();
        let removed = tasks.remove(id);
        self.store.save(&tasks)?;
        removed?;
        info!(id, "task deleted");
        Ok(())
    }

    /// Returns the stored tasks in file order, optionally only those with `status`.
    #[tracing::instrument(skip(self))]
    pub fn list(&self, status: Option<Status>) -> Result<Vec<Task>, TaskError> {
        self.list_where(|task| status.is_none_or(|status| task.status() == status))
    }

    /// Returns the stored tasks matching `predicate`, in file order.
    pub fn list_where(&self, predicate: impl Fn(&Task) -> bool) -> Result<Vec<Task>, TaskError> {
        Ok(self
            .load()?
            .into_tasks()
            .into_tasks()
            .into_iter()
            .filter(|task| predicate(task))
            .collect())
    }

    fn set_status(&self, id: u32, status: Status) -> Result<(), TaskError> {
        self.modify(|tasks| tasks.set_status(id, status))?;
        info!(id, %status, "task status updated");
        Ok(())
    }

    /// Loads, applies `change` and saves only if it succeeded.
    fn modify(
        &self,
        change: impl FnOnce(&mut TaskList) -> Result<(), TaskError>,
    ) -> Result<(), TaskError> {
        let mut tasks = self.load()?.into_tasks();
        change(&mut tasks)?;
        self.store.save(&tasks)
    }

    fn load(&self) -> Result<Loaded, TaskError> {
        let loaded = self.store.load()?;
        if loaded.is_corrupt() {
            match self.policy {
                CorruptDataPolicy::Recover => warn!(
                    path = %self.store.path().display(),
                    "task file is not a valid task list, treating it as empty"
                ),
                CorruptDataPolicy::Abort => {
                    return Err(TaskError::CorruptData {
                        path: self.store.path().to_path_buf(),
                    });
                }
            }
        }
        Ok(loaded)
    }
}

fn validate_description(description: String) -> Result<String, TaskError> {
    if description.trim().is_empty() {
        return Err(TaskError::InvalidInput(
            "task description must not be empty".to_string(),
        ));
    }
    Ok(description)
}
