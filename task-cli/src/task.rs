use crate::error::TaskError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// A single tracked task as it is stored in the task file.
#[derive(Debug, Eq, PartialEq, Serialize, Deserialize, Clone)]
pub struct Task {
    id: u32,
    description: String,
    status: Status,
    #[serde(with = "timestamp")]
    created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    updated_at: DateTime<Utc>,
}

/// RFC 3339 in UTC with a fixed nine-digit fraction, so stored timestamps sort as text.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

impl Task {
    /// Creates a new `Todo` task. Both timestamps are set to the current time.
    pub fn new(id: u32, description: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            description,
            status: Status::Todo,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_description(&mut self, description: String) {
        self.description = description;
        self.touch();
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered, in-memory task collection.
///
/// Serializes as a bare JSON array so the task file's root is the list of tasks.
/// Insertion order is preserved; nothing is ever sorted.
#[derive(Debug, Default, Eq, PartialEq, Serialize, Deserialize, Clone)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn find_by_id(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Returns the id the next added task will receive: one past the current maximum.
    ///
    /// The counter is not persisted, so deleting the highest id and adding again
    /// hands that id out a second time. Fails once the maximum is `u32::MAX`.
    pub fn next_id(&self) -> Result<u32, TaskError> {
        let max = self.tasks.iter().map(|task| task.id).max().unwrap_or(0);
        max.checked_add(1).ok_or(TaskError::IdsExhausted)
    }

    /// Appends a new `Todo` task and returns its id.
    pub fn add(&mut self, description: String) -> Result<u32, TaskError> {
        let id = self.next_id()?;
        self.tasks.push(Task::new(id, description));
        Ok(id)
    }

    pub fn update_description(&mut self, id: u32, description: String) -> Result<(), TaskError> {
        self.find_mut(id)?.set_description(description);
        Ok(())
    }

    pub fn set_status(&mut self, id: u32, status: Status) -> Result<(), TaskError> {
        self.find_mut(id)?.set_status(status);
        Ok(())
    }

    /// Removes the task with the given id, returning it.
    pub fn remove(&mut self, id: u32) -> Result<Task, TaskError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))?;
        Ok(self.tasks.remove(index))
    }

    /// Checks the collection invariants: every id is positive and unique.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        self.tasks
            .iter()
            .all(|task| task.id > 0 && seen.insert(task.id))
    }

    fn find_mut(&mut self, id: u32) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))
    }
}
