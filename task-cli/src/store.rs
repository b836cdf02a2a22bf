use crate::error::TaskError;
use crate::task::TaskList;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// What `TaskStore::load` found on disk.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FileState {
    /// No task file exists yet.
    Missing,
    Valid,
    /// The file exists but could not be read as a task list.
    Corrupt,
}

/// The result of reading the task file: the collection plus how it was obtained.
///
/// A corrupt file still yields an (empty) collection. Callers inspect
/// [`Loaded::is_corrupt`] to decide whether to carry on or give up.
#[derive(Debug, Clone)]
pub struct Loaded {
    tasks: TaskList,
    state: FileState,
}

impl Loaded {
    fn empty(state: FileState) -> Self {
        Self {
            tasks: TaskList::new(),
            state,
        }
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn into_tasks(self) -> TaskList {
        self.tasks
    }

    pub fn state(&self) -> FileState {
        self.state
    }

    pub fn is_corrupt(&self) -> bool {
        self.state == FileState::Corrupt
    }

    pub fn is_missing(&self) -> bool {
        self.state == FileState::Missing
    }
}

/// Reads and rewrites the JSON task file at a fixed path.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole task file.
    ///
    /// A missing file is an empty list. Content that is not a JSON array of tasks,
    /// or that repeats an id, is reported as [`FileState::Corrupt`] with an empty
    /// list instead of an error. Only genuine I/O failures are returned as `Err`.
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Loaded, TaskError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("task file does not exist yet");
                return Ok(Loaded::empty(FileState::Missing));
            }
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_slice::<TaskList>(&bytes) {
            Ok(tasks) if tasks.is_consistent() => {
                debug!(count = tasks.len(), "loaded tasks");
                Ok(Loaded {
                    tasks,
                    state: FileState::Valid,
                })
            }
            Ok(_) => {
                debug!("task file contains zero or duplicate ids");
                Ok(Loaded::empty(FileState::Corrupt))
            }
            Err(err) => {
                debug!(error = %err, "task file is not a task list");
                Ok(Loaded::empty(FileState::Corrupt))
            }
        }
    }

    /// Replaces the task file with the given collection.
    ///
    /// The new content is written and synced to a temporary file next to the task
    /// file, then renamed over it, so the file always holds either the old or the
    /// new collection in full.
    #[tracing::instrument(skip(self, tasks), fields(path = %self.path.display(), count = tasks.len()))]
    pub fn save(&self, tasks: &TaskList) -> Result<(), TaskError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        // The rename replaces the file, so carry its permissions over.
        match fs::metadata(&self.path) {
            Ok(metadata) => file.as_file().set_permissions(metadata.permissions())?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        serde_json::to_writer_pretty(&mut file, tasks)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|err| err.error)?;

        debug!("saved tasks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Status;

    fn store_in(dir: &tempfile::TempDir) -> TaskStore {
        TaskStore::new(dir.path().join("tasks.json"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let loaded = store.load().unwrap();

        assert!(loaded.tasks().is_empty());
        assert_eq!(loaded.state(), FileState::Missing);
        assert!(!store.path().exists(), "Loading must not create the file");
    }

    #[test]
    fn test_load_invalid_json_is_empty_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ this is not json").unwrap();

        let loaded = store.load().unwrap();

        assert!(loaded.tasks().is_empty());
        assert!(loaded.is_corrupt());
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "{ this is not json",
            "Loading must leave the bad file alone"
        );
    }

    #[test]
    fn test_load_unreadable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path());

        let result = store.load();

        assert!(matches!(result, Err(TaskError::Io(_))));
    }

    #[test]
    fn test_load_wrong_shape_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"tasks": {}, "next_id": 3}"#).unwrap();

        assert!(store.load().unwrap().is_corrupt());
    }

    #[test]
    fn test_load_unknown_status_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let json = r#"[{"id": 1, "description": "x", "status": "blocked",
            "created_at": "2023-01-01T00:00:00Z", "updated_at": "2023-01-01T00:00:00Z"}]"#;
        fs::write(store.path(), json).unwrap();

        assert!(store.load().unwrap().is_corrupt());
    }

    #[test]
    fn test_load_duplicate_ids_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let json = r#"[
            {"id": 1, "description": "a", "status": "todo",
             "created_at": "2023-01-01T00:00:00Z", "updated_at": "2023-01-01T00:00:00Z"},
            {"id": 1, "description": "b", "status": "done",
             "created_at": "2023-01-01T00:00:00Z", "updated_at": "2023-01-01T00:00:00Z"}
        ]"#;
        fs::write(store.path(), json).unwrap();

        assert!(store.load().unwrap().is_corrupt());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut tasks = TaskList::new();
        tasks.add("first".to_string()).unwrap();
        tasks.add("second".to_string()).unwrap();
        tasks.set_status(2, Status::InProgress).unwrap();

        store.save(&tasks).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.state(), FileState::Valid);
        assert_eq!(loaded.tasks(), &tasks);
    }

    #[test]
    fn test_save_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "garbage that is much longer than an empty list").unwrap();

        store.save(&TaskList::new()).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.trim(), "[]");
    }

    #[test]
    fn test_save_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut tasks = TaskList::new();
        tasks.add("only".to_string()).unwrap();

        store.save(&tasks).unwrap();
        store.save(&tasks).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_writes_root_array_with_expected_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut tasks = TaskList::new();
        tasks.add("Buy groceries".to_string()).unwrap();

        store.save(&tasks).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["id"], 1);
        assert_eq!(first["description"], "Buy groceries");
        assert_eq!(first["status"], "todo");
        assert!(first["created_at"].is_string());
        assert_eq!(first["created_at"], first["updated_at"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&TaskList::new()).unwrap();
        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();

        store.save(&TaskList::new()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
