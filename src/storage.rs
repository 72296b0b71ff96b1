use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use serde_json::Value;

use crate::models::{Settings, Task, TodosFile};

pub const TODOS_KEY: &str = "todos";
pub const SETTINGS_KEY: &str = "settings";
const PROBE_KEY: &str = "__storage_test__";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Unavailable(String),
    Malformed(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
            StorageError::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            StorageError::Malformed(reason) => write!(f, "malformed data: {reason}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

/// String key-value primitives the persistence adapter is built on.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One JSON file per key under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process store. Clones share the same entries, and writes can be switched
/// off to simulate a disabled or full backend.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    writable: Rc<Cell<bool>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
            writable: Rc::new(Cell::new(true)),
        }
    }

    pub fn set_writable(&self, writable: bool) {
        self.writable.set(writable);
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.writable.get() {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// The persistence adapter. Failures are logged and reported as `false` or as
/// the caller's default, never propagated.
pub struct TaskStorage {
    store: Box<dyn KeyValueStore>,
}

impl TaskStorage {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn is_available(&self) -> bool {
        let probe = self
            .store
            .set(PROBE_KEY, PROBE_KEY)
            .and_then(|_| self.store.remove(PROBE_KEY));
        match probe {
            Ok(()) => true,
            Err(error) => {
                log::debug!("storage: probe failed: {error}");
                false
            }
        }
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> bool {
        let data = TodosFile {
            todos: tasks.to_vec(),
        };
        self.save_json(TODOS_KEY, &data)
    }

    pub fn load_tasks(&self, default: Vec<Task>) -> Vec<Task> {
        let Some(raw) = self.load_raw(TODOS_KEY) else {
            return default;
        };
        match decode_tasks(&raw) {
            Ok(tasks) => tasks,
            Err(error) => {
                log::warn!("storage: discarding stored tasks: {error}");
                default
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> bool {
        self.save_json(SETTINGS_KEY, settings)
    }

    pub fn load_settings(&self) -> Settings {
        let Some(raw) = self.load_raw(SETTINGS_KEY) else {
            return Settings::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|error| {
            log::warn!("storage: discarding stored settings: {error}");
            Settings::default()
        })
    }

    fn save_json<T: serde::Serialize>(&self, key: &str, data: &T) -> bool {
        if !self.is_available() {
            log::warn!("storage: skipped save key={key}: storage unavailable");
            return false;
        }
        let result = serde_json::to_string(data)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(key, &json));
        match result {
            Ok(()) => true,
            Err(error) => {
                log::warn!("storage: save failed key={key}: {error}");
                false
            }
        }
    }

    fn load_raw(&self, key: &str) -> Option<String> {
        if !self.is_available() {
            return None;
        }
        match self.store.get(key) {
            Ok(value) => value,
            Err(error) => {
                log::warn!("storage: load failed key={key}: {error}");
                None
            }
        }
    }
}

/// Accepts the `{ "todos": [...] }` document or a bare task array. Entries that
/// do not decode are skipped one by one.
pub fn decode_tasks(raw: &str) -> Result<Vec<Task>, StorageError> {
    let value: Value = serde_json::from_str(raw)?;
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove(TODOS_KEY) {
            Some(Value::Array(entries)) => entries,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => return Err(StorageError::Malformed("`todos` is not an array".into())),
        },
        _ => return Err(StorageError::Malformed("unexpected document root".into())),
    };

    let mut tasks = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<Task>(entry) {
            Ok(task) => tasks.push(task),
            Err(error) => log::warn!("storage: skipping undecodable task: {error}"),
        }
    }
    Ok(tasks)
}
