//! Where filter selections survive between page visits

use crate::error::{KanbanError, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use workboard_config::BoardConfig;

/// String key/value storage for persisted filter selections
pub trait ValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Session-scoped store, lost when the session ends
#[derive(Debug, Default)]
pub struct MemoryValueStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl ValueStore for MemoryValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// A JSON object file of key to value, rewritten atomically on every change
#[derive(Debug)]
pub struct JsonFileValueStore {
    path: PathBuf,
    values: RefCell<BTreeMap<String, String>>,
}

impl JsonFileValueStore {
    /// Open the store, starting empty when the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| KanbanError::storage(&path, e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), entries = values.len(), "opened filter value store");
        Ok(Self {
            path,
            values: RefCell::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let content = serde_json::to_vec_pretty(&*self.values.borrow())?;
        atomic_write(&self.path, &content)
    }
}

impl ValueStore for JsonFileValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let changed = self
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string())
            .as_deref()
            != Some(value);
        if changed {
            self.flush()?;
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if self.values.borrow_mut().remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// The store selected by configuration: the JSON file when
/// `filter_store_path` is set, session memory otherwise.
pub fn value_store_for(config: &BoardConfig) -> Result<Rc<dyn ValueStore>> {
    let store: Rc<dyn ValueStore> = match &config.filter_store_path {
        Some(path) => Rc::new(JsonFileValueStore::open(path)?),
        None => Rc::new(MemoryValueStore::new()),
    };
    Ok(store)
}

/// Write via temp file + rename so readers never see a partial file
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryValueStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.get("a").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_json_store_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state").join("filters.json");

        let store = JsonFileValueStore::open(&path).unwrap();
        store.set("filterToolbar_board_sprint", "\"all\"").unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let reopened = JsonFileValueStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("filterToolbar_board_sprint").as_deref(),
            Some("\"all\"")
        );
    }

    #[test]
    fn test_value_store_for_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("filters.json");
        let config = BoardConfig::default().with_filter_store_path(&path);

        let store = value_store_for(&config).unwrap();
        store.set("k", "v").unwrap();
        assert!(path.exists());

        let memory = value_store_for(&BoardConfig::default()).unwrap();
        memory.set("k", "v").unwrap();
        assert_eq!(memory.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_json_store_rejects_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("filters.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFileValueStore::open(&path),
            Err(KanbanError::Storage { .. })
        ));
    }
}
