//! Small key-value preference store.
//!
//! Used for the column visibility of the sessions table. Writes are fire-and-forget: a failed
//! write is logged and the in-memory value still changes.

use crate::constants::SESSIONS_HIDDEN_COLUMNS_KEY;
use crate::{CoreError, CoreResult};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait PreferenceStore {
    fn get(&self, key: &str) -> CoreResult<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> CoreResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    values: Mutex<BTreeMap<String, Value>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> CoreError {
    CoreError::InvalidInput("preference store lock poisoned".into())
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn get(&self, key: &str) -> CoreResult<Option<Value>> {
        let values = self.values.lock().map_err(|_| poisoned())?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> CoreResult<()> {
        let mut values = self.values.lock().map_err(|_| poisoned())?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Preferences kept in a single JSON object file.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePreferenceStore {
    /// The file is created on the first write.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> CoreResult<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = fs::read_to_string(&self.path).map_err(CoreError::FileRead)?;
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(CoreError::Deserialization)
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> CoreResult<Option<Value>> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> CoreResult<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);
        let text = serde_json::to_string_pretty(&values).map_err(CoreError::Serialization)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            crate::config::ensure_dir(parent)?;
        }
        fs::write(&self.path, text).map_err(CoreError::FileWrite)
    }
}

/// Hidden columns of the sessions table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnVisibility {
    hidden: BTreeSet<String>,
}

impl ColumnVisibility {
    /// Loads the hidden set; unreadable or malformed values fall back to "all visible".
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let hidden = match store.get(SESSIONS_HIDDEN_COLUMNS_KEY) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|err| {
                tracing::warn!("ignoring malformed column preferences: {err}");
                BTreeSet::new()
            }),
            Ok(None) => BTreeSet::new(),
            Err(err) => {
                tracing::warn!("could not read column preferences: {err}");
                BTreeSet::new()
            }
        };
        Self { hidden }
    }

    pub fn is_visible(&self, column: &str) -> bool {
        !self.hidden.contains(column)
    }

    pub fn hidden(&self) -> impl Iterator<Item = &str> {
        self.hidden.iter().map(String::as_str)
    }

    pub fn hide(&mut self, column: &str, store: &dyn PreferenceStore) {
        if self.hidden.insert(column.to_string()) {
            self.save(store);
        }
    }

    pub fn show(&mut self, column: &str, store: &dyn PreferenceStore) {
        if self.hidden.remove(column) {
            self.save(store);
        }
    }

    fn save(&self, store: &dyn PreferenceStore) {
        let value = Value::from(self.hidden.iter().cloned().collect::<Vec<_>>());
        if let Err(err) = store.set(SESSIONS_HIDDEN_COLUMNS_KEY, value) {
            tracing::warn!("could not save column preferences: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct ReadOnly;

    impl PreferenceStore for ReadOnly {
        fn get(&self, _key: &str) -> CoreResult<Option<Value>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: Value) -> CoreResult<()> {
            Err(CoreError::FileWrite(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn hide_and_show_persist() {
        let store = InMemoryPreferenceStore::new();
        let mut columns = ColumnVisibility::load(&store);
        assert!(columns.is_visible("terapeuta"));

        columns.hide("terapeuta", &store);
        columns.hide("sala", &store);
        columns.show("sala", &store);

        let reloaded = ColumnVisibility::load(&store);
        assert!(!reloaded.is_visible("terapeuta"));
        assert!(reloaded.is_visible("sala"));
        assert_eq!(reloaded.hidden().collect::<Vec<_>>(), vec!["terapeuta"]);
    }

    #[test]
    fn failed_write_still_changes_the_view() {
        let mut columns = ColumnVisibility::default();
        columns.hide("data", &ReadOnly);
        assert!(!columns.is_visible("data"));
    }

    #[test]
    fn file_store_round_trips_and_keeps_other_keys() {
        let dir = TempDir::new().expect("tempdir");
        let store = FilePreferenceStore::new(&dir.path().join("prefs").join("preferences.json"));
        assert_eq!(store.get("tema").expect("get"), None);

        store.set("tema", Value::from("escuro")).expect("set");
        let mut columns = ColumnVisibility::load(&store);
        columns.hide("paciente", &store);

        assert_eq!(store.get("tema").expect("get"), Some(Value::from("escuro")));
        assert!(!ColumnVisibility::load(&store).is_visible("paciente"));
    }

    #[test]
    fn malformed_value_means_all_visible() {
        let store = InMemoryPreferenceStore::new();
        store
            .set(SESSIONS_HIDDEN_COLUMNS_KEY, Value::from(42))
            .expect("set");
        assert_eq!(ColumnVisibility::load(&store), ColumnVisibility::default());
    }
}
