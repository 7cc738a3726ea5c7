use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use automarket_core::storage::{KeyValueStore, StorageError};
use tracing::{debug, warn};

const STORAGE_FILE: &str = "storage.json";

/// `localStorage` для терминала: JSON-объект в каталоге состояния.
///
/// Файл перечитывается при открытии и переписывается целиком при каждом
/// изменении.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(state_dir: &Path) -> Result<Self, StorageError> {
        let path = state_dir.join(STORAGE_FILE);
        let items = match fs::read_to_string(&path) {
            Ok(raw) => parse_items(&raw, &path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(io_error(&path, err)),
        };
        debug!(path = %path.display(), keys = items.len(), "storage opened");
        Ok(Self { path, items })
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|err| io_error(dir, err))?;
        }
        let raw = serde_json::to_string_pretty(&self.items)?;
        fs::write(&self.path, raw).map_err(|err| io_error(&self.path, err))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

fn parse_items(raw: &str, path: &Path) -> BTreeMap<String, String> {
    match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring corrupt storage file");
            BTreeMap::new()
        }
    }
}

fn io_error(path: &Path, err: io::Error) -> StorageError {
    StorageError::Io(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use automarket_core::storage::{FILTERS_KEY, load_filters, load_token, save_filters, save_token};
    use automarket_core::{CarFilters, FilterField};

    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = FileStore::open(dir.path()).expect("store must open");
        save_token(&mut store, "jwt").expect("token must be saved");
        let filters = CarFilters::default().with(FilterField::FuelType, "diesel");
        save_filters(&mut store, FILTERS_KEY, &filters).expect("filters must be saved");

        let reopened = FileStore::open(dir.path()).expect("store must reopen");
        assert_eq!(load_token(&reopened).as_deref(), Some("jwt"));
        assert_eq!(load_filters(&reopened, FILTERS_KEY), Some(filters));
    }

    #[test]
    fn missing_state_dir_is_created_on_first_write() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("state").join("automarket");
        let mut store = FileStore::open(&nested).expect("store must open");
        save_token(&mut store, "jwt").expect("token must be saved");
        assert!(nested.join(STORAGE_FILE).exists());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join(STORAGE_FILE), "{not json").expect("write");

        let store = FileStore::open(dir.path()).expect("store must open");
        assert!(load_token(&store).is_none());
    }

    #[test]
    fn removing_missing_key_does_not_create_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = FileStore::open(dir.path()).expect("store must open");
        store.remove_item("token").expect("remove must succeed");
        assert!(!dir.path().join(STORAGE_FILE).exists());
    }
}
