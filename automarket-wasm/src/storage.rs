use automarket_core::storage::{KeyValueStore, StorageError};
use web_sys::Storage;

/// `window.localStorage` за интерфейсом `KeyValueStore`.
pub(crate) struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    pub(crate) fn open() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("window is not available".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|_| StorageError::Unavailable("failed to access localStorage".to_string()))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is not available".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|_| StorageError::Io(format!("failed to read {key}")))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|_| StorageError::Io(format!("failed to save {key}")))
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|_| StorageError::Io(format!("failed to clear {key}")))
    }
}

/// Выполняет операцию с хранилищем и возвращает текст ошибки для уведомления.
pub(crate) fn with_store<T>(
    op: impl FnOnce(&mut LocalStorage) -> Result<T, StorageError>,
) -> Result<T, String> {
    let mut store = LocalStorage::open().map_err(|err| err.to_string())?;
    op(&mut store).map_err(|err| err.to_string())
}

/// Только чтение; недоступное хранилище означает "ничего не сохранено".
pub(crate) fn read_store<T: Default>(op: impl FnOnce(&LocalStorage) -> T) -> T {
    match LocalStorage::open() {
        Ok(store) => op(&store),
        Err(err) => {
            web_sys::console::warn_1(&err.to_string().into());
            T::default()
        }
    }
}
