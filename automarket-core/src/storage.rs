//! Клиентское key-value хранилище (аналог `localStorage`).
//!
//! В браузере это `window.localStorage`, в CLI JSON-файл в каталоге
//! состояния, в тестах `MemoryStore`.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::filters::{CarFilters, FilterSession};

/// Ключ bearer-токена.
pub const TOKEN_KEY: &str = "token";
/// Ключ снимка применённых фильтров (серверная нотация).
pub const FILTERS_KEY: &str = "carFilters";
/// Ключ черновика фильтров, который ещё не применён.
pub const FILTERS_DRAFT_KEY: &str = "carFiltersDraft";

/// Ошибка хранилища.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Хранилище недоступно (нет `window`, запрещён `localStorage`, ...).
    #[error("storage is not available: {0}")]
    Unavailable(String),

    /// Ошибка чтения/записи.
    #[error("storage io error: {0}")]
    Io(String),

    /// Значение не удалось сериализовать.
    #[error("storage encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Минимальный интерфейс `localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Хранилище в памяти.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

fn parse_token(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn parse_filters(raw: &str) -> Option<CarFilters> {
    let value = serde_json::from_str::<serde_json::Value>(raw).ok()?;
    CarFilters::from_json_lenient(&value)
}

/// Читает токен; пустое значение считается отсутствующим.
pub fn load_token(store: &impl KeyValueStore) -> Option<String> {
    match store.get_item(TOKEN_KEY) {
        Ok(raw) => raw.as_deref().and_then(parse_token),
        Err(err) => {
            warn!(error = %err, "failed to read token");
            None
        }
    }
}

pub fn save_token(store: &mut impl KeyValueStore, token: &str) -> Result<(), StorageError> {
    store.set_item(TOKEN_KEY, token.trim())
}

pub fn clear_token(store: &mut impl KeyValueStore) -> Result<(), StorageError> {
    store.remove_item(TOKEN_KEY)
}

/// Читает снимок фильтров по ключу. Повреждённый JSON даёт `None`.
pub fn load_filters(store: &impl KeyValueStore, key: &str) -> Option<CarFilters> {
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(error = %err, key, "failed to read filters");
            return None;
        }
    };

    let filters = parse_filters(&raw);
    if filters.is_none() {
        warn!(key, "ignoring corrupt filters snapshot");
    }
    filters
}

/// Сохраняет снимок фильтров в серверной нотации.
pub fn save_filters(
    store: &mut impl KeyValueStore,
    key: &str,
    filters: &CarFilters,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(&filters.to_server_json())?;
    store.set_item(key, &raw)
}

/// Восстанавливает сессию фильтров: применённые + черновик.
///
/// Без черновика сессия начинается с копии применённых фильтров.
pub fn load_session(store: &impl KeyValueStore) -> FilterSession {
    let applied = load_filters(store, FILTERS_KEY).unwrap_or_default();
    match load_filters(store, FILTERS_DRAFT_KEY) {
        Some(draft) => FilterSession::with_draft(applied, draft),
        None => FilterSession::new(applied),
    }
}

/// Сохраняет сессию. Черновик пишется только если он отличается.
pub fn save_session(
    store: &mut impl KeyValueStore,
    session: &FilterSession,
) -> Result<(), StorageError> {
    save_filters(store, FILTERS_KEY, session.applied())?;
    if session.is_dirty() {
        save_filters(store, FILTERS_DRAFT_KEY, session.temp())
    } else {
        store.remove_item(FILTERS_DRAFT_KEY)
    }
}

/// Удаляет все сохранённые фильтры.
pub fn clear_filters(store: &mut impl KeyValueStore) -> Result<(), StorageError> {
    store.remove_item(FILTERS_KEY)?;
    store.remove_item(FILTERS_DRAFT_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterField;

    #[test]
    fn parse_token_trims_and_returns_value() {
        let token = parse_token("  abc.def.ghi  ");
        assert_eq!(token.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn parse_token_rejects_blank() {
        assert!(parse_token("   ").is_none());
    }

    #[test]
    fn token_round_trip_through_store() {
        let mut store = MemoryStore::new();
        assert!(load_token(&store).is_none());

        save_token(&mut store, " jwt ").expect("save must succeed");
        assert_eq!(load_token(&store).as_deref(), Some("jwt"));

        clear_token(&mut store).expect("clear must succeed");
        assert!(load_token(&store).is_none());
    }

    #[test]
    fn filters_are_persisted_in_server_naming() {
        let mut store = MemoryStore::new();
        let filters = CarFilters::default().with(FilterField::FuelType, "electric");

        save_filters(&mut store, FILTERS_KEY, &filters).expect("save must succeed");

        let raw = store
            .get_item(FILTERS_KEY)
            .expect("read must succeed")
            .expect("value must exist");
        assert!(raw.contains("\"fuel_type\":\"electric\""));
        assert_eq!(load_filters(&store, FILTERS_KEY), Some(filters));
    }

    #[test]
    fn corrupt_filters_snapshot_is_ignored() {
        let mut store = MemoryStore::new();
        store
            .set_item(FILTERS_KEY, "{not-json}")
            .expect("set must succeed");
        assert!(load_filters(&store, FILTERS_KEY).is_none());
        assert_eq!(load_session(&store), FilterSession::default());
    }

    #[test]
    fn session_round_trip_keeps_draft_only_when_dirty() {
        let mut store = MemoryStore::new();
        let mut session = FilterSession::new(CarFilters::default().with(FilterField::Make, "BYD"));
        session.set(FilterField::Color, "white");

        save_session(&mut store, &session).expect("save must succeed");
        assert_eq!(load_session(&store), session);

        session.apply();
        save_session(&mut store, &session).expect("save must succeed");
        assert!(
            store
                .get_item(FILTERS_DRAFT_KEY)
                .expect("read must succeed")
                .is_none()
        );
        assert_eq!(load_session(&store), session);
    }
}
