use async_trait::async_trait;
use log::warn;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use valley_core::model::{StudySubject, Theme};

use crate::keys::{CORRUPT_SUBJECTS_KEY, SUBJECTS_KEY, THEME_KEY};
use crate::records::{decode_collection, encode_collection};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Flat string key-value store holding the application's persisted state.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Outcome of reading the subject collection.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredCollection {
    /// Nothing has been persisted yet.
    Missing,
    Loaded(Vec<StudySubject>),
    /// A value exists but could not be decoded; `raw` is kept for recovery.
    Malformed { raw: String, reason: String },
}

/// Typed access to the subject collection key.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Read and decode the persisted collection.
    ///
    /// Decoding problems are reported as `StoredCollection::Malformed`, not as
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself fails.
    async fn load_subjects(&self) -> Result<StoredCollection, StorageError>;

    /// Persist the whole collection in a single write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    async fn save_subjects(&self, subjects: &[StudySubject]) -> Result<(), StorageError>;

    /// Keep an undecodable collection value aside before it gets overwritten.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn quarantine_subjects(&self, raw: &str) -> Result<(), StorageError>;
}

/// Typed access to the theme preference key.
#[async_trait]
pub trait ThemeRepository: Send + Sync {
    /// Read the stored theme. Unknown values are logged and read as `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_theme(&self) -> Result<Option<Theme>, StorageError>;

    /// Persist the theme preference.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn save_theme(&self, theme: Theme) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> SubjectRepository for S {
    async fn load_subjects(&self) -> Result<StoredCollection, StorageError> {
        let Some(raw) = self.get(SUBJECTS_KEY).await? else {
            return Ok(StoredCollection::Missing);
        };
        match decode_collection(&raw) {
            Ok(subjects) => Ok(StoredCollection::Loaded(subjects)),
            Err(err) => Ok(StoredCollection::Malformed {
                raw,
                reason: err.to_string(),
            }),
        }
    }

    async fn save_subjects(&self, subjects: &[StudySubject]) -> Result<(), StorageError> {
        let raw =
            encode_collection(subjects).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.set(SUBJECTS_KEY, &raw).await
    }

    async fn quarantine_subjects(&self, raw: &str) -> Result<(), StorageError> {
        self.set(CORRUPT_SUBJECTS_KEY, raw).await
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> ThemeRepository for S {
    async fn load_theme(&self) -> Result<Option<Theme>, StorageError> {
        let Some(raw) = self.get(THEME_KEY).await? else {
            return Ok(None);
        };
        match raw.parse::<Theme>() {
            Ok(theme) => Ok(Some(theme)),
            Err(err) => {
                warn!("ignoring stored theme preference: {err}");
                Ok(None)
            }
        }
    }

    async fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.set(THEME_KEY, theme.as_str()).await
    }
}

/// Simple in-memory store for testing and ephemeral sessions.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Holds the key-value backend behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        Self { kv }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valley_core::IdSource;
    use valley_core::editor::{SubjectDraft, SubjectEditor};

    fn subject(name: &str) -> StudySubject {
        let mut draft = SubjectDraft::blank();
        draft.name = name.into();
        SubjectEditor::new(IdSource::sequence(name)).submit(draft).unwrap()
    }

    #[tokio::test]
    async fn missing_key_reads_as_missing() {
        let store = InMemoryStore::new();
        assert_eq!(store.load_subjects().await.unwrap(), StoredCollection::Missing);
        assert_eq!(store.load_theme().await.unwrap(), None);
    }

    #[tokio::test]
    async fn round_trips_collection() {
        let store = InMemoryStore::new();
        let subjects = vec![subject("Guitar"), subject("Chess")];
        store.save_subjects(&subjects).await.unwrap();

        let loaded = store.load_subjects().await.unwrap();
        assert_eq!(loaded, StoredCollection::Loaded(subjects));
    }

    #[tokio::test]
    async fn malformed_value_is_reported_with_raw_text() {
        let store = InMemoryStore::new();
        store.set(SUBJECTS_KEY, "{not json").await.unwrap();

        match store.load_subjects().await.unwrap() {
            StoredCollection::Malformed { raw, reason } => {
                assert_eq!(raw, "{not json");
                assert!(reason.starts_with("malformed JSON"));
            }
            other => panic!("expected malformed, got {other:?}"),
        }

        store.quarantine_subjects("{not json").await.unwrap();
        assert_eq!(
            store.get(CORRUPT_SUBJECTS_KEY).await.unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[tokio::test]
    async fn theme_round_trips_and_ignores_garbage() {
        let store = InMemoryStore::new();
        store.save_theme(Theme::Dark).await.unwrap();
        assert_eq!(store.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));
        assert_eq!(store.load_theme().await.unwrap(), Some(Theme::Dark));

        store.set(THEME_KEY, "sepia").await.unwrap();
        assert_eq!(store.load_theme().await.unwrap(), None);
    }

    #[tokio::test]
    async fn trait_object_gets_typed_access() {
        let storage = Storage::in_memory();
        storage.kv.save_theme(Theme::Light).await.unwrap();
        assert_eq!(storage.kv.load_theme().await.unwrap(), Some(Theme::Light));
        storage.kv.remove(THEME_KEY).await.unwrap();
        assert_eq!(storage.kv.load_theme().await.unwrap(), None);
    }
}
