//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use valley_core::editor::EditorError;

/// Errors emitted by `SubjectStore`.
///
/// Failed writes are not errors: they are reported through
/// [`crate::subject_store::Persistence`] so the session can continue on the
/// in-memory collection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] EditorError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("subject collection lock poisoned")]
    Poisoned,
}

/// Errors emitted by `ThemeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ThemeServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
