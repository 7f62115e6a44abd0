use std::sync::Arc;

use storage::repository::Storage;
use valley_core::IdSource;
use valley_core::editor::SubjectEditor;
use valley_core::model::Theme;

use crate::error::AppServicesError;
use crate::subject_store::{LoadReport, SubjectStore};
use crate::theme_service::ThemeService;

/// Assembles app-facing services over one storage backend and loads the
/// subject collection.
#[derive(Clone)]
pub struct AppServices {
    subjects: Arc<SubjectStore>,
    theme: Arc<ThemeService>,
    load_report: LoadReport,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the initial
    /// load fails.
    pub async fn new_sqlite(
        db_url: &str,
        ids: IdSource,
        default_theme: Theme,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(&storage, ids, default_theme).await
    }

    /// Build services over a throwaway in-memory store.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the initial load fails.
    pub async fn in_memory(ids: IdSource, default_theme: Theme) -> Result<Self, AppServicesError> {
        Self::from_storage(&Storage::in_memory(), ids, default_theme).await
    }

    /// Build services over an existing storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the initial load fails.
    pub async fn from_storage(
        storage: &Storage,
        ids: IdSource,
        default_theme: Theme,
    ) -> Result<Self, AppServicesError> {
        let subjects = Arc::new(SubjectStore::new(
            Arc::clone(&storage.kv),
            SubjectEditor::new(ids),
        ));
        let theme = Arc::new(ThemeService::new(Arc::clone(&storage.kv), default_theme));
        let load_report = subjects.load().await?;

        Ok(Self {
            subjects,
            theme,
            load_report,
        })
    }

    #[must_use]
    pub fn subjects(&self) -> Arc<SubjectStore> {
        Arc::clone(&self.subjects)
    }

    #[must_use]
    pub fn theme(&self) -> Arc<ThemeService> {
        Arc::clone(&self.theme)
    }

    /// How the collection was obtained at startup.
    #[must_use]
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }
}
