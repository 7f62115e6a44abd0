use std::sync::Arc;

use log::debug;
use storage::repository::{KeyValueStore, ThemeRepository};
use valley_core::model::Theme;

use crate::error::ThemeServiceError;

/// Reads and updates the persisted theme preference.
#[derive(Clone)]
pub struct ThemeService {
    kv: Arc<dyn KeyValueStore>,
    default_theme: Theme,
}

impl ThemeService {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, default_theme: Theme) -> Self {
        Self { kv, default_theme }
    }

    /// Load the persisted theme, or the configured default if none is stored.
    ///
    /// # Errors
    ///
    /// Returns `ThemeServiceError` on storage failures.
    pub async fn load(&self) -> Result<Theme, ThemeServiceError> {
        let theme = self.kv.load_theme().await?;
        Ok(theme.unwrap_or(self.default_theme))
    }

    /// Persist a theme choice.
    ///
    /// # Errors
    ///
    /// Returns `ThemeServiceError` if the write fails.
    pub async fn set(&self, theme: Theme) -> Result<Theme, ThemeServiceError> {
        self.kv.save_theme(theme).await?;
        debug!("theme set to {theme}");
        Ok(theme)
    }

    /// Flip between dark and light and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `ThemeServiceError` on storage failures.
    pub async fn toggle(&self) -> Result<Theme, ThemeServiceError> {
        let current = self.load().await?;
        self.set(current.toggled()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::InMemoryStore;

    #[tokio::test]
    async fn load_uses_default_until_set() {
        let service = ThemeService::new(Arc::new(InMemoryStore::new()), Theme::Light);
        assert_eq!(service.load().await.unwrap(), Theme::Light);

        service.set(Theme::Dark).await.unwrap();
        assert_eq!(service.load().await.unwrap(), Theme::Dark);
    }

    #[tokio::test]
    async fn toggle_flips_and_persists() {
        let kv = InMemoryStore::new();
        let service = ThemeService::new(Arc::new(kv.clone()), Theme::Dark);

        assert_eq!(service.toggle().await.unwrap(), Theme::Light);
        assert_eq!(service.toggle().await.unwrap(), Theme::Dark);

        let reopened = ThemeService::new(Arc::new(kv), Theme::Light);
        assert_eq!(reopened.load().await.unwrap(), Theme::Dark);
    }
}
