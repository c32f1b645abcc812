// Per-guild desk settings: review channel, categories and submission limits.
//
// NO Discord dependencies here - the Discord layer hands us plain ids and strings.

use super::settings_models::{
    Category, GuildSettings, MAX_CATEGORIES, MAX_CATEGORY_DESCRIPTION_LEN, MAX_CATEGORY_KEY_LEN,
    MAX_CATEGORY_LABEL_LEN, MAX_SUBMISSION_COOLDOWN_SECS,
};
use super::settings_store::SettingsStore;
use crate::core::store_error::StoreError;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Category `{0}` already exists")]
    DuplicateCategory(String),
    #[error("Unknown category `{0}`")]
    UnknownCategory(String),
    #[error("A server can have at most 25 categories")]
    TooManyCategories,
    #[error("The last category cannot be removed")]
    LastCategory,
}

pub struct SettingsService<S: SettingsStore> {
    store: Arc<S>,
    // Serialises read-modify-write updates so two admins can't clobber each other.
    update_lock: Mutex<()>,
}

impl<S: SettingsStore> SettingsService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            update_lock: Mutex::new(()),
        }
    }

    /// Settings for a guild, or the defaults if nothing was configured yet.
    pub async fn get(&self, guild_id: u64) -> Result<GuildSettings, SettingsError> {
        Ok(self
            .store
            .get_settings(guild_id)
            .await?
            .unwrap_or_else(|| GuildSettings::default_for(guild_id)))
    }

    pub async fn set_review_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<GuildSettings, SettingsError> {
        self.update(guild_id, |settings| {
            settings.review_channel_id = Some(channel_id);
            Ok(())
        })
        .await
    }

    pub async fn add_category(
        &self,
        guild_id: u64,
        key: &str,
        label: &str,
        description: Option<&str>,
    ) -> Result<GuildSettings, SettingsError> {
        let category = validate_category(key, label, description)?;
        self.update(guild_id, move |settings| {
            if settings.category(&category.key).is_some() {
                return Err(SettingsError::DuplicateCategory(category.key));
            }
            if settings.categories.len() >= MAX_CATEGORIES {
                return Err(SettingsError::TooManyCategories);
            }
            settings.categories.push(category);
            Ok(())
        })
        .await
    }

    pub async fn remove_category(
        &self,
        guild_id: u64,
        key: &str,
    ) -> Result<GuildSettings, SettingsError> {
        let key = key.trim().to_lowercase();
        self.update(guild_id, move |settings| {
            let index = settings
                .categories
                .iter()
                .position(|c| c.key == key)
                .ok_or_else(|| SettingsError::UnknownCategory(key.clone()))?;
            if settings.categories.len() == 1 {
                return Err(SettingsError::LastCategory);
            }
            settings.categories.remove(index);
            Ok(())
        })
        .await
    }

    /// Cooldowns above a day are capped to a day.
    pub async fn set_limits(
        &self,
        guild_id: u64,
        max_open_per_user: u32,
        submission_cooldown_secs: u64,
    ) -> Result<GuildSettings, SettingsError> {
        self.update(guild_id, |settings| {
            settings.max_open_per_user = max_open_per_user;
            settings.submission_cooldown_secs =
                submission_cooldown_secs.min(MAX_SUBMISSION_COOLDOWN_SECS);
            Ok(())
        })
        .await
    }

    async fn update<F>(&self, guild_id: u64, change: F) -> Result<GuildSettings, SettingsError>
    where
        F: FnOnce(&mut GuildSettings) -> Result<(), SettingsError>,
    {
        let _guard = self.update_lock.lock().await;
        let mut settings = self.get(guild_id).await?;
        change(&mut settings)?;
        self.store.save_settings(settings.clone()).await?;
        Ok(settings)
    }
}

/// Normalise and validate a category before it is stored.
pub fn validate_category(
    key: &str,
    label: &str,
    description: Option<&str>,
) -> Result<Category, SettingsError> {
    let key = key.trim().to_lowercase();
    if key.is_empty() || key.chars().count() > MAX_CATEGORY_KEY_LEN {
        return Err(SettingsError::InvalidCategory(format!(
            "key must be 1-{MAX_CATEGORY_KEY_LEN} characters"
        )));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(SettingsError::InvalidCategory(
            "key may only contain a-z, 0-9, '-' and '_'".to_string(),
        ));
    }

    let label = label.trim();
    if label.is_empty() || label.chars().count() > MAX_CATEGORY_LABEL_LEN {
        return Err(SettingsError::InvalidCategory(format!(
            "label must be 1-{MAX_CATEGORY_LABEL_LEN} characters"
        )));
    }

    let description = description.map(str::trim).filter(|d| !d.is_empty());
    if let Some(d) = description {
        if d.chars().count() > MAX_CATEGORY_DESCRIPTION_LEN {
            return Err(SettingsError::InvalidCategory(format!(
                "description must be at most {MAX_CATEGORY_DESCRIPTION_LEN} characters"
            )));
        }
    }

    Ok(Category::new(&key, label, description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashmap::DashMap;

    /// In-memory store for testing
    struct MockSettingsStore {
        settings: DashMap<u64, GuildSettings>,
    }

    impl MockSettingsStore {
        fn new() -> Self {
            Self {
                settings: DashMap::new(),
            }
        }
    }

    #[async_trait]
    impl SettingsStore for MockSettingsStore {
        async fn get_settings(&self, guild_id: u64) -> Result<Option<GuildSettings>, StoreError> {
            Ok(self.settings.get(&guild_id).map(|s| s.value().clone()))
        }

        async fn save_settings(&self, settings: GuildSettings) -> Result<(), StoreError> {
            self.settings.insert(settings.guild_id, settings);
            Ok(())
        }
    }

    fn service() -> SettingsService<MockSettingsStore> {
        SettingsService::new(Arc::new(MockSettingsStore::new()))
    }

    #[tokio::test]
    async fn unconfigured_guild_gets_defaults() {
        let service = service();
        let settings = service.get(1).await.unwrap();
        assert_eq!(settings, GuildSettings::default_for(1));
        assert!(settings.review_channel_id.is_none());
        assert_eq!(settings.categories.len(), 3);
    }

    #[tokio::test]
    async fn review_channel_is_persisted() {
        let service = service();
        service.set_review_channel(1, 99).await.unwrap();
        assert_eq!(service.get(1).await.unwrap().review_channel_id, Some(99));
        // Other guilds are untouched
        assert!(service.get(2).await.unwrap().review_channel_id.is_none());
    }

    #[tokio::test]
    async fn add_category_normalises_key() {
        let service = service();
        let settings = service
            .add_category(1, "  Billing ", "Billing help", Some("  "))
            .await
            .unwrap();
        let added = settings.category("billing").unwrap();
        assert_eq!(added.label, "Billing help");
        assert_eq!(added.description, None);
    }

    #[tokio::test]
    async fn duplicate_category_rejected() {
        let service = service();
        let err = service
            .add_category(1, "general", "Again", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::DuplicateCategory(k) if k == "general"));
    }

    #[tokio::test]
    async fn category_limit_enforced() {
        let service = service();
        for i in 0..(MAX_CATEGORIES - 3) {
            service
                .add_category(1, &format!("extra-{i}"), "Extra", None)
                .await
                .unwrap();
        }
        let err = service
            .add_category(1, "one-too-many", "Nope", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::TooManyCategories));
    }

    #[tokio::test]
    async fn remove_category_keeps_at_least_one() {
        let service = service();
        service.remove_category(1, "bug").await.unwrap();
        service.remove_category(1, "IDEA").await.unwrap();
        let err = service.remove_category(1, "general").await.unwrap_err();
        assert!(matches!(err, SettingsError::LastCategory));

        let err = service.remove_category(1, "missing").await.unwrap_err();
        assert!(matches!(err, SettingsError::UnknownCategory(_)));
    }

    #[tokio::test]
    async fn limits_update() {
        let service = service();
        let settings = service.set_limits(1, 0, 0).await.unwrap();
        assert_eq!(settings.max_open_per_user, 0);
        assert_eq!(settings.submission_cooldown_secs, 0);

        let settings = service.set_limits(1, 2, 7 * 86_400).await.unwrap();
        assert_eq!(settings.submission_cooldown_secs, MAX_SUBMISSION_COOLDOWN_SECS);
    }

    #[test]
    fn category_validation_rules() {
        assert!(validate_category("", "Label", None).is_err());
        assert!(validate_category("has space", "Label", None).is_err());
        assert!(validate_category("ok", "   ", None).is_err());
        assert!(validate_category(&"k".repeat(33), "Label", None).is_err());
        assert!(validate_category("ok", &"l".repeat(81), None).is_err());
        assert!(validate_category("ok", "Label", Some(&"d".repeat(101))).is_err());
        assert!(validate_category("snake_case-1", "Label", Some("Fine")).is_ok());
    }
}
