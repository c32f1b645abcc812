use super::settings_models::GuildSettings;
use crate::core::store_error::StoreError;
use async_trait::async_trait;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Stored settings, `None` if the guild never changed anything.
    async fn get_settings(&self, guild_id: u64) -> Result<Option<GuildSettings>, StoreError>;
    async fn save_settings(&self, settings: GuildSettings) -> Result<(), StoreError>;
}
