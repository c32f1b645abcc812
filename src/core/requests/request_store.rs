use super::request_models::{DeskRequest, NewRequest};
use crate::core::store_error::StoreError;
use async_trait::async_trait;

#[async_trait]
pub trait RequestStore: Send + Sync {
    /// File a new request under the next free number of its guild.
    /// Numbers start at 1 and are never reused.
    async fn insert_request(&self, request: NewRequest) -> Result<DeskRequest, StoreError>;

    async fn get_request(
        &self,
        guild_id: u64,
        number: u64,
    ) -> Result<Option<DeskRequest>, StoreError>;

    /// Overwrite an existing request (matched by guild + number).
    async fn save_request(&self, request: DeskRequest) -> Result<(), StoreError>;

    async fn list_requests(&self, guild_id: u64) -> Result<Vec<DeskRequest>, StoreError>;

    async fn all_requests(&self) -> Result<Vec<DeskRequest>, StoreError>;
}
