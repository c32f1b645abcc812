use crate::core::requests::{DeskRequest, NewRequest, RequestStore};
use crate::core::settings::{GuildSettings, SettingsStore};
use crate::core::store_error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

const STATE_VERSION: u32 = 1;

/// Everything the bot persists, in a single JSON document:
/// { "version": 1, "guilds": { guild_id: { settings, next_number, requests: { number: request } } } }
#[derive(Debug, Serialize, Deserialize)]
struct StateDocument {
    version: u32,
    #[serde(default)]
    guilds: HashMap<u64, GuildState>,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            guilds: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GuildState {
    #[serde(default)]
    settings: Option<GuildSettings>,
    /// Last number handed out; the next request gets `next_number + 1`.
    #[serde(default)]
    next_number: u64,
    #[serde(default)]
    requests: BTreeMap<u64, DeskRequest>,
}

/// JSON-file backed store for settings and requests.
///
/// The in-memory document is the source of truth. Every mutation is written
/// to disk while the write lock is still held, so the file always reflects
/// the mutations in the order they happened. A mutation whose write fails is
/// rolled back in memory as well.
pub struct JsonStateStore {
    path: PathBuf,
    cache: RwLock<StateDocument>,
}

impl JsonStateStore {
    /// Load the state file, or start empty if it doesn't exist yet.
    /// A file that exists but can't be parsed is an error rather than being overwritten.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let document = match fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => StateDocument::default(),
            Ok(text) => {
                let document: StateDocument = serde_json::from_str(&text)?;
                if document.version != STATE_VERSION {
                    return Err(StoreError::UnsupportedVersion(document.version));
                }
                document
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StateDocument::default(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            path = %path.display(),
            guilds = document.guilds.len(),
            "Loaded state file"
        );

        Ok(Self {
            path,
            cache: RwLock::new(document),
        })
    }

    /// Apply `change` to one guild and persist, restoring the guild's previous
    /// state if the write fails.
    async fn mutate_guild<T, F>(&self, guild_id: u64, change: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut GuildState) -> T + Send,
        T: Send,
    {
        let mut cache = self.cache.write().await;
        let previous = cache.guilds.get(&guild_id).cloned();
        let output = change(cache.guilds.entry(guild_id).or_default());

        if let Err(e) = self.persist(&cache).await {
            match previous {
                Some(state) => cache.guilds.insert(guild_id, state),
                None => cache.guilds.remove(&guild_id),
            };
            tracing::error!(guild_id, path = %self.path.display(), "Failed to write state file: {e}");
            return Err(e);
        }
        Ok(output)
    }

    /// Write the document to `<path>.tmp` and rename it over the real file.
    async fn persist(&self, document: &StateDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let text = serde_json::to_string_pretty(document)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, text).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for JsonStateStore {
    async fn get_settings(&self, guild_id: u64) -> Result<Option<GuildSettings>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache
            .guilds
            .get(&guild_id)
            .and_then(|g| g.settings.clone()))
    }

    async fn save_settings(&self, settings: GuildSettings) -> Result<(), StoreError> {
        self.mutate_guild(settings.guild_id, move |guild| {
            guild.settings = Some(settings);
        })
        .await
    }
}

#[async_trait]
impl RequestStore for JsonStateStore {
    async fn insert_request(&self, request: NewRequest) -> Result<DeskRequest, StoreError> {
        self.mutate_guild(request.guild_id, move |guild| {
            guild.next_number += 1;
            let request = request.into_request(guild.next_number);
            guild.requests.insert(request.number, request.clone());
            request
        })
        .await
    }

    async fn get_request(
        &self,
        guild_id: u64,
        number: u64,
    ) -> Result<Option<DeskRequest>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache
            .guilds
            .get(&guild_id)
            .and_then(|g| g.requests.get(&number).cloned()))
    }

    async fn save_request(&self, request: DeskRequest) -> Result<(), StoreError> {
        self.mutate_guild(request.guild_id, move |guild| {
            // Keep the counter ahead of any number we store
            guild.next_number = guild.next_number.max(request.number);
            guild.requests.insert(request.number, request);
        })
        .await
    }

    async fn list_requests(&self, guild_id: u64) -> Result<Vec<DeskRequest>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache
            .guilds
            .get(&guild_id)
            .map(|g| g.requests.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn all_requests(&self) -> Result<Vec<DeskRequest>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache
            .guilds
            .values()
            .flat_map(|g| g.requests.values().cloned())
            .collect())
    }
}
