use serde::{Deserialize, Serialize};

/// Discord caps a string select menu at 25 options.
pub const MAX_CATEGORIES: usize = 25;
pub const MAX_CATEGORY_KEY_LEN: usize = 32;
pub const MAX_CATEGORY_LABEL_LEN: usize = 80;
pub const MAX_CATEGORY_DESCRIPTION_LEN: usize = 100;

pub const DEFAULT_MAX_OPEN_PER_USER: u32 = 3;
pub const DEFAULT_SUBMISSION_COOLDOWN_SECS: u64 = 60;
pub const MAX_SUBMISSION_COOLDOWN_SECS: u64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Category {
    pub fn new(key: &str, label: &str, description: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            description: description.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSettings {
    pub guild_id: u64,
    pub review_channel_id: Option<u64>,
    pub categories: Vec<Category>,
    /// Open + claimed requests a single member may have. 0 = unlimited.
    pub max_open_per_user: u32,
    /// Seconds between two submissions of the same member. 0 = off.
    pub submission_cooldown_secs: u64,
}

impl GuildSettings {
    pub fn default_for(guild_id: u64) -> Self {
        Self {
            guild_id,
            review_channel_id: None,
            categories: vec![
                Category::new("general", "General question", Some("Anything that needs a hand")),
                Category::new("bug", "Report a problem", Some("Something is broken")),
                Category::new("idea", "Suggestion", Some("Ideas for the server")),
            ],
            max_open_per_user: DEFAULT_MAX_OPEN_PER_USER,
            submission_cooldown_secs: DEFAULT_SUBMISSION_COOLDOWN_SECS,
        }
    }

    pub fn category(&self, key: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Label for a category key, falling back to the key itself for
    /// categories removed after a request was filed.
    pub fn category_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.category(key).map(|c| c.label.as_str()).unwrap_or(key)
    }
}
