// Discord layer - commands, component handlers and the views they render.

use crate::core::requests::RequestService;
use crate::core::settings::SettingsService;
use crate::core::status::BotStatus;
use crate::infra::state::JsonStateStore;
use std::sync::Arc;

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "desk/mod.rs"]
pub mod desk;

pub mod registration;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared state handed to every command and event handler.
pub struct Data {
    pub settings: Arc<SettingsService<JsonStateStore>>,
    pub requests: Arc<RequestService<JsonStateStore>>,
    pub status: Arc<BotStatus>,
}
