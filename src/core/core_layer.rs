// Core layer: desk settings, the request lifecycle and process status.
// Nothing in here knows about Discord or the state file format.

#[path = "config/bot_config.rs"]
pub mod config;

#[path = "requests/mod.rs"]
pub mod requests;

#[path = "settings/mod.rs"]
pub mod settings;

#[path = "status/bot_status.rs"]
pub mod status;

pub mod store_error;
