// Slash commands, one file per top-level command.

use crate::discord::{Data, Error};

pub mod help;

pub mod panel;

pub mod ping;

pub mod presence;

pub mod requests;

pub mod setup;

pub mod submit;

/// Every slash command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        help::help(),
        ping::ping(),
        submit::submit(),
        panel::panel(),
        setup::setup(),
        requests::requests(),
    ]
}
