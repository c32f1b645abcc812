// Slash command registration through the REST API.

use crate::core::config::CommandScope;
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

/// Push the command definitions to Discord.
///
/// Global registration can take up to an hour to propagate, so a guild scope
/// is the better choice while developing.
pub async fn register_commands(
    ctx: &serenity::Context,
    commands: &[poise::Command<Data, Error>],
    scope: CommandScope,
) -> Result<(), serenity::Error> {
    match scope {
        CommandScope::Global => {
            poise::builtins::register_globally(ctx, commands).await?;
            tracing::info!(count = commands.len(), "Registered slash commands globally");
        }
        CommandScope::Guild(guild_id) => {
            poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(guild_id))
                .await?;
            tracing::info!(
                count = commands.len(),
                guild_id,
                "Registered slash commands in guild"
            );
        }
    }
    Ok(())
}
