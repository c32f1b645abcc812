use crate::discord::desk::views;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Post the request panel (embed + category menu) in a channel.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn panel(
    ctx: Context<'_>,
    #[description = "Where to post the panel (defaults to this channel)"]
    #[channel_types("Text")]
    channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let settings = ctx.data().settings.get(guild_id).await?;

    if settings.review_channel_id.is_none() {
        ctx.send(
            poise::CreateReply::default()
                .content("Please pick a review channel first using `/setup channel #channel`.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let target = channel.map(|c| c.id).unwrap_or_else(|| ctx.channel_id());
    let message = serenity::CreateMessage::new()
        .embed(views::panel_embed(&settings))
        .components(views::panel_components(&settings));

    target.send_message(ctx.http(), message).await?;
    tracing::info!(guild_id, channel_id = target.get(), "Request panel posted");

    ctx.send(
        poise::CreateReply::default()
            .content(format!("✅ Panel posted in <#{}>.", target.get()))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
