use crate::discord::commands::setup::autocomplete_category;
use crate::discord::desk::views;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::sync::atomic::Ordering;

/// Open a new request without going through the panel.
#[poise::command(slash_command, guild_only)]
pub async fn submit(
    ctx: Context<'_>,
    #[description = "What is your request about?"]
    #[autocomplete = "autocomplete_category"]
    category: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let settings = ctx.data().settings.get(guild_id).await?;

    if settings.review_channel_id.is_none() {
        ctx.send(
            poise::CreateReply::default()
                .content("Requests are not set up on this server yet. Ask an admin to run `/setup channel`.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let Some(category) = settings.category(&category.trim().to_lowercase()).cloned() else {
        ctx.send(
            poise::CreateReply::default()
                .content(format!("❌ Unknown category `{}`.", category))
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };

    // Modals can only be the first response to an interaction, so answer the
    // raw interaction and tell poise we've done so. The submitted modal is
    // handled by the desk interaction handler like one opened from the panel.
    let poise::Context::Application(app) = ctx else {
        return Err("This command only works as a slash command".into());
    };
    app.interaction
        .create_response(
            ctx.http(),
            serenity::CreateInteractionResponse::Modal(views::submission_modal(&category)),
        )
        .await?;
    app.has_sent_initial_response.store(true, Ordering::SeqCst);

    Ok(())
}
