use crate::core::settings::{GuildSettings, SettingsError};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Configure the request desk for this server.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands("show", "channel", "category_add", "category_remove", "limits")
)]
pub async fn setup(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show the current desk configuration.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let settings = ctx.data().settings.get(guild_id).await?;

    ctx.send(
        poise::CreateReply::default()
            .embed(settings_embed(&settings))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Select the staff channel where new requests are posted.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn channel(
    ctx: Context<'_>,
    #[description = "Channel for new requests"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let channel_id = channel.id.get();

    ctx.data()
        .settings
        .set_review_channel(guild_id, channel_id)
        .await?;
    tracing::info!(guild_id, channel_id, "Review channel configured");

    ctx.say(format!("✅ New requests will be posted in <#{}>.", channel_id))
        .await?;
    Ok(())
}

/// Add a request category to the panel.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn category_add(
    ctx: Context<'_>,
    #[description = "Short id, e.g. `billing` (a-z, 0-9, - and _)"] key: String,
    #[description = "Name shown in the menu"] label: String,
    #[description = "One-line explanation shown under the name"] description: Option<String>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    let result = ctx
        .data()
        .settings
        .add_category(guild_id, &key, &label, description.as_deref())
        .await;

    match result {
        Ok(settings) => {
            ctx.say(format!(
                "✅ Category added. The panel now offers {} categories; run `/panel` again to refresh it.",
                settings.categories.len()
            ))
            .await?;
        }
        Err(e) => reply_settings_error(ctx, e).await?,
    }
    Ok(())
}

/// Remove a request category from the panel.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn category_remove(
    ctx: Context<'_>,
    #[description = "Category to remove"]
    #[autocomplete = "autocomplete_category"]
    key: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    match ctx.data().settings.remove_category(guild_id, &key).await {
        Ok(_) => {
            ctx.say(format!(
                "🗑️ Category `{}` removed. Existing requests keep their category; run `/panel` again to refresh the menu.",
                key
            ))
            .await?;
        }
        Err(e) => reply_settings_error(ctx, e).await?,
    }
    Ok(())
}

/// Limit how often members can file requests.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn limits(
    ctx: Context<'_>,
    #[description = "Open requests allowed per member (0 = unlimited)"]
    #[max = 50]
    max_open: u32,
    #[description = "Seconds between two submissions (0 = no cooldown)"]
    #[max = 86400]
    cooldown_secs: u64,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    let settings = ctx
        .data()
        .settings
        .set_limits(guild_id, max_open, cooldown_secs)
        .await?;

    ctx.say(format!(
        "✅ Limits updated: {} open request(s) per member, {} cooldown.",
        describe_limit(settings.max_open_per_user as u64, "", "unlimited"),
        describe_limit(settings.submission_cooldown_secs, "s", "no")
    ))
    .await?;
    Ok(())
}

/// Autocomplete the categories configured for the current guild.
pub async fn autocomplete_category<'a>(
    ctx: Context<'_>,
    partial: &'a str,
) -> impl Iterator<Item = serenity::AutocompleteChoice> + 'a {
    let categories = match ctx.guild_id() {
        Some(guild_id) => ctx
            .data()
            .settings
            .get(guild_id.get())
            .await
            .map(|s| s.categories)
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let partial = partial.to_lowercase();
    categories
        .into_iter()
        .filter(move |c| {
            c.key.contains(&partial) || c.label.to_lowercase().contains(&partial)
        })
        .map(|c| serenity::AutocompleteChoice::new(c.label, c.key))
}

/// `off` is shown for 0, which disables the limit.
fn describe_limit(value: u64, unit: &str, off: &str) -> String {
    if value == 0 {
        off.to_string()
    } else {
        format!("{value}{unit}")
    }
}

fn settings_embed(settings: &GuildSettings) -> serenity::CreateEmbed {
    let channel = settings
        .review_channel_id
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "Not set, use `/setup channel`".to_string());

    let categories = settings
        .categories
        .iter()
        .map(|c| format!("• `{}` {}", c.key, c.label))
        .collect::<Vec<_>>()
        .join("\n");

    serenity::CreateEmbed::default()
        .title("Request Desk Configuration")
        .color(serenity::Color::BLURPLE)
        .field("Review Channel", channel, false)
        .field(
            "Open requests per member",
            describe_limit(settings.max_open_per_user as u64, "", "Unlimited"),
            true,
        )
        .field(
            "Submission cooldown",
            describe_limit(settings.submission_cooldown_secs, "s", "Off"),
            true,
        )
        .field("Categories", categories, false)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Guild ID: {}",
            settings.guild_id
        )))
        .timestamp(serenity::Timestamp::now())
}

/// Validation problems go back to the admin; storage failures are real errors.
async fn reply_settings_error(ctx: Context<'_>, error: SettingsError) -> Result<(), Error> {
    match error {
        SettingsError::Store(e) => Err(e.into()),
        other => {
            ctx.send(
                poise::CreateReply::default()
                    .content(format!("❌ {other}"))
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limits_read_as_no_limit() {
        assert_eq!(describe_limit(0, "s", "Off"), "Off");
        assert_eq!(describe_limit(0, "", "unlimited"), "unlimited");
        assert_eq!(describe_limit(3, "", "unlimited"), "3");
        assert_eq!(describe_limit(60, "s", "Off"), "60s");
    }
}
