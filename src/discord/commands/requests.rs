use crate::core::requests::{RequestError, RequestStatus};
use crate::discord::desk::views;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

const LIST_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum StatusFilter {
    Open,
    Claimed,
    Closed,
}

impl From<StatusFilter> for RequestStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Open => RequestStatus::Open,
            StatusFilter::Claimed => RequestStatus::Claimed,
            StatusFilter::Closed => RequestStatus::Closed,
        }
    }
}

/// Browse requests filed on this server.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_MESSAGES",
    subcommands("list", "view")
)]
pub async fn requests(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// List the most recent requests.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn list(
    ctx: Context<'_>,
    #[description = "Only show requests with this status"] status: Option<StatusFilter>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let filter = status.map(RequestStatus::from);

    let requests = ctx.data().requests.list(guild_id, filter).await?;
    let settings = ctx.data().settings.get(guild_id).await?;

    let title = match filter {
        Some(s) => format!("📋 {} requests", views::status_label(s)),
        None => "📋 Requests".to_string(),
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(title)
        .color(serenity::Color::BLURPLE);

    if requests.is_empty() {
        embed = embed.description("Nothing here yet.");
    } else {
        let lines: Vec<String> = requests
            .iter()
            .take(LIST_LIMIT)
            .map(|r| views::request_line(r, settings.category_label(&r.category_key)))
            .collect();
        embed = embed.description(views::truncate(&lines.join("\n"), 4096));

        if requests.len() > LIST_LIMIT {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Showing {} of {} requests",
                LIST_LIMIT,
                requests.len()
            )));
        }
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Show a single request with its staff buttons.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn view(
    ctx: Context<'_>,
    #[description = "Request number"]
    #[min = 1]
    number: u64,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    let request = match ctx.data().requests.get(guild_id, number).await {
        Ok(request) => request,
        Err(RequestError::NotFound(_)) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(format!("❌ Request #{} does not exist.", number))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let settings = ctx.data().settings.get(guild_id).await?;
    let mut reply = poise::CreateReply::default()
        .embed(views::request_embed(
            &request,
            settings.category_label(&request.category_key),
        ))
        .components(views::request_components(&request))
        .ephemeral(true);

    if let (Some(channel_id), Some(message_id)) =
        (request.review_channel_id, request.review_message_id)
    {
        reply = reply.content(format!(
            "Review message: https://discord.com/channels/{}/{}/{}",
            guild_id, channel_id, message_id
        ));
    }

    ctx.send(reply).await?;
    Ok(())
}
