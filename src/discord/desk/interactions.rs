// Handlers for the desk's components and modals.
//
// Same pattern as the commands:
// 1. Pull plain ids and strings out of the interaction
// 2. Call the core services
// 3. Answer with a view from `views`
//
// User-facing problems (limits, bad input, missing permissions) are answered
// ephemerally; only storage and Discord API failures bubble up as errors.

use super::custom_ids::{DeskComponent, DETAILS_INPUT, SUBJECT_INPUT};
use super::views;
use crate::core::requests::{Actor, DeskRequest, RequestAction, RequestError, Submission};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

/// Entry point from the gateway event handler. Ignores anything that isn't ours.
pub async fn handle_interaction(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::Interaction,
) -> Result<(), Error> {
    match interaction {
        serenity::Interaction::Component(component) => {
            match DeskComponent::parse(&component.data.custom_id) {
                Some(DeskComponent::Pick) => handle_pick(ctx, data, component).await,
                Some(DeskComponent::Action { action, number }) => {
                    handle_action(ctx, data, component, action, number).await
                }
                _ => Ok(()),
            }
        }
        serenity::Interaction::Modal(modal) => match DeskComponent::parse(&modal.data.custom_id) {
            Some(DeskComponent::Form { category }) => {
                handle_form(ctx, data, modal, &category).await
            }
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

fn ephemeral(content: impl Into<String>) -> serenity::CreateInteractionResponse {
    serenity::CreateInteractionResponse::Message(
        serenity::CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    )
}

/// A category was picked on the panel: open the submission form.
async fn handle_pick(
    ctx: &serenity::Context,
    data: &Data,
    component: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    let Some(guild_id) = component.guild_id else {
        return Ok(());
    };

    let key = match &component.data.kind {
        serenity::ComponentInteractionDataKind::StringSelect { values } => values.first().cloned(),
        _ => None,
    };
    let Some(key) = key else {
        return Ok(());
    };

    let settings = data.settings.get(guild_id.get()).await?;
    let response = if settings.review_channel_id.is_none() {
        ephemeral("Requests are not set up on this server yet. Ask an admin to run `/setup channel`.")
    } else {
        match settings.category(&key) {
            Some(category) => {
                serenity::CreateInteractionResponse::Modal(views::submission_modal(category))
            }
            None => ephemeral("That category no longer exists. Please pick another one."),
        }
    };

    component.create_response(&ctx.http, response).await?;
    Ok(())
}

/// The submission form came back: file the request and post it for review.
async fn handle_form(
    ctx: &serenity::Context,
    data: &Data,
    modal: &serenity::ModalInteraction,
    category: &str,
) -> Result<(), Error> {
    let Some(guild_id) = modal.guild_id else {
        return Ok(());
    };
    let guild_id = guild_id.get();

    let submission = Submission {
        author_id: modal.user.id.get(),
        category_key: category.to_string(),
        subject: input_value(&modal.data.components, SUBJECT_INPUT).unwrap_or_default(),
        details: input_value(&modal.data.components, DETAILS_INPUT).unwrap_or_default(),
    };

    let settings = data.settings.get(guild_id).await?;
    let request = match data.requests.submit(&settings, submission).await {
        Ok(request) => request,
        Err(RequestError::Store(e)) => return Err(e.into()),
        Err(e) => {
            modal
                .create_response(&ctx.http, ephemeral(format!("❌ {e}")))
                .await?;
            return Ok(());
        }
    };

    // Answer within the interaction deadline before doing more HTTP work.
    modal
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(views::submission_confirmation(&request)),
        )
        .await?;

    let Some(channel_id) = settings.review_channel_id else {
        return Ok(());
    };
    let label = settings.category_label(&request.category_key);
    let message = serenity::CreateMessage::new()
        .embed(views::request_embed(&request, label))
        .components(views::request_components(&request));

    match serenity::ChannelId::new(channel_id)
        .send_message(&ctx.http, message)
        .await
    {
        Ok(posted) => {
            data.requests
                .attach_review_message(guild_id, request.number, channel_id, posted.id.get())
                .await?;
        }
        Err(e) => {
            tracing::warn!(
                guild_id,
                channel_id,
                number = request.number,
                "Failed to post request to review channel: {e}"
            );
            let followup = serenity::CreateInteractionResponseFollowup::new()
                .content("⚠️ Your request was saved, but I couldn't post it to the staff channel. Please let a moderator know.")
                .ephemeral(true);
            if let Err(e) = modal.create_followup(&ctx.http, followup).await {
                tracing::warn!("Failed to send follow-up: {e}");
            }
        }
    }

    Ok(())
}

/// A button on a review message, `/requests view` or the author's confirmation was pressed.
async fn handle_action(
    ctx: &serenity::Context,
    data: &Data,
    component: &serenity::ComponentInteraction,
    action: RequestAction,
    number: u64,
) -> Result<(), Error> {
    let Some(guild_id) = component.guild_id else {
        return Ok(());
    };
    let guild_id = guild_id.get();

    let actor = Actor {
        user_id: component.user.id.get(),
        is_staff: component
            .member
            .as_ref()
            .and_then(|m| m.permissions)
            .is_some_and(|p| p.manage_messages()),
    };

    let result = match action {
        RequestAction::Claim => data.requests.claim(guild_id, number, actor).await,
        RequestAction::Close => data.requests.close(guild_id, number, actor).await,
        RequestAction::Reopen => data.requests.reopen(guild_id, number, actor).await,
    };

    let request = match result {
        Ok(request) => request,
        Err(RequestError::Store(e)) => return Err(e.into()),
        Err(e) => {
            component
                .create_response(&ctx.http, ephemeral(format!("❌ {e}")))
                .await?;
            return Ok(());
        }
    };

    let settings = data.settings.get(guild_id).await?;
    let label = settings.category_label(&request.category_key);
    let on_review_message = request.review_message_id == Some(component.message.id.get());

    let update = if on_review_message || actor.is_staff {
        serenity::CreateInteractionResponseMessage::new()
            .embed(views::request_embed(&request, label))
            .components(views::request_components(&request))
    } else {
        serenity::CreateInteractionResponseMessage::new()
            .content(format!("🔒 Request **#{}** is closed.", request.number))
            .components(views::author_components(&request))
    };
    component
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::UpdateMessage(update),
        )
        .await?;

    // Buttons also appear on `/requests view` and the author's confirmation;
    // keep the channel copy in sync.
    if !on_review_message {
        refresh_review_message(ctx, &request, label).await;
    }

    if action == RequestAction::Close && request.author_id != actor.user_id {
        notify_author_closed(ctx, &request).await;
    }

    Ok(())
}

async fn refresh_review_message(ctx: &serenity::Context, request: &DeskRequest, label: &str) {
    let (Some(channel_id), Some(message_id)) =
        (request.review_channel_id, request.review_message_id)
    else {
        return;
    };

    let edit = serenity::EditMessage::new()
        .embed(views::request_embed(request, label))
        .components(views::request_components(request));

    if let Err(e) = serenity::ChannelId::new(channel_id)
        .edit_message(&ctx.http, serenity::MessageId::new(message_id), edit)
        .await
    {
        tracing::warn!(
            channel_id,
            message_id,
            number = request.number,
            "Failed to refresh review message: {e}"
        );
    }
}

async fn notify_author_closed(ctx: &serenity::Context, request: &DeskRequest) {
    let embed = serenity::CreateEmbed::new()
        .title(format!("Request #{} closed", request.number))
        .description(format!(
            "Your request **{}** has been closed by the staff.",
            request.subject
        ))
        .colour(views::status_colour(request.status));

    if let Err(e) = serenity::UserId::new(request.author_id)
        .direct_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await
    {
        // Members with closed DMs are common; not worth more than a debug line.
        tracing::debug!(
            user_id = request.author_id,
            "Could not DM request author: {e}"
        );
    }
}

/// Value of a text input inside a submitted modal.
fn input_value(rows: &[serenity::ActionRow], custom_id: &str) -> Option<String> {
    rows.iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            serenity::ActionRowComponent::InputText(input) if input.custom_id == custom_id => {
                input.value.clone()
            }
            _ => None,
        })
}
