// Builders for everything the desk renders: the panel, the submission modal
// and the review message with its staff buttons.

use super::custom_ids::{DeskComponent, DETAILS_INPUT, SUBJECT_INPUT};
use crate::core::requests::request_models::{MAX_DETAILS_LEN, MAX_SUBJECT_LEN};
use crate::core::requests::{DeskRequest, RequestAction, RequestStatus};
use crate::core::settings::{Category, GuildSettings};
use poise::serenity_prelude as serenity;

const PANEL_COLOUR: u32 = 0x5865F2; // Blurple
// Discord caps modal titles at 45 characters.
const MAX_MODAL_TITLE_LEN: usize = 45;

pub fn status_colour(status: RequestStatus) -> u32 {
    match status {
        RequestStatus::Open => 0x57F287,    // Green
        RequestStatus::Claimed => 0xFEE75C, // Yellow
        RequestStatus::Closed => 0x99AAB5,  // Grey
    }
}

pub fn status_label(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Open => "🟢 Open",
        RequestStatus::Claimed => "🟡 Claimed",
        RequestStatus::Closed => "⚪ Closed",
    }
}

/// Buttons offered on a review message for the request's current status.
pub fn available_actions(status: RequestStatus) -> Vec<RequestAction> {
    match status {
        RequestStatus::Open => vec![RequestAction::Claim, RequestAction::Close],
        RequestStatus::Claimed => vec![RequestAction::Close],
        RequestStatus::Closed => vec![RequestAction::Reopen],
    }
}

/// Buttons offered to the author on their own copy of a request.
pub fn author_actions(status: RequestStatus) -> Vec<RequestAction> {
    if status.is_active() {
        vec![RequestAction::Close]
    } else {
        Vec::new()
    }
}

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

pub fn panel_embed(settings: &GuildSettings) -> serenity::CreateEmbed {
    let categories = settings
        .categories
        .iter()
        .map(|c| match &c.description {
            Some(d) => format!("• **{}** — {}", c.label, d),
            None => format!("• **{}**", c.label),
        })
        .collect::<Vec<_>>()
        .join("\n");

    serenity::CreateEmbed::new()
        .title("📨 Contact the staff")
        .description(
            "Pick a category from the menu below and fill in the form. \
            The staff team will get back to you as soon as possible.",
        )
        .field("Categories", truncate(&categories, 1024), false)
        .colour(PANEL_COLOUR)
}

pub fn panel_components(settings: &GuildSettings) -> Vec<serenity::CreateActionRow> {
    let options = settings
        .categories
        .iter()
        .map(|c| {
            let option = serenity::CreateSelectMenuOption::new(&c.label, &c.key);
            match &c.description {
                Some(d) => option.description(d),
                None => option,
            }
        })
        .collect();

    let menu = serenity::CreateSelectMenu::new(
        DeskComponent::Pick.to_custom_id(),
        serenity::CreateSelectMenuKind::String { options },
    )
    .placeholder("Choose a category…")
    .min_values(1)
    .max_values(1);

    vec![serenity::CreateActionRow::SelectMenu(menu)]
}

pub fn submission_modal(category: &Category) -> serenity::CreateModal {
    let subject = serenity::CreateInputText::new(
        serenity::InputTextStyle::Short,
        "Subject",
        SUBJECT_INPUT,
    )
    .placeholder("A short summary")
    .min_length(1)
    .max_length(MAX_SUBJECT_LEN as u16)
    .required(true);

    let details = serenity::CreateInputText::new(
        serenity::InputTextStyle::Paragraph,
        "Details",
        DETAILS_INPUT,
    )
    .placeholder("Tell us everything we need to know")
    .min_length(1)
    .max_length(MAX_DETAILS_LEN as u16)
    .required(true);

    serenity::CreateModal::new(
        DeskComponent::Form {
            category: category.key.clone(),
        }
        .to_custom_id(),
        truncate(&category.label, MAX_MODAL_TITLE_LEN),
    )
    .components(vec![
        serenity::CreateActionRow::InputText(subject),
        serenity::CreateActionRow::InputText(details),
    ])
}

pub fn request_embed(request: &DeskRequest, category_label: &str) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(format!("#{} — {}", request.number, request.subject))
        .description(&request.details)
        .colour(status_colour(request.status))
        .field("From", format!("<@{}>", request.author_id), true)
        .field("Category", category_label, true)
        .field("Status", status_label(request.status), true)
        .field(
            "Filed",
            format!("<t:{}:f>", request.created_at.timestamp()),
            true,
        );

    if let Some(staff) = request.claimed_by {
        embed = embed.field("Claimed by", format!("<@{}>", staff), true);
    }
    if let Some(closer) = request.closed_by {
        embed = embed.field("Closed by", format!("<@{}>", closer), true);
    }

    embed.footer(serenity::CreateEmbedFooter::new(format!(
        "Request #{}",
        request.number
    )))
}

pub fn request_components(request: &DeskRequest) -> Vec<serenity::CreateActionRow> {
    action_rows(request, available_actions(request.status))
}

/// Components for the author's copy: a Close button while the request is active.
pub fn author_components(request: &DeskRequest) -> Vec<serenity::CreateActionRow> {
    action_rows(request, author_actions(request.status))
}

/// Ephemeral reply to a member whose request was just filed.
pub fn submission_confirmation(
    request: &DeskRequest,
) -> serenity::CreateInteractionResponseMessage {
    serenity::CreateInteractionResponseMessage::new()
        .content(format!(
            "✅ Your request **#{}** was sent to the staff. You'll get a DM when it's closed. \
            Solved it yourself? Close it with the button below.",
            request.number
        ))
        .components(author_components(request))
        .ephemeral(true)
}

fn action_rows(
    request: &DeskRequest,
    actions: Vec<RequestAction>,
) -> Vec<serenity::CreateActionRow> {
    // Discord rejects empty action rows.
    if actions.is_empty() {
        return Vec::new();
    }

    let buttons = actions
        .into_iter()
        .map(|action| {
            let (label, style) = match action {
                RequestAction::Claim => ("🙋 Claim", serenity::ButtonStyle::Primary),
                RequestAction::Close => ("🔒 Close", serenity::ButtonStyle::Danger),
                RequestAction::Reopen => ("🔓 Reopen", serenity::ButtonStyle::Secondary),
            };
            serenity::CreateButton::new(
                DeskComponent::action(action, request.number).to_custom_id(),
            )
            .label(label)
            .style(style)
        })
        .collect();

    vec![serenity::CreateActionRow::Buttons(buttons)]
}

/// One line per request for list views.
pub fn request_line(request: &DeskRequest, category_label: &str) -> String {
    format!(
        "**#{}** {} · {} · <@{}> · {}",
        request.number,
        truncate(&request.subject, 60),
        category_label,
        request.author_id,
        status_label(request.status)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::requests::NewRequest;
    use chrono::Utc;

    #[test]
    fn actions_follow_status() {
        assert_eq!(
            available_actions(RequestStatus::Open),
            vec![RequestAction::Claim, RequestAction::Close]
        );
        assert_eq!(
            available_actions(RequestStatus::Claimed),
            vec![RequestAction::Close]
        );
        assert_eq!(
            available_actions(RequestStatus::Closed),
            vec![RequestAction::Reopen]
        );
    }

    #[test]
    fn authors_can_only_close_active_requests() {
        assert_eq!(
            author_actions(RequestStatus::Open),
            vec![RequestAction::Close]
        );
        assert_eq!(
            author_actions(RequestStatus::Claimed),
            vec![RequestAction::Close]
        );
        assert!(author_actions(RequestStatus::Closed).is_empty());
    }

    #[test]
    fn author_buttons_match_their_actions() {
        let mut request = NewRequest {
            guild_id: 1,
            author_id: 2,
            category_key: "general".to_string(),
            subject: "Subject".to_string(),
            details: "Details".to_string(),
            created_at: Utc::now(),
        }
        .into_request(7);

        assert_eq!(author_components(&request).len(), 1);
        request.status = RequestStatus::Closed;
        assert!(author_components(&request).is_empty());
        assert_eq!(request_components(&request).len(), 1);

        // The author's button goes through the same close handler as staff ones
        assert_eq!(
            DeskComponent::action(RequestAction::Close, request.number).to_custom_id(),
            "desk:close:7"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("ééééééé", 4), "ééé…");
    }

    #[test]
    fn colours_differ_per_status() {
        let colours = [
            status_colour(RequestStatus::Open),
            status_colour(RequestStatus::Claimed),
            status_colour(RequestStatus::Closed),
        ];
        assert_ne!(colours[0], colours[1]);
        assert_ne!(colours[1], colours[2]);
        assert_ne!(colours[0], colours[2]);
    }
}
