use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;

// Category definitions with emojis and order
const CATEGORY_ORDER: &[&str] = &["Getting Help", "Staff Tools", "Setup", "Utilities"];

// Discord field value limit is 1024. We leave a bit of buffer.
const FIELD_BUDGET: usize = 1000;

fn get_category_emoji(category: &str) -> &'static str {
    match category {
        "Getting Help" => "📨",
        "Staff Tools" => "🛠️",
        "Setup" => "⚙️",
        "Utilities" => "🧰",
        _ => "•",
    }
}

struct CommandMetadata {
    category: &'static str,
    priority: i32,
    description: Option<&'static str>,
    note: Option<&'static str>,
}

fn get_command_metadata(name: &str) -> CommandMetadata {
    match name {
        "submit" => CommandMetadata {
            category: "Getting Help",
            priority: 100,
            description: Some("Open the request form for a category."),
            note: Some("The panel menu does the same thing."),
        },
        "requests" => CommandMetadata {
            category: "Staff Tools",
            priority: 80,
            description: Some("Browse requests and act on them."),
            note: Some("Subcommands: list, view"),
        },
        "panel" => CommandMetadata {
            category: "Setup",
            priority: 70,
            description: Some("Post the request panel with its category menu."),
            note: None,
        },
        "setup" => CommandMetadata {
            category: "Setup",
            priority: 60,
            description: Some("Configure the review channel, categories and limits."),
            note: Some("Subcommands: show, channel, category_add, category_remove, limits"),
        },
        "ping" => CommandMetadata {
            category: "Utilities",
            priority: 10,
            description: Some("Check the bot's latency and uptime."),
            note: None,
        },
        _ => CommandMetadata {
            category: "Utilities",
            priority: 0,
            description: None,
            note: None,
        },
    }
}

/// Show a categorized list of commands.
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let mut categories: HashMap<&str, Vec<(i32, String)>> = HashMap::new();

    for command in &ctx.framework().options().commands {
        if command.hide_in_help || command.name == "help" {
            continue;
        }

        let metadata = get_command_metadata(&command.name);

        let description = metadata
            .description
            .or(command.description.as_deref())
            .unwrap_or("No description provided.");

        let mut entry = format!("• **/{}** — {}", command.name, description);

        if let Some(note) = metadata.note {
            entry.push_str(&format!("\n  ⤷ {}", note));
        }

        categories
            .entry(metadata.category)
            .or_default()
            .push((metadata.priority, entry));
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("Request Desk Command Guide")
        .description(
            "Use slash commands with `/`. \
            Members file requests from the panel or with `/submit`; \
            staff pick them up in the review channel.",
        )
        .color(serenity::Colour::from_rgb(88, 101, 242))
        .timestamp(serenity::Timestamp::now());

    // Sort categories based on defined order, then alphabetically for others
    let mut sorted_categories: Vec<_> = categories.keys().cloned().collect();
    sorted_categories.sort_by(|a, b| {
        let pos_a = CATEGORY_ORDER.iter().position(|&x| x == *a).unwrap_or(999);
        let pos_b = CATEGORY_ORDER.iter().position(|&x| x == *b).unwrap_or(999);
        pos_a.cmp(&pos_b).then(a.cmp(b))
    });

    for category in sorted_categories {
        if let Some(entries) = categories.get_mut(category) {
            // Sort by priority (descending), then name (ascending)
            entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

            let title = format!("{} {}", get_category_emoji(category), category);
            let formatted: Vec<String> = entries.iter().map(|(_, s)| s.clone()).collect();

            for (i, chunk) in chunk_entries(&formatted).iter().enumerate() {
                let field_name = if i == 0 {
                    title.clone()
                } else {
                    format!("{} (cont.)", title)
                };

                embed = embed.field(field_name, chunk.join("\n"), false);
            }
        }
    }

    embed = embed.footer(serenity::CreateEmbedFooter::new(
        "Setup and staff commands need the matching server permissions.",
    ));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Group entries so each group fits in one embed field.
fn chunk_entries(entries: &[String]) -> Vec<Vec<String>> {
    let mut chunks = Vec::new();
    let mut current_chunk = Vec::new();
    let mut current_length = 0;

    for entry in entries {
        let entry_len = entry.len();
        if !current_chunk.is_empty() && current_length + entry_len + 1 > FIELD_BUDGET {
            chunks.push(std::mem::take(&mut current_chunk));
            current_length = 0;
        }

        current_chunk.push(entry.clone());
        current_length += entry_len + 1; // +1 for newline
    }

    if !current_chunk.is_empty() {
        chunks.push(current_chunk);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_lists_stay_in_one_chunk() {
        let entries = vec!["a".to_string(), "b".to_string()];
        assert_eq!(chunk_entries(&entries), vec![entries.clone()]);
    }

    #[test]
    fn long_lists_are_split_under_budget() {
        let entries: Vec<String> = (0..30).map(|i| format!("{i:>2}{}", "x".repeat(98))).collect();
        let chunks = chunk_entries(&entries);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.join("\n").len() <= FIELD_BUDGET);
        }
        assert_eq!(chunks.concat(), entries);
    }

    #[test]
    fn no_empty_chunks() {
        assert!(chunk_entries(&[]).is_empty());
        let huge = vec!["y".repeat(FIELD_BUDGET + 10)];
        assert_eq!(chunk_entries(&huge).len(), 1);
    }

    #[test]
    fn every_registered_command_has_a_section() {
        for name in ["submit", "requests", "panel", "setup", "ping"] {
            let metadata = get_command_metadata(name);
            assert!(CATEGORY_ORDER.contains(&metadata.category), "{name}");
            assert!(metadata.description.is_some(), "{name}");
        }
    }
}
