use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::time::Duration;

/// Check that the bot is alive and see its gateway latency.
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let latency = ctx.ping().await;
    let uptime = ctx.data().status.uptime();

    let latency_text = if latency.is_zero() {
        // The shard hasn't completed a heartbeat yet
        "measuring…".to_string()
    } else {
        format!("{} ms", latency.as_millis())
    };

    let embed = serenity::CreateEmbed::new()
        .title("🏓 Pong!")
        .color(0x5865F2) // Blurple
        .field("Gateway latency", latency_text, true)
        .field("Uptime", format_uptime(uptime), true)
        .field("Servers", ctx.data().status.guild_count().to_string(), true);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Format a duration as `1d 2h 3m`, dropping leading zero units.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{total}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(42)), "42s");
        assert_eq!(format_uptime(Duration::from_secs(61)), "1m");
        assert_eq!(format_uptime(Duration::from_secs(3_600 + 120)), "1h 2m");
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 5 * 3_600 + 7 * 60 + 9)),
            "2d 5h 7m"
        );
    }
}
