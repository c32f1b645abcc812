// Bot presence.
//
// Discord-layer glue only: we work with serenity's ActivityData/OnlineStatus
// and keep the logic short.

use poise::serenity_prelude as serenity;

/// Point members at the entry command while the bot is connected.
pub fn on_ready(ctx: &serenity::Context) {
    let activity = serenity::ActivityData::watching("for /submit");
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}
