// This is the entry point of the request desk bot.
//
// **Architecture Overview:**
// - `core/` = Request desk rules (platform-agnostic)
// - `infra/` = Implementations of core traits (the JSON state file)
// - `discord/` = Discord-specific adapters (commands, components, modals)
// - `web/` = HTTP side channel for liveness and health probes
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework and the HTTP server
// 4. Shut both down cleanly on Ctrl+C

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "web/web_layer.rs"]
mod web;

use crate::core::config::BotConfig;
use crate::core::requests::RequestService;
use crate::core::settings::SettingsService;
use crate::core::status::BotStatus;
use crate::discord::commands::presence;
use crate::discord::{Data, Error};
use crate::infra::state::JsonStateStore;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,serenity=warn";

/// Gateway session is up: record it and set the presence.
fn on_ready(ctx: &serenity::Context, ready: &serenity::Ready, data: &Data) {
    data.status.mark_ready(&ready.user.name, ready.guilds.len());
    presence::on_ready(ctx);
    tracing::info!(
        user = %ready.user.name,
        guilds = ready.guilds.len(),
        "Bot is ready"
    );
}

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            on_ready(ctx, data_about_bot, data);
        }
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            data.status.set_guild_count(ctx.cache.guilds().len());
            if *is_new == Some(true) {
                tracing::info!(guild_id = guild.id.get(), name = %guild.name, "Joined guild");
            }
        }
        serenity::FullEvent::GuildDelete { incomplete, .. } => {
            data.status.set_guild_count(ctx.cache.guilds().len());
            if !incomplete.unavailable {
                tracing::info!(guild_id = incomplete.id.get(), "Removed from guild");
            }
        }
        serenity::FullEvent::ShardStageUpdate { event } => {
            if event.new != serenity::ConnectionStage::Connected
                && event.old == serenity::ConnectionStage::Connected
            {
                tracing::warn!(shard = event.shard_id.0, stage = ?event.new, "Gateway connection lost");
                data.status.mark_disconnected();
            }
        }
        serenity::FullEvent::InteractionCreate { interaction } => {
            discord::desk::handle_interaction(ctx, data, interaction).await?;
        }
        _ => {}
    }

    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(
                command = %ctx.command().qualified_name,
                "Command failed: {error}"
            );
            let reply = poise::CreateReply::default()
                .content("❌ Something went wrong while running that command.")
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::warn!("Failed to report command error: {e}");
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            tracing::error!(event = event.snake_case_name(), "Event handler failed: {error}");
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {e}");
            }
        }
    }
}

/// Drive `run` until it finishes or `shutdown` fires, whichever comes first.
///
/// `ShardManager::shutdown_all` is a no-op until the first shard has booted,
/// so a cancellation during startup has to abandon the run itself.
async fn run_until_cancelled<E>(
    run: impl Future<Output = Result<(), E>>,
    shutdown: &CancellationToken,
    stop: impl Future<Output = ()>,
) -> Result<(), E> {
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            tracing::info!("Stopping gateway client");
            stop.await;
            Ok(())
        }
        result = run => result,
    }
}

/// Cancel `shutdown` on every Ctrl+C for as long as the process runs.
async fn listen_for_ctrl_c(shutdown: CancellationToken) {
    loop {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown requested");
                shutdown.cancel();
            }
            Err(e) => {
                tracing::error!("Failed to listen for Ctrl+C: {e}");
                return;
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = BotConfig::from_env()
        .context("Invalid configuration. Create a .env file with at least DISCORD_TOKEN")?;
    let http_addr = config.http_addr()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let state_path = config.state_path();
    let store = Arc::new(
        JsonStateStore::open(&state_path)
            .await
            .with_context(|| format!("Failed to load state from {}", state_path.display()))?,
    );

    let settings_service = Arc::new(SettingsService::new(Arc::clone(&store)));
    let request_service = Arc::new(RequestService::new(Arc::clone(&store)));
    let status = Arc::new(BotStatus::new());

    let data = Data {
        settings: Arc::clone(&settings_service),
        requests: Arc::clone(&request_service),
        status: Arc::clone(&status),
    };

    // ========================================================================
    // HTTP SIDE CHANNEL
    // ========================================================================

    let shutdown = CancellationToken::new();
    let app = web::create_router(web::WebState {
        status: Arc::clone(&status),
        requests: Arc::clone(&request_service),
    });
    let web_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            let result = web::server::serve(http_addr, app, shutdown.clone()).await;
            // The bot goes down with the side channel.
            if result.is_err() {
                shutdown.cancel();
            }
            result
        }
    });

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILDS;
    let command_scope = config.command_scope;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::all(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            pre_command: |ctx| {
                Box::pin(async move {
                    tracing::debug!(
                        command = %ctx.command().qualified_name,
                        user_id = ctx.author().id.get(),
                        "Running command"
                    );
                })
            },
            ..Default::default()
        })
        // poise hands the first Ready to `event_handler` after this returns.
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("Bot is starting up...");
                discord::registration::register_commands(
                    ctx,
                    &framework.options().commands,
                    command_scope,
                )
                .await?;
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    tokio::spawn(listen_for_ctrl_c(shutdown.clone()));

    let shard_manager = Arc::clone(&client.shard_manager);
    let bot_result =
        run_until_cancelled(client.start(), &shutdown, shard_manager.shutdown_all()).await;
    status.mark_disconnected();
    shutdown.cancel();

    let web_result = web_task.await.context("HTTP server task panicked")?;

    bot_result.context("Error running bot")?;
    web_result?;
    tracing::info!("Bot stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn cancellation_before_start_is_not_lost() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let stopped = AtomicBool::new(false);

        let result: Result<(), ()> = run_until_cancelled(
            std::future::pending(),
            &shutdown,
            async { stopped.store(true, Ordering::SeqCst) },
        )
        .await;

        assert!(result.is_ok());
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancellation_while_running_stops_the_run() {
        let shutdown = CancellationToken::new();
        let canceller = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result: Result<(), ()> = tokio::time::timeout(
            Duration::from_secs(5),
            run_until_cancelled(std::future::pending(), &shutdown, async {}),
        )
        .await
        .expect("run was not abandoned");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn finished_run_returns_its_result() {
        let shutdown = CancellationToken::new();
        let stopped = AtomicBool::new(false);

        let result = run_until_cancelled(
            async { Err::<(), _>("gateway closed") },
            &shutdown,
            async { stopped.store(true, Ordering::SeqCst) },
        )
        .await;

        assert_eq!(result, Err("gateway closed"));
        assert!(!stopped.load(Ordering::SeqCst));
    }
}
