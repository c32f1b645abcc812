// Runtime status shared between the gateway event handler and the HTTP server.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct BotStatus {
    started_at: Instant,
    ready: AtomicBool,
    guild_count: AtomicUsize,
    bot_name: OnceLock<String>,
}

impl BotStatus {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            ready: AtomicBool::new(false),
            guild_count: AtomicUsize::new(0),
            bot_name: OnceLock::new(),
        }
    }

    /// Called on every Ready event (including reconnects).
    pub fn mark_ready(&self, bot_name: &str, guild_count: usize) {
        // The name only needs recording once.
        let _ = self.bot_name.set(bot_name.to_string());
        self.guild_count.store(guild_count, Ordering::Relaxed);
        self.ready.store(true, Ordering::Release);
    }

    pub fn mark_disconnected(&self) {
        self.ready.store(false, Ordering::Release);
    }

    pub fn set_guild_count(&self, guild_count: usize) {
        self.guild_count.store(guild_count, Ordering::Relaxed);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn guild_count(&self) -> usize {
        self.guild_count.load(Ordering::Relaxed)
    }

    pub fn bot_name(&self) -> Option<&str> {
        self.bot_name.get().map(String::as_str)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for BotStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_not_ready() {
        let status = BotStatus::new();
        assert!(!status.is_ready());
        assert_eq!(status.guild_count(), 0);
        assert_eq!(status.bot_name(), None);
    }

    #[test]
    fn ready_and_disconnect() {
        let status = BotStatus::new();
        status.mark_ready("Desk", 4);
        assert!(status.is_ready());
        assert_eq!(status.guild_count(), 4);
        assert_eq!(status.bot_name(), Some("Desk"));

        status.mark_disconnected();
        assert!(!status.is_ready());

        // A reconnect keeps the first recorded name
        status.mark_ready("Renamed", 5);
        assert_eq!(status.bot_name(), Some("Desk"));
        assert_eq!(status.guild_count(), 5);
    }
}
