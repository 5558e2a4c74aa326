//! Gateway: the dispatch loop feeding gateway updates to the engine.
//!
//! One loop, one message at a time: per-chat ordering follows from the
//! update order. The offset moves past an update only after the engine has
//! handled it, so a crash mid-batch re-delivers the rest of that batch
//! (at-least-once, in order per chat).


use crate::engine::Engine;
use goalbot_core::{config::TelegramConfig, traits::MessagingClient};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Long-poll dispatch loop.
pub struct Gateway {
    messenger: Arc<dyn MessagingClient>,
    engine: Engine,
    offset: i64,
    /// Offset shared with the HTTP API for health reporting.
    published_offset: Arc<AtomicI64>,
    poll_timeout: Duration,
    error_delay: Duration,
}

impl Gateway {
    pub fn new(messenger: Arc<dyn MessagingClient>, engine: Engine, config: &TelegramConfig) -> Self {
        Self {
            messenger,
            engine,
            offset: 0,
            published_offset: Arc::new(AtomicI64::new(0)),
            poll_timeout: Duration::from_secs(config.poll_timeout_secs),
            error_delay: Duration::from_secs(config.error_delay_secs),
        }
    }

    /// Handle to the current offset, readable from other tasks.
    pub fn offset_handle(&self) -> Arc<AtomicI64> {
        self.published_offset.clone()
    }

    /// Next `update_id` the loop will ask for.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Run forever. Stops only when the process does.
    pub async fn run(mut self) {
        info!(
            "goalbot gateway running | messenger: {} | poll timeout: {}s",
            self.messenger.name(),
            self.poll_timeout.as_secs()
        );

        loop {
            self.poll_once().await;
        }
    }

    /// Fetch one batch and dispatch it. Returns the number of updates consumed.
    ///
    /// A failed fetch counts as an empty batch after a short pause.
    pub async fn poll_once(&mut self) -> usize {
        let updates = match self
            .messenger
            .fetch_updates(self.offset, self.poll_timeout)
            .await
        {
            Ok(updates) => updates,
            Err(e) => {
                error!(
                    "poll at offset {} failed (retry in {}s): {e}",
                    self.offset,
                    self.error_delay.as_secs()
                );
                tokio::time::sleep(self.error_delay).await;
                return 0;
            }
        };

        let mut consumed = 0;
        for update in updates {
            // Stale ids can only come from a misbehaving gateway; never move backwards.
            if update.update_id < self.offset {
                warn!("skipping already-consumed update {}", update.update_id);
                continue;
            }

            if let Some(msg) = update.message {
                if let Err(e) = self.engine.handle_message(&msg).await {
                    error!("handling update {} for chat {} failed: {e}", update.update_id, msg.chat_id);
                }
            }

            self.offset = update.update_id + 1;
            self.published_offset.store(self.offset, Ordering::Relaxed);
            consumed += 1;
        }
        consumed
    }
}
