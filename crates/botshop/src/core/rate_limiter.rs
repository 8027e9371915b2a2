//! Per-user cooldown for payment-proof submissions.

use std::collections::HashMap;
use std::sync::Arc;

use teloxide::types::ChatId;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Seconds a user has to wait between two proof submissions.
pub const PROOF_COOLDOWN_SECONDS: u64 = 30;

/// Tracks the last accepted submission per chat and enforces a cooldown.
///
/// State lives only in memory; a restart clears it, which at worst lets a
/// user re-submit one proof early.
#[derive(Clone)]
pub struct RateLimiter {
    last_seen: Arc<Mutex<HashMap<ChatId, Instant>>>,
    cooldown: Duration,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_cooldown(Duration::from_secs(PROOF_COOLDOWN_SECONDS))
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            last_seen: Arc::new(Mutex::new(HashMap::new())),
            cooldown,
        }
    }

    /// Returns `true` and records the attempt when the chat is allowed to
    /// submit now; returns `false` while the cooldown is still running.
    ///
    /// Check and touch happen under one lock so two concurrent submissions
    /// from the same chat cannot both pass.
    pub async fn try_acquire(&self, chat_id: ChatId) -> bool {
        let mut last_seen = self.last_seen.lock().await;
        let now = Instant::now();
        match last_seen.get(&chat_id) {
            Some(last) if now.duration_since(*last) < self.cooldown => false,
            _ => {
                last_seen.insert(chat_id, now);
                true
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
