//! Typing coordinator
//!
//! Tracks who is typing to whom and debounces the signal per
//! (sender, recipient) pair. Typing state is volatile: it lives only in
//! memory and is never persisted.
//!
//! A burst of typing signals inside the quiescence window routes exactly
//! one `user_typing` to the recipient. The background sweeper expires
//! quiet pairs and routes exactly one `user_stop_typing` per expiry; an
//! explicit stop (or a disconnect) clears the pair immediately.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use pulse_core::Snowflake;

use crate::presence::PresenceRegistry;
use crate::protocol::ServerEvent;

/// Typing pair key: who is typing toward whom
type Pair = (Snowflake, Snowflake);

struct TypingEntry {
    last_signal: Instant,
}

/// Debounced typing state for all live conversations
pub struct TypingCoordinator {
    registry: Arc<PresenceRegistry>,
    window: Duration,
    entries: Mutex<HashMap<Pair, TypingEntry>>,
}

impl TypingCoordinator {
    /// Create a coordinator with the given quiescence window
    pub fn new(registry: Arc<PresenceRegistry>, window: Duration) -> Self {
        Self {
            registry,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Create a coordinator wrapped in Arc
    pub fn new_shared(registry: Arc<PresenceRegistry>, window: Duration) -> Arc<Self> {
        Arc::new(Self::new(registry, window))
    }

    /// Record a typing signal from `sender` toward `recipient`.
    ///
    /// Only the first signal of a burst routes a `user_typing` event;
    /// repeats inside the window just refresh the timestamp.
    pub fn typing(&self, sender: Snowflake, username: &str, recipient: Snowflake) {
        let now = Instant::now();

        let first_of_burst = {
            let mut entries = self.entries.lock();
            let fresh = entries
                .get(&(sender, recipient))
                .is_some_and(|e| now.duration_since(e.last_signal) <= self.window);
            entries.insert((sender, recipient), TypingEntry { last_signal: now });
            !fresh
        };

        if first_of_burst {
            self.registry.route_to(
                recipient,
                ServerEvent::UserTyping {
                    user_id: sender,
                    username: username.to_string(),
                },
            );
        }
    }

    /// Explicit stop signal: clear the pair and notify the recipient.
    ///
    /// A stop for a pair with no live state is ignored, so expiry and
    /// explicit stop never double-fire.
    pub fn stop_typing(&self, sender: Snowflake, recipient: Snowflake) {
        let existed = self.entries.lock().remove(&(sender, recipient)).is_some();

        if existed {
            self.registry
                .route_to(recipient, ServerEvent::UserStopTyping { user_id: sender });
        }
    }

    /// Clear every pair the sender participates in (disconnect path)
    pub fn disconnect(&self, sender: Snowflake) {
        let recipients: Vec<Snowflake> = {
            let mut entries = self.entries.lock();
            let recipients = entries
                .keys()
                .filter(|(s, _)| *s == sender)
                .map(|(_, r)| *r)
                .collect();
            entries.retain(|(s, _), _| *s != sender);
            recipients
        };

        for recipient in recipients {
            self.registry
                .route_to(recipient, ServerEvent::UserStopTyping { user_id: sender });
        }
    }

    /// Expire every pair quiet for longer than the window
    pub fn sweep(&self) {
        let now = Instant::now();

        let expired: Vec<Pair> = {
            let mut entries = self.entries.lock();
            let expired: Vec<Pair> = entries
                .iter()
                .filter(|(_, e)| now.duration_since(e.last_signal) > self.window)
                .map(|(pair, _)| *pair)
                .collect();
            for pair in &expired {
                entries.remove(pair);
            }
            expired
        };

        for (sender, recipient) in expired {
            tracing::trace!(
                sender = %sender,
                recipient = %recipient,
                "Typing state expired"
            );
            self.registry
                .route_to(recipient, ServerEvent::UserStopTyping { user_id: sender });
        }
    }

    /// Number of live typing pairs
    pub fn active_pairs(&self) -> usize {
        self.entries.lock().len()
    }

    /// Spawn the background expiry sweeper
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                coordinator.sweep();
            }
        })
    }
}

impl std::fmt::Debug for TypingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingCoordinator")
            .field("window", &self.window)
            .field("active_pairs", &self.active_pairs())
            .finish()
    }
}
