//! Presence registry
//!
//! The authoritative map of live connections, keyed by session and by
//! user. All routing decisions are made here from authenticated
//! identities; clients never address sessions directly.
//!
//! The registry is plain injected state. Every consumer (sessions, the
//! typing coordinator, the fanout engine) receives an `Arc` handle.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use pulse_core::entities::Notification;
use pulse_core::Snowflake;
use pulse_service::NotificationPush;

use crate::protocol::{NotificationPayload, OnlineUser, ServerEvent};

use super::Connection;

/// Registry of live connections
///
/// Uses `DashMap` for concurrent access. A user is online while they
/// have at least one registered connection; the same user may hold
/// several (multiple tabs or devices).
pub struct PresenceRegistry {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// User ID to session IDs mapping
    user_connections: DashMap<Snowflake, HashSet<String>>,
}

impl PresenceRegistry {
    /// Create a new registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register an authenticated connection.
    ///
    /// When this is the user's first live connection, everyone (the new
    /// connection included) receives a fresh `users_online` snapshot. A
    /// second connection of an already-online user changes nothing for
    /// observers and broadcasts nothing.
    pub fn register(&self, connection: Arc<Connection>) {
        let session_id = connection.session_id().to_string();
        let user_id = connection.user_id();

        self.connections.insert(session_id.clone(), connection);

        let came_online = {
            let mut sessions = self.user_connections.entry(user_id).or_default();
            let was_offline = sessions.is_empty();
            sessions.insert(session_id.clone());
            was_offline
        };

        tracing::debug!(
            session_id = %session_id,
            user_id = %user_id,
            came_online = came_online,
            "Connection registered"
        );

        if came_online {
            self.broadcast_snapshot();
        }
    }

    /// Remove a connection.
    ///
    /// When this was the user's last live connection, everyone remaining
    /// receives a fresh `users_online` snapshot.
    pub fn unregister(&self, session_id: &str) {
        let Some((_, connection)) = self.connections.remove(session_id) else {
            return;
        };
        let user_id = connection.user_id();

        self.user_connections.alter(&user_id, |_, mut sessions| {
            sessions.remove(session_id);
            sessions
        });

        // Atomic removal; a concurrent register may have revived the entry
        let went_offline = self
            .user_connections
            .remove_if(&user_id, |_, sessions| sessions.is_empty())
            .is_some();

        tracing::debug!(
            session_id = %session_id,
            user_id = %user_id,
            went_offline = went_offline,
            "Connection removed"
        );

        if went_offline {
            self.broadcast_snapshot();
        }
    }

    /// Check whether a user has at least one live connection
    pub fn is_online(&self, user_id: Snowflake) -> bool {
        self.user_connections
            .get(&user_id)
            .is_some_and(|sessions| !sessions.is_empty())
    }

    /// Snapshot of everyone currently online, ordered by user ID
    pub fn snapshot(&self) -> Vec<OnlineUser> {
        let mut users: Vec<OnlineUser> = self
            .user_connections
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .iter()
                    .find_map(|sid| self.connections.get(sid))
                    .map(|conn| OnlineUser {
                        user_id: conn.user_id(),
                        username: conn.username().to_string(),
                    })
            })
            .collect();

        users.sort_by_key(|u| u.user_id);
        users
    }

    /// Get all connections for a user
    pub fn user_connections(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        self.user_connections
            .get(&user_id)
            .map(|sessions| {
                sessions
                    .iter()
                    .filter_map(|sid| self.connections.get(sid).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Route an event to every connection of a user.
    ///
    /// Best effort: connections with a full buffer drop the event.
    /// Returns true when at least one connection accepted it.
    pub fn route_to(&self, user_id: Snowflake, event: ServerEvent) -> bool {
        let mut accepted = 0usize;

        for conn in self.user_connections(user_id) {
            if conn.try_send(event.clone()) {
                accepted += 1;
            }
        }

        tracing::trace!(
            user_id = %user_id,
            accepted = accepted,
            "Event routed to user connections"
        );

        accepted > 0
    }

    /// Broadcast an event to every connection
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        let mut accepted = 0usize;

        for entry in self.connections.iter() {
            if entry.try_send(event.clone()) {
                accepted += 1;
            }
        }

        accepted
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of distinct online users
    pub fn online_count(&self) -> usize {
        self.user_connections.len()
    }

    fn broadcast_snapshot(&self) {
        let event = ServerEvent::UsersOnline {
            users: self.snapshot(),
        };
        let reached = self.broadcast(event);

        tracing::debug!(reached = reached, "Online snapshot broadcast");
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PresenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceRegistry")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .finish()
    }
}

impl NotificationPush for PresenceRegistry {
    fn push_notification(&self, recipient_id: Snowflake, notification: &Notification) -> bool {
        self.route_to(
            recipient_id,
            ServerEvent::Notification {
                notification: NotificationPayload::from(notification),
            },
        )
    }
}
