//! In-memory store implementations and the session test harness

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use pulse_core::entities::{ConversationSummary, DeliveryStatus, Message, Notification};
use pulse_core::traits::{
    MessageRepository, NotificationRepository, RepoResult, UserProfile, UserRepository,
};
use pulse_core::{DomainError, Snowflake};
use pulse_gateway::presence::{Connection, PresenceRegistry};
use pulse_gateway::protocol::{ClientEvent, ServerEvent};
use pulse_gateway::session::ConversationSession;
use pulse_gateway::typing::TypingCoordinator;
use pulse_service::{NotificationPush, ServiceContext};

// ============================================================================
// In-memory stores
// ============================================================================

/// Fixed user directory
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: Vec<UserProfile>,
}

impl MemoryUserRepository {
    pub fn with_users(users: Vec<UserProfile>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<UserProfile>> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserProfile>> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }
}

/// Message store backed by a `Vec`
#[derive(Debug, Default)]
pub struct MemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
}

impl MemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored messages
    pub fn all(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }

    /// Stored status of one message
    pub fn status_of(&self, id: Snowflake) -> Option<DeliveryStatus> {
        self.messages.lock().iter().find(|m| m.id == id).map(|m| m.status)
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn create(&self, message: &Message) -> RepoResult<()> {
        self.messages.lock().push(message.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.messages.lock().iter().find(|m| m.id == id).cloned())
    }

    async fn update_status(
        &self,
        id: Snowflake,
        status: DeliveryStatus,
        read_at: Option<DateTime<Utc>>,
    ) -> RepoResult<bool> {
        let mut messages = self.messages.lock();
        let Some(message) = messages.iter_mut().find(|m| m.id == id) else {
            return Ok(false);
        };
        if status.rank() <= message.status.rank() {
            return Ok(false);
        }
        message.status = status;
        if read_at.is_some() {
            message.read_at = read_at;
        }
        Ok(true)
    }

    async fn list_conversation(&self, a: Snowflake, b: Snowflake) -> RepoResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .messages
            .lock()
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.recipient_id == b)
                    || (m.sender_id == b && m.recipient_id == a)
            })
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn list_conversation_summaries(
        &self,
        user_id: Snowflake,
    ) -> RepoResult<Vec<ConversationSummary>> {
        let messages = self.messages.lock();
        let mut peers: Vec<Snowflake> = messages
            .iter()
            .filter(|m| m.sender_id == user_id || m.recipient_id == user_id)
            .map(|m| {
                if m.sender_id == user_id {
                    m.recipient_id
                } else {
                    m.sender_id
                }
            })
            .collect();
        peers.sort();
        peers.dedup();

        let mut summaries: Vec<ConversationSummary> = peers
            .into_iter()
            .filter_map(|peer_id| {
                let last_message = messages
                    .iter()
                    .filter(|m| {
                        (m.sender_id == user_id && m.recipient_id == peer_id)
                            || (m.sender_id == peer_id && m.recipient_id == user_id)
                    })
                    .max_by_key(|m| m.created_at)?
                    .clone();
                let unread_count = messages
                    .iter()
                    .filter(|m| {
                        m.sender_id == peer_id
                            && m.recipient_id == user_id
                            && m.status != DeliveryStatus::Read
                    })
                    .count() as i64;
                Some(ConversationSummary {
                    peer_id,
                    last_message,
                    unread_count,
                })
            })
            .collect();

        summaries.sort_by_key(|s| std::cmp::Reverse(s.last_message.created_at));
        Ok(summaries)
    }
}

/// Notification store backed by a `Vec`
#[derive(Debug, Default)]
pub struct MemoryNotificationRepository {
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored notifications
    pub fn all(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// Stored notifications for a recipient
    pub fn for_recipient(&self, recipient_id: Snowflake) -> Vec<Notification> {
        self.notifications
            .lock()
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn create(&self, notification: &Notification) -> RepoResult<()> {
        self.notifications.lock().push(notification.clone());
        Ok(())
    }

    async fn list_by_recipient(
        &self,
        recipient_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Notification>> {
        let mut notifications = self.for_recipient(recipient_id);
        notifications.sort_by_key(|n| std::cmp::Reverse(n.created_at));
        notifications.truncate(limit.max(0) as usize);
        Ok(notifications)
    }

    async fn mark_read(&self, recipient_id: Snowflake, id: Snowflake) -> RepoResult<bool> {
        let mut notifications = self.notifications.lock();
        match notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == recipient_id)
        {
            Some(n) => {
                n.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, recipient_id: Snowflake) -> RepoResult<u64> {
        let mut notifications = self.notifications.lock();
        let mut updated = 0u64;
        for n in notifications
            .iter_mut()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
        {
            n.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete(&self, recipient_id: Snowflake, id: Snowflake) -> RepoResult<bool> {
        let mut notifications = self.notifications.lock();
        let before = notifications.len();
        notifications.retain(|n| !(n.id == id && n.recipient_id == recipient_id));
        Ok(notifications.len() < before)
    }
}

/// Message store whose operations always fail
#[derive(Debug, Default)]
pub struct FailingMessageRepository;

#[async_trait]
impl MessageRepository for FailingMessageRepository {
    async fn create(&self, _message: &Message) -> RepoResult<()> {
        Err(DomainError::DatabaseError("store unavailable".to_string()))
    }

    async fn find_by_id(&self, _id: Snowflake) -> RepoResult<Option<Message>> {
        Err(DomainError::DatabaseError("store unavailable".to_string()))
    }

    async fn update_status(
        &self,
        _id: Snowflake,
        _status: DeliveryStatus,
        _read_at: Option<DateTime<Utc>>,
    ) -> RepoResult<bool> {
        Err(DomainError::DatabaseError("store unavailable".to_string()))
    }

    async fn list_conversation(&self, _a: Snowflake, _b: Snowflake) -> RepoResult<Vec<Message>> {
        Err(DomainError::DatabaseError("store unavailable".to_string()))
    }

    async fn list_conversation_summaries(
        &self,
        _user_id: Snowflake,
    ) -> RepoResult<Vec<ConversationSummary>> {
        Err(DomainError::DatabaseError("store unavailable".to_string()))
    }
}

/// Notification store whose writes always fail
#[derive(Debug, Default)]
pub struct FailingNotificationRepository;

#[async_trait]
impl NotificationRepository for FailingNotificationRepository {
    async fn create(&self, _notification: &Notification) -> RepoResult<()> {
        Err(DomainError::DatabaseError("store unavailable".to_string()))
    }

    async fn list_by_recipient(
        &self,
        _recipient_id: Snowflake,
        _limit: i64,
    ) -> RepoResult<Vec<Notification>> {
        Err(DomainError::DatabaseError("store unavailable".to_string()))
    }

    async fn mark_read(&self, _recipient_id: Snowflake, _id: Snowflake) -> RepoResult<bool> {
        Err(DomainError::DatabaseError("store unavailable".to_string()))
    }

    async fn mark_all_read(&self, _recipient_id: Snowflake) -> RepoResult<u64> {
        Err(DomainError::DatabaseError("store unavailable".to_string()))
    }

    async fn delete(&self, _recipient_id: Snowflake, _id: Snowflake) -> RepoResult<bool> {
        Err(DomainError::DatabaseError("store unavailable".to_string()))
    }
}

/// Push sink that records every push it receives
#[derive(Debug, Default)]
pub struct CollectingPush {
    pushed: Mutex<Vec<(Snowflake, Notification)>>,
}

impl CollectingPush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pushed(&self) -> Vec<(Snowflake, Notification)> {
        self.pushed.lock().clone()
    }
}

impl NotificationPush for CollectingPush {
    fn push_notification(&self, recipient_id: Snowflake, notification: &Notification) -> bool {
        self.pushed.lock().push((recipient_id, notification.clone()));
        true
    }
}

// ============================================================================
// Session harness
// ============================================================================

/// A connected test client: a real session plus the receiver side of its
/// outbound channel
pub struct TestClient {
    pub user_id: Snowflake,
    session: ConversationSession,
    rx: mpsc::Receiver<ServerEvent>,
}

impl TestClient {
    /// Feed one frame through the session, as the socket reader would
    pub async fn handle(&mut self, event: ClientEvent) {
        self.session.handle_event(event).await;
    }

    /// Disconnect this client
    pub fn disconnect(&mut self) {
        self.session.close();
    }

    /// Drain every event queued for this client
    pub fn events(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Wires real gateway components around in-memory stores
pub struct Harness {
    pub ctx: Arc<ServiceContext>,
    pub registry: Arc<PresenceRegistry>,
    pub typing: Arc<TypingCoordinator>,
    pub messages: Arc<MemoryMessageRepository>,
    pub notifications: Arc<MemoryNotificationRepository>,
    next_session: Mutex<u64>,
}

impl Harness {
    /// Default typing quiescence window used by the harness
    pub const TYPING_WINDOW: Duration = Duration::from_millis(2_000);

    pub fn new(users: Vec<UserProfile>) -> Self {
        let messages = Arc::new(MemoryMessageRepository::new());
        Self::with_message_store(users, messages.clone(), messages)
    }

    /// Harness whose message store rejects every operation.
    ///
    /// The `messages` inspection handle is a detached empty store; the
    /// sessions only ever see the failing one.
    pub fn with_failing_message_store(users: Vec<UserProfile>) -> Self {
        Self::with_message_store(
            users,
            Arc::new(FailingMessageRepository),
            Arc::new(MemoryMessageRepository::new()),
        )
    }

    fn with_message_store(
        users: Vec<UserProfile>,
        message_repo: Arc<dyn MessageRepository>,
        messages: Arc<MemoryMessageRepository>,
    ) -> Self {
        let notifications = Arc::new(MemoryNotificationRepository::new());
        let ctx = Arc::new(crate::fixtures::build_context(
            Arc::new(MemoryUserRepository::with_users(users)),
            message_repo,
            notifications.clone(),
        ));

        let registry = PresenceRegistry::new_shared();
        let typing = TypingCoordinator::new_shared(registry.clone(), Self::TYPING_WINDOW);

        Self {
            ctx,
            registry,
            typing,
            messages,
            notifications,
            next_session: Mutex::new(0),
        }
    }

    /// Connect a user, returning the client handle.
    ///
    /// The returned client still holds the registration snapshot in its
    /// queue; call `events()` once to discard it if irrelevant.
    pub fn connect(&self, user_id: Snowflake, username: &str) -> TestClient {
        let session_id = {
            let mut next = self.next_session.lock();
            *next += 1;
            format!("test-session-{}", *next)
        };

        let (tx, rx) = mpsc::channel(32);
        let connection = Connection::new(session_id, user_id, username.to_string(), tx);

        let mut session = ConversationSession::new(
            connection,
            self.registry.clone(),
            self.typing.clone(),
            self.ctx.clone(),
        );
        session.activate();

        TestClient {
            user_id,
            session,
            rx,
        }
    }
}
