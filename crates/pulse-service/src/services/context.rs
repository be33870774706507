//! Service context - dependency container for services
//!
//! Holds the stores, the identity verifier and the ID generator. Built
//! once at startup and injected wherever services run; there is no
//! ambient global state.

use std::sync::Arc;

use pulse_common::auth::TokenVerifier;
use pulse_core::traits::{MessageRepository, NotificationRepository, UserRepository};
use pulse_core::{Snowflake, SnowflakeGenerator};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    user_repo: Arc<dyn UserRepository>,
    message_repo: Arc<dyn MessageRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    verifier: Arc<TokenVerifier>,
    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    /// Start building a service context
    #[must_use]
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    /// Get the user directory
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the message store
    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    /// Get the notification store
    pub fn notification_repo(&self) -> &dyn NotificationRepository {
        self.notification_repo.as_ref()
    }

    /// Get the identity verifier
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Generate a new unique ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

/// Builder for `ServiceContext`
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    notification_repo: Option<Arc<dyn NotificationRepository>>,
    verifier: Option<Arc<TokenVerifier>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn notification_repo(mut self, repo: Arc<dyn NotificationRepository>) -> Self {
        self.notification_repo = Some(repo);
        self
    }

    pub fn verifier(mut self, verifier: Arc<TokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the context
    ///
    /// # Errors
    /// Returns the name of the first missing dependency.
    pub fn build(self) -> Result<ServiceContext, &'static str> {
        Ok(ServiceContext {
            user_repo: self.user_repo.ok_or("user_repo")?,
            message_repo: self.message_repo.ok_or("message_repo")?,
            notification_repo: self.notification_repo.ok_or("notification_repo")?,
            verifier: self.verifier.ok_or("verifier")?,
            snowflake_generator: self.snowflake_generator.ok_or("snowflake_generator")?,
        })
    }
}
