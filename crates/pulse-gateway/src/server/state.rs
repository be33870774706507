//! Gateway state
//!
//! Application state for the gateway server. Everything here is built
//! once at startup and injected; no component reaches for globals.

use std::sync::Arc;

use pulse_common::AppConfig;
use pulse_service::ServiceContext;

use crate::presence::PresenceRegistry;
use crate::typing::TypingCoordinator;

/// Gateway application state
#[derive(Clone)]
pub struct GatewayState {
    /// Service context with stores, verifier and ID generator
    service_context: Arc<ServiceContext>,
    /// Presence registry for live connections
    registry: Arc<PresenceRegistry>,
    /// Typing coordinator shared by all sessions
    typing: Arc<TypingCoordinator>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(
        service_context: ServiceContext,
        registry: Arc<PresenceRegistry>,
        typing: Arc<TypingCoordinator>,
        config: AppConfig,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            registry,
            typing,
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &Arc<ServiceContext> {
        &self.service_context
    }

    /// Get the presence registry
    pub fn registry(&self) -> &Arc<PresenceRegistry> {
        &self.registry
    }

    /// Get the typing coordinator
    pub fn typing(&self) -> &Arc<TypingCoordinator> {
        &self.typing
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("typing", &self.typing)
            .finish()
    }
}
