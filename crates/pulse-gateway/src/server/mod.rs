//! Gateway server setup
//!
//! Wires configuration, stores, services, the presence registry and the
//! typing coordinator into a running WebSocket server.

mod handler;
mod state;

pub use handler::{gateway_handler, health_check};
pub use state::GatewayState;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use pulse_common::{AppConfig, AppError, TokenVerifier};
use pulse_core::SnowflakeGenerator;
use pulse_service::ServiceContextBuilder;

use crate::presence::PresenceRegistry;
use crate::typing::TypingCoordinator;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create `GatewayState`
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    // Create database pool
    tracing::info!("Connecting to PostgreSQL...");
    let db_config = pulse_db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..Default::default()
    };
    let pool = pulse_db::create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    // Create identity verifier and ID generator
    let verifier = Arc::new(TokenVerifier::new(&config.jwt.secret));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.realtime.worker_id));

    // Create stores
    let user_repo = Arc::new(pulse_db::PgUserRepository::new(pool.clone()));
    let message_repo = Arc::new(pulse_db::PgMessageRepository::new(pool.clone()));
    let notification_repo = Arc::new(pulse_db::PgNotificationRepository::new(pool));

    // Build service context
    let service_context = ServiceContextBuilder::new()
        .user_repo(user_repo)
        .message_repo(message_repo)
        .notification_repo(notification_repo)
        .verifier(verifier)
        .snowflake_generator(snowflake_generator)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    // Create presence registry and typing coordinator
    let registry = PresenceRegistry::new_shared();
    let typing = TypingCoordinator::new_shared(
        registry.clone(),
        Duration::from_millis(config.realtime.typing_quiescence_ms),
    );
    typing.spawn_sweeper(Duration::from_millis(config.realtime.typing_sweep_ms));

    Ok(GatewayState::new(service_context, registry, typing, config))
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.gateway.port));

    let state = create_gateway_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
