//! # pulse-common
//!
//! Shared infrastructure: configuration, telemetry, credential
//! verification, and the application error type.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

pub use auth::{Claims, Identity, TokenVerifier};
pub use config::{AppConfig, ConfigError, Environment, RealtimeConfig, ServerConfig};
pub use error::AppError;
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig};
