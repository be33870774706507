//! # pulse-gateway
//!
//! WebSocket gateway for the realtime core: presence tracking, direct
//! messaging with delivery receipts, typing indicators, and live
//! notification push.

pub mod presence;
pub mod protocol;
pub mod server;
pub mod session;
pub mod typing;

pub use server::{create_app, create_gateway_state, run, GatewayState};
