//! Presence tracking
//!
//! Connection handles and the registry that maps sessions and users to
//! live connections.

mod connection;
mod registry;

pub use connection::Connection;
pub use registry::PresenceRegistry;
