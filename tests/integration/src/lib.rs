//! Integration test utilities for the realtime core
//!
//! Provides in-memory store implementations and a harness that wires
//! real sessions, the presence registry, and the typing coordinator
//! together without a database or a socket.

pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
