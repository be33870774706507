//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
///
/// The store ports are the only fallible seam in the domain, so this
/// carries the persistence failure and nothing else.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}
