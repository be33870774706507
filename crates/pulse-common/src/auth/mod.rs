//! Credential verification

mod verifier;

pub use verifier::{Claims, Identity, TokenVerifier};
