//! Error types for store backends

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors a store backend can surface.
///
/// Absence is not an error: point lookups return `Ok(None)` and
/// update/delete of a missing id is a successful no-op.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("database error: {0}")]
    Database(String),
}
