/// Unified error types for the Subgate core
use thiserror::Error;

/// Main error type for the core
///
/// Every operation reports failures as one of these variants; nothing in the
/// core panics on bad input, and a failed operation leaves prior state
/// unchanged.
#[derive(Error, Debug)]
pub enum SubgateError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Identity field collision (nickname or normalized phone)
    #[error("Duplicate field: {0} is already registered")]
    DuplicateField(String),

    /// Unknown account or subscription id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Lifecycle state machine precondition violated
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Login or password-change failure
    #[error("Invalid credentials")]
    BadCredential,

    /// Malformed or incomplete input to a write operation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Login attempt by an account that is not active
    #[error("Account not eligible: {0}")]
    NotEligible(String),

    /// Acting account lacks the administrator flag
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core operations
pub type SubgateResult<T> = Result<T, SubgateError>;
