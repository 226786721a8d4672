//! Error types for the account ledger
//!
//! Every layer of the ledger reports failures through [`Error`]. Validation
//! failures are detected before any balance is touched; storage failures
//! only come from the file-journaled backend.

use std::fmt::Display;
use thiserror::Error;

/// Ledger error type
#[derive(Debug, Error)]
pub enum Error {
    /// Account id is not a positive integer
    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),

    /// Amount is not a positive number
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Withdrawal larger than the available balance
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Error when an account cannot be found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Explicit create on an id that is already in use
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    /// Event type the ledger does not handle
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A required request value was absent or malformed
    #[error("Missing value: {0}")]
    MissingValue(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Backing storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True for every rejection of the requested amount, including
    /// insufficient funds.
    pub fn is_invalid_amount(&self) -> bool {
        matches!(self, Error::InvalidAmount(_) | Error::InsufficientFunds(_))
    }

    /// True when the error means the account does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::AccountNotFound(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                Error::InvalidAccountId(msg) => Error::InvalidAccountId(format!("{}: {}", context, msg)),
                Error::InvalidAmount(msg) => Error::InvalidAmount(format!("{}: {}", context, msg)),
                Error::InsufficientFunds(msg) => Error::InsufficientFunds(format!("{}: {}", context, msg)),
                Error::AccountNotFound(msg) => Error::AccountNotFound(format!("{}: {}", context, msg)),
                Error::AccountAlreadyExists(msg) => Error::AccountAlreadyExists(format!("{}: {}", context, msg)),
                Error::UnsupportedOperation(msg) => Error::UnsupportedOperation(format!("{}: {}", context, msg)),
                Error::MissingValue(msg) => Error::MissingValue(format!("{}: {}", context, msg)),
                Error::ConfigurationError(msg) => Error::ConfigurationError(format!("{}: {}", context, msg)),
                Error::Storage(msg) => Error::Storage(format!("{}: {}", context, msg)),
                Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
                Error::Io(e) => Error::Storage(format!("{}: {}", context, e)),
                Error::Serialization(e) => Error::Serialization(e),
            }
        })
    }
}
