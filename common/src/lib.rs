//! Common types and utilities for the account ledger
//!
//! This library contains the shared error type, the account model and the
//! validation rules used by both the account service and the API gateway.

pub mod error;
pub mod model;

/// Re-export important types
pub use error::{Error, Result, ErrorExt};
pub use model::account::{Account, AccountBalance, AccountId};

// Re-export utoipa for use in model ToSchema derives
#[cfg(feature = "utoipa")]
pub use utoipa;
