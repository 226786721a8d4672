//! Journal entries written by the file-backed account store
//!
//! The journal is a JSON-lines file. Replaying every entry in order rebuilds
//! the account map exactly as it was when the last entry was flushed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::AccountId;

/// Kind of mutation recorded in the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalOp {
    /// Account created with a zero balance
    Created,
    /// Funds added
    Deposited,
    /// Funds removed
    Withdrawn,
}

/// A single journaled mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub op: JournalOp,
    pub account_id: AccountId,
    #[serde(default)]
    pub amount: f64,
    pub recorded_at: DateTime<Utc>,
}

impl JournalEntry {
    pub fn created(account_id: AccountId) -> Self {
        Self::new(JournalOp::Created, account_id, 0.0)
    }

    pub fn deposited(account_id: AccountId, amount: f64) -> Self {
        Self::new(JournalOp::Deposited, account_id, amount)
    }

    pub fn withdrawn(account_id: AccountId, amount: f64) -> Self {
        Self::new(JournalOp::Withdrawn, account_id, amount)
    }

    fn new(op: JournalOp, account_id: AccountId, amount: f64) -> Self {
        Self {
            op,
            account_id,
            amount,
            recorded_at: Utc::now(),
        }
    }
}
