//! Domain models for the account ledger

pub mod account;
pub mod journal;
