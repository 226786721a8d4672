//! API handlers
//!
//! Each handler follows a consistent pattern:
//! - Extract state and parameters using Axum extractors
//! - Validate input parameters
//! - Call the account service
//! - Map the result to a response body and status code

pub mod balance;
pub mod event;
pub mod reset;
pub mod response;

pub use response::EventResponse;
