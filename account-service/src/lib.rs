//! Account service: the account store and the operations built on it

pub mod service;
pub mod repository;
pub mod config;

pub use service::{AccountService, RepositoryType, TransferResult};
pub use repository::{AccountRepository, InMemoryAccountRepository, FileAccountRepository};
pub use config::{AccountServiceConfig, StorageBackend};
