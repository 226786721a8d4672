//! Configuration for the account service

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use common::error::Error;

/// Where account state is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory only
    Memory,
    /// Memory plus an append-only journal file
    File,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "in_memory" => Ok(StorageBackend::Memory),
            "file" | "journal" => Ok(StorageBackend::File),
            other => Err(Error::ConfigurationError(format!(
                "Unknown storage backend '{}', expected 'memory' or 'file'",
                other
            ))),
        }
    }
}

/// Configuration for the account service
#[derive(Debug, Clone)]
pub struct AccountServiceConfig {
    /// Storage backend
    pub storage: StorageBackend,
    /// Journal path used by the file backend
    pub journal_path: PathBuf,
}

impl Default for AccountServiceConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Memory,
            journal_path: PathBuf::from("ledger-journal.jsonl"),
        }
    }
}

impl AccountServiceConfig {
    /// Create a new configuration using environment variables
    pub fn from_env() -> Result<Self, Error> {
        let defaults = Self::default();
        let storage = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.storage,
        };
        let journal_path = env::var("JOURNAL_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.journal_path);

        Ok(Self { storage, journal_path })
    }

    /// Create a new configuration with custom values
    pub fn new(storage: StorageBackend, journal_path: PathBuf) -> Self {
        Self {
            storage,
            journal_path,
        }
    }
}
