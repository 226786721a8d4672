//! Account service implementation

use std::path::PathBuf;
use std::sync::Arc;

use common::error::{Error, ErrorExt, Result};
use common::model::account::{validate_account_id, validate_amount, Account, AccountBalance, AccountId};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{AccountServiceConfig, StorageBackend};
use crate::repository::{AccountRepository, FileAccountRepository, InMemoryAccountRepository};

/// Balances of both sides after a transfer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferResult {
    /// Origin account after the withdrawal
    pub origin: AccountBalance,
    /// Destination account after the deposit
    pub destination: AccountBalance,
}

/// Account service validating and orchestrating balance operations
pub struct AccountService {
    /// Repository for account data
    repo: Arc<dyn AccountRepository>,
}

/// Repository Type
pub enum RepositoryType {
    /// In-memory repository
    InMemory,
    /// File-journaled repository at the given path
    File(PathBuf),
}

impl Default for AccountService {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountService {
    /// Create a new account service backed by memory
    pub fn new() -> Self {
        Self {
            repo: Arc::new(InMemoryAccountRepository::new()),
        }
    }

    /// Create a service over an existing repository
    pub fn from_repository(repo: Arc<dyn AccountRepository>) -> Self {
        Self { repo }
    }

    /// Create a new account service with a specific repository type
    pub async fn with_repository(repo_type: RepositoryType) -> Result<Self> {
        let repo: Arc<dyn AccountRepository> = match repo_type {
            RepositoryType::InMemory => Arc::new(InMemoryAccountRepository::new()),
            RepositoryType::File(path) => Arc::new(FileAccountRepository::open(path).await?),
        };

        Ok(Self { repo })
    }

    /// Create a new account service with a configuration
    pub async fn with_config(config: &AccountServiceConfig) -> Result<Self> {
        let repo_type = match config.storage {
            StorageBackend::Memory => RepositoryType::InMemory,
            StorageBackend::File => RepositoryType::File(config.journal_path.clone()),
        };
        Self::with_repository(repo_type).await
    }

    /// Explicitly create an account with a zero balance
    pub async fn create_account(&self, id: AccountId) -> Result<Account> {
        validate_account_id(id)?;
        info!("Creating account {}", id);
        self.repo.create_account(id).await
    }

    /// Get an account by ID
    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        self.repo.get_account(id).await
    }

    /// Get the balance of an account
    pub async fn get_balance(&self, id: AccountId) -> Result<f64> {
        validate_account_id(id)?;
        debug!("Fetching balance for account {}", id);
        self.repo.get_balance(id).await
    }

    /// Deposit funds, creating the account on first use
    pub async fn deposit(&self, id: AccountId, amount: f64) -> Result<f64> {
        validate_account_id(id)?;
        validate_amount(amount)?;
        info!("Depositing {} to account {}", amount, id);

        match self.repo.deposit(id, amount).await {
            Err(e) if e.is_not_found() => {
                debug!("Account {} not found, creating it before deposit", id);
                match self.repo.create_account(id).await {
                    // Another request created it first; the retry below still applies
                    Ok(_) | Err(Error::AccountAlreadyExists(_)) => {}
                    Err(e) => return Err(e),
                }
                self.repo.deposit(id, amount).await
            }
            result => result,
        }
    }

    /// Withdraw funds from an existing account
    pub async fn withdraw(&self, id: AccountId, amount: f64) -> Result<f64> {
        validate_account_id(id)?;
        validate_amount(amount)?;
        info!("Withdrawing {} from account {}", amount, id);

        let balance = self.repo.get_balance(id).await?;
        if amount > balance {
            warn!("Rejected withdrawal of {} from account {} with balance {}", amount, id, balance);
            return Err(Error::InsufficientFunds(format!(
                "Cannot withdraw {} from account {} with balance {}",
                amount, id, balance
            )));
        }

        self.repo.withdraw(id, amount).await
    }

    /// Move funds from `origin` to `destination`, creating the destination on first use.
    ///
    /// The withdrawal and the deposit are two separate store operations. If the
    /// deposit fails after the withdrawal succeeded, the origin stays debited and
    /// the error is returned; no compensating deposit is attempted.
    pub async fn transfer(
        &self,
        origin: AccountId,
        destination: AccountId,
        amount: f64,
    ) -> Result<TransferResult> {
        validate_account_id(origin)?;
        validate_account_id(destination)?;
        validate_amount(amount)?;
        info!("Transferring {} from account {} to account {}", amount, origin, destination);

        let origin_balance = self.repo.get_balance(origin).await?;
        if amount > origin_balance {
            warn!(
                "Rejected transfer of {} from account {} with balance {}",
                amount, origin, origin_balance
            );
            return Err(Error::InsufficientFunds(format!(
                "Cannot transfer {} from account {} with balance {}",
                amount, origin, origin_balance
            )));
        }

        let origin_balance = self
            .repo
            .withdraw(origin, amount)
            .await
            .with_context(|| format!("Failed to debit account {} for transfer", origin))?;

        let destination_balance = match self.deposit(destination, amount).await {
            Ok(balance) => balance,
            Err(e) => {
                error!(
                    "Transfer of {} left account {} debited: deposit to account {} failed: {}",
                    amount, origin, destination, e
                );
                return Err(e);
            }
        };

        // A self-transfer nets to zero; report the final balance on both sides
        let origin_balance = if origin == destination {
            destination_balance
        } else {
            origin_balance
        };

        Ok(TransferResult {
            origin: AccountBalance::new(origin, origin_balance),
            destination: AccountBalance::new(destination, destination_balance),
        })
    }

    /// Remove every account. Returns false if backing storage could not be cleared.
    pub async fn reset_all(&self) -> bool {
        info!("Resetting all accounts");
        let cleared = self.repo.reset_all().await;
        if !cleared {
            error!("Account store reset failed");
        }
        cleared
    }
}
