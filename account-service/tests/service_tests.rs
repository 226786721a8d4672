use std::sync::Arc;

use account_service::{AccountRepository, AccountService, InMemoryAccountRepository, TransferResult};
use async_trait::async_trait;
use common::error::{Error, Result};
use common::model::account::{Account, AccountBalance, AccountId};

#[tokio::test]
async fn test_deposit_creates_account() {
    let service = AccountService::new();

    let balance = service.deposit(123, 100.5).await.unwrap();
    assert_eq!(balance, 100.5);

    let account = service.get_account(123).await.unwrap().unwrap();
    assert_eq!(account.balance, 100.5);
}

#[tokio::test]
async fn test_deposits_accumulate() {
    let service = AccountService::new();

    service.deposit(1, 10.0).await.unwrap();
    let balance = service.deposit(1, 15.0).await.unwrap();

    assert_eq!(balance, 25.0);
    assert_eq!(service.get_balance(1).await.unwrap(), 25.0);
}

#[tokio::test]
async fn test_deposit_validation() {
    let service = AccountService::new();

    assert!(matches!(service.deposit(0, 10.0).await, Err(Error::InvalidAccountId(_))));
    assert!(matches!(service.deposit(-4, 10.0).await, Err(Error::InvalidAccountId(_))));
    assert!(matches!(service.deposit(1, 0.0).await, Err(Error::InvalidAmount(_))));
    assert!(matches!(service.deposit(1, -2.5).await, Err(Error::InvalidAmount(_))));

    // Nothing was created by the rejected requests
    assert!(service.get_account(1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_withdraw() {
    let service = AccountService::new();
    service.deposit(123, 100.5).await.unwrap();

    let balance = service.withdraw(123, 50.0).await.unwrap();
    assert_eq!(balance, 50.5);
}

#[tokio::test]
async fn test_withdraw_insufficient_funds_leaves_balance() {
    let service = AccountService::new();
    service.deposit(1, 20.0).await.unwrap();

    let err = service.withdraw(1, 20.01).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds(_)));
    assert!(err.is_invalid_amount());
    assert_eq!(service.get_balance(1).await.unwrap(), 20.0);
}

#[tokio::test]
async fn test_withdraw_unknown_account() {
    let service = AccountService::new();

    let result = service.withdraw(200, 10.0).await;
    assert!(matches!(result, Err(Error::AccountNotFound(_))));

    // Withdraw never creates accounts
    assert!(service.get_account(200).await.unwrap().is_none());
}

#[tokio::test]
async fn test_withdraw_validation() {
    let service = AccountService::new();
    service.deposit(1, 20.0).await.unwrap();

    assert!(matches!(service.withdraw(0, 1.0).await, Err(Error::InvalidAccountId(_))));
    assert!(matches!(service.withdraw(1, 0.0).await, Err(Error::InvalidAmount(_))));
    assert!(matches!(service.withdraw(1, f64::NAN).await, Err(Error::InvalidAmount(_))));
}

#[tokio::test]
async fn test_transfer_moves_funds() {
    let service = AccountService::new();
    service.deposit(1, 100.0).await.unwrap();
    service.deposit(2, 5.0).await.unwrap();

    let result = service.transfer(1, 2, 40.0).await.unwrap();
    assert_eq!(
        result,
        TransferResult {
            origin: AccountBalance::new(1, 60.0),
            destination: AccountBalance::new(2, 45.0),
        }
    );
}

#[tokio::test]
async fn test_transfer_creates_destination() {
    let service = AccountService::new();
    service.deposit(123, 50.5).await.unwrap();

    let result = service.transfer(123, 456, 50.5).await.unwrap();
    assert_eq!(result.origin.balance, 0.0);
    assert_eq!(result.destination.balance, 50.5);
}

#[tokio::test]
async fn test_transfer_insufficient_funds() {
    let service = AccountService::new();
    service.deposit(1, 10.0).await.unwrap();

    let err = service.transfer(1, 2, 10.5).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds(_)));

    assert_eq!(service.get_balance(1).await.unwrap(), 10.0);
    assert!(service.get_account(2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_transfer_unknown_origin() {
    let service = AccountService::new();

    let result = service.transfer(300, 1, 15.0).await;
    assert!(matches!(result, Err(Error::AccountNotFound(_))));
    assert!(service.get_account(1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_transfer_validation() {
    let service = AccountService::new();
    service.deposit(1, 10.0).await.unwrap();

    assert!(matches!(service.transfer(0, 2, 1.0).await, Err(Error::InvalidAccountId(_))));
    assert!(matches!(service.transfer(1, -2, 1.0).await, Err(Error::InvalidAccountId(_))));
    assert!(matches!(service.transfer(1, 2, -1.0).await, Err(Error::InvalidAmount(_))));
    assert_eq!(service.get_balance(1).await.unwrap(), 10.0);
}

#[tokio::test]
async fn test_transfer_to_self() {
    let service = AccountService::new();
    service.deposit(1, 10.0).await.unwrap();

    let result = service.transfer(1, 1, 4.0).await.unwrap();
    assert_eq!(result.origin.balance, 10.0);
    assert_eq!(result.destination.balance, 10.0);
}

#[tokio::test]
async fn test_create_account() {
    let service = AccountService::new();

    let account = service.create_account(9).await.unwrap();
    assert_eq!(account.balance, 0.0);

    assert!(matches!(service.create_account(9).await, Err(Error::AccountAlreadyExists(_))));
    assert!(matches!(service.create_account(0).await, Err(Error::InvalidAccountId(_))));
}

#[tokio::test]
async fn test_reset_all() {
    let service = AccountService::new();
    service.deposit(1, 10.0).await.unwrap();
    service.deposit(2, 10.0).await.unwrap();

    assert!(service.reset_all().await);
    assert!(matches!(service.get_balance(1).await, Err(Error::AccountNotFound(_))));
    assert!(matches!(service.get_balance(2).await, Err(Error::AccountNotFound(_))));
}

#[tokio::test]
async fn test_ledger_scenario() {
    let service = AccountService::new();

    assert_eq!(service.deposit(123, 100.5).await.unwrap(), 100.5);
    assert_eq!(service.withdraw(123, 50.0).await.unwrap(), 50.5);

    let transfer = service.transfer(123, 456, 50.5).await.unwrap();
    assert_eq!(transfer.origin.balance, 0.0);
    assert_eq!(transfer.destination.balance, 50.5);

    assert_eq!(service.get_balance(123).await.unwrap(), 0.0);

    assert!(service.reset_all().await);
    assert!(matches!(service.get_balance(123).await, Err(Error::AccountNotFound(_))));
}

/// Repository whose deposits into one account always fail
struct FailingDestinationRepository {
    inner: InMemoryAccountRepository,
    broken: AccountId,
}

#[async_trait]
impl AccountRepository for FailingDestinationRepository {
    async fn create_account(&self, id: AccountId) -> Result<Account> {
        self.inner.create_account(id).await
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        self.inner.get_account(id).await
    }

    async fn deposit(&self, id: AccountId, amount: f64) -> Result<f64> {
        if id == self.broken {
            return Err(Error::Storage("disk full".to_string()));
        }
        self.inner.deposit(id, amount).await
    }

    async fn withdraw(&self, id: AccountId, amount: f64) -> Result<f64> {
        self.inner.withdraw(id, amount).await
    }

    async fn get_balance(&self, id: AccountId) -> Result<f64> {
        self.inner.get_balance(id).await
    }

    async fn reset_all(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn test_transfer_failure_after_withdrawal_is_not_rolled_back() {
    let repo = Arc::new(FailingDestinationRepository {
        inner: InMemoryAccountRepository::new(),
        broken: 2,
    });
    let service = AccountService::from_repository(repo);
    service.deposit(1, 30.0).await.unwrap();

    let err = service.transfer(1, 2, 10.0).await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)));

    // The origin stays debited
    assert_eq!(service.get_balance(1).await.unwrap(), 20.0);
}

#[tokio::test]
async fn test_reset_failure_is_reported() {
    let repo = Arc::new(FailingDestinationRepository {
        inner: InMemoryAccountRepository::new(),
        broken: 2,
    });
    let service = AccountService::from_repository(repo);

    assert!(!service.reset_all().await);
}
