//! Account models and validation rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Account identifier. Only positive values name a valid account.
pub type AccountId = i64;

/// Account model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Account {
    /// Account ID
    pub id: AccountId,
    /// Current balance
    pub balance: f64,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance
    pub fn new(id: AccountId) -> Self {
        let now = Utc::now();
        Self {
            id,
            balance: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add funds to the balance
    pub fn deposit(&mut self, amount: f64) -> Result<f64> {
        let balance = self.balance + amount;
        if !balance.is_finite() {
            return Err(Error::InvalidAmount(format!(
                "Depositing {} would overflow the balance of account {}",
                amount, self.id
            )));
        }

        self.balance = balance;
        self.updated_at = Utc::now();
        Ok(self.balance)
    }

    /// Remove funds from the balance
    pub fn withdraw(&mut self, amount: f64) -> Result<f64> {
        if amount > self.balance {
            return Err(Error::InsufficientFunds(format!(
                "Cannot withdraw {} from account {} with balance {}",
                amount, self.id, self.balance
            )));
        }

        self.balance -= amount;
        self.updated_at = Utc::now();
        Ok(self.balance)
    }
}

/// Id and balance pair reported back after a mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct AccountBalance {
    /// Account ID, rendered as a string
    #[serde(serialize_with = "serialize_id")]
    #[cfg_attr(feature = "utoipa", schema(value_type = String))]
    pub id: AccountId,
    /// Balance after the operation
    pub balance: f64,
}

impl AccountBalance {
    pub fn new(id: AccountId, balance: f64) -> Self {
        Self { id, balance }
    }
}

fn serialize_id<S: Serializer>(id: &AccountId, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(id)
}

/// Check that an account id is a positive integer
pub fn validate_account_id(id: AccountId) -> Result<()> {
    if id <= 0 {
        return Err(Error::InvalidAccountId(format!(
            "Account ID must be a positive integer, got {}.",
            id
        )));
    }
    Ok(())
}

/// Check that an amount is a positive, finite number
pub fn validate_amount(amount: f64) -> Result<()> {
    // NaN fails both comparisons, so test for the accepted range instead
    if !(amount > 0.0 && amount.is_finite()) {
        return Err(Error::InvalidAmount(format!(
            "Amount must be a positive number, got {}.",
            amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_validation() {
        assert!(validate_account_id(1).is_ok());
        assert!(validate_account_id(i64::MAX).is_ok());
        assert!(matches!(validate_account_id(0), Err(Error::InvalidAccountId(_))));
        assert!(matches!(validate_account_id(-3), Err(Error::InvalidAccountId(_))));
    }

    #[test]
    fn test_amount_validation() {
        assert!(validate_amount(0.01).is_ok());
        assert!(matches!(validate_amount(0.0), Err(Error::InvalidAmount(_))));
        assert!(matches!(validate_amount(-5.0), Err(Error::InvalidAmount(_))));
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn test_balance_operations() {
        let mut account = Account::new(123);
        assert_eq!(account.balance, 0.0);

        assert_eq!(account.deposit(100.5).unwrap(), 100.5);
        assert_eq!(account.withdraw(50.0).unwrap(), 50.5);

        // Insufficient funds leaves the balance untouched
        let result = account.withdraw(60.0);
        assert!(matches!(result, Err(Error::InsufficientFunds(_))));
        assert_eq!(account.balance, 50.5);

        // Withdrawing the exact balance is allowed
        assert_eq!(account.withdraw(50.5).unwrap(), 0.0);
    }

    #[test]
    fn test_deposit_rejects_overflowing_balance() {
        let mut account = Account::new(1);
        account.deposit(f64::MAX).unwrap();

        let result = account.deposit(f64::MAX);
        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        assert_eq!(account.balance, f64::MAX);
    }

    #[test]
    fn test_account_balance_serializes_id_as_string() {
        let json = serde_json::to_value(AccountBalance::new(456, 50.5)).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "456", "balance": 50.5 }));
    }
}
