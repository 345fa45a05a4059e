//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::*;

/// Storage abstraction for the ledger system
///
/// This trait allows the bookkeeping core to work with any storage backend
/// (PostgreSQL, SQLite, in-memory, etc.) by implementing these methods.
/// Transaction listings must come back in register order: date ascending,
/// ties in insertion order.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Save a workgroup to storage
    async fn save_workgroup(&mut self, workgroup: &Workgroup) -> LedgerResult<()>;

    /// Get a workgroup by ID
    async fn get_workgroup(&self, workgroup_id: &str) -> LedgerResult<Option<Workgroup>>;

    /// Save an institution to storage
    async fn save_institution(&mut self, institution: &Institution) -> LedgerResult<()>;

    /// Get an institution by ID
    async fn get_institution(&self, institution_id: &str) -> LedgerResult<Option<Institution>>;

    /// Save a user to storage
    async fn save_user(&mut self, user: &User) -> LedgerResult<()>;

    /// Get a user by ID
    async fn get_user(&self, user_id: &str) -> LedgerResult<Option<User>>;

    /// Save an account to storage
    async fn save_account(&mut self, account: &Account) -> LedgerResult<()>;

    /// Get an account by ID
    async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>>;

    /// List all accounts
    async fn list_accounts(&self) -> LedgerResult<Vec<Account>>;

    /// List accounts owned by any of the given workgroups
    async fn list_accounts_by_workgroups(
        &self,
        workgroup_ids: &[&str],
    ) -> LedgerResult<Vec<Account>>;

    /// Update an account
    async fn update_account(&mut self, account: &Account) -> LedgerResult<()>;

    /// Delete an account
    async fn delete_account(&mut self, account_id: &str) -> LedgerResult<()>;

    /// Save a transaction to storage
    async fn save_transaction(&mut self, transaction: &Transaction) -> LedgerResult<()>;

    /// Get a transaction by ID
    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>>;

    /// List transactions for an account, optionally bounded by an inclusive date range
    async fn get_account_transactions(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>>;

    /// List transactions of one type for an account
    async fn get_account_transactions_by_type(
        &self,
        account_id: &str,
        transaction_type: TransactionType,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Find transactions carrying a bank-assigned identifier
    async fn find_transactions_by_external_id(
        &self,
        account_id: &str,
        external_id: &str,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Find transactions carrying a check number
    async fn find_transactions_by_check_num(
        &self,
        account_id: &str,
        check_num: &str,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Update a transaction
    async fn update_transaction(&mut self, transaction: &Transaction) -> LedgerResult<()>;

    /// Delete a transaction
    async fn delete_transaction(&mut self, transaction_id: &str) -> LedgerResult<()>;

    /// Delete every transaction of an account, returning how many were removed
    async fn delete_account_transactions(&mut self, account_id: &str) -> LedgerResult<usize>;
}

/// Trait for implementing custom account validation rules
pub trait AccountValidator: Send + Sync {
    /// Validate an account before saving
    fn validate_account(&self, account: &Account) -> LedgerResult<()>;

    /// Validate account deletion
    fn validate_account_deletion(&self, account: &Account) -> LedgerResult<()>;
}

/// Trait for implementing custom transaction validation rules
pub trait TransactionValidator: Send + Sync {
    /// Validate a transaction before saving
    fn validate_transaction(&self, transaction: &Transaction) -> LedgerResult<()>;
}

/// Default account validator with the mandatory-field rules
pub struct DefaultAccountValidator;

impl AccountValidator for DefaultAccountValidator {
    fn validate_account(&self, account: &Account) -> LedgerResult<()> {
        if account.id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Account ID cannot be empty".to_string(),
            ));
        }

        if account.workgroup_id.trim().is_empty() {
            return Err(LedgerError::Validation("Workgroup is required".to_string()));
        }

        if account.institution_id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Institution is required".to_string(),
            ));
        }

        if account.name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Account name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_account_deletion(&self, _account: &Account) -> LedgerResult<()> {
        Ok(())
    }
}

/// Default transaction validator
pub struct DefaultTransactionValidator;

impl TransactionValidator for DefaultTransactionValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> LedgerResult<()> {
        transaction.validate()
    }
}
