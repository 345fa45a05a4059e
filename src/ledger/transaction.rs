//! Transaction processing and management

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use tracing::debug;

use crate::config::LedgerConfig;
use crate::traits::*;
use crate::types::*;
use crate::utils::validate_amount_scale;

/// Sum a register up to a cut-off
///
/// `transactions` must be in register order for `BalanceAsOf::Position`
/// to be meaningful.
pub fn sum_balance(transactions: &[Transaction], as_of: BalanceAsOf) -> BigDecimal {
    let amounts = transactions.iter().enumerate().filter_map(|(position, txn)| {
        let included = match as_of {
            BalanceAsOf::All => true,
            BalanceAsOf::Date(date) => txn.date < date,
            BalanceAsOf::Position(last) => position <= last,
        };
        included.then_some(&txn.amount)
    });

    amounts.fold(BigDecimal::zero(), |total, amount| total + amount)
}

/// Transaction manager for handling register operations
pub struct TransactionManager<S: LedgerStorage> {
    pub(crate) storage: S,
    validator: Box<dyn TransactionValidator>,
    config: LedgerConfig,
}

impl<S: LedgerStorage> TransactionManager<S> {
    /// Create a new transaction manager
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, LedgerConfig::default())
    }

    /// Create a new transaction manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn TransactionValidator>) -> Self {
        Self {
            storage,
            validator,
            config: LedgerConfig::default(),
        }
    }

    /// Create a new transaction manager with a configuration
    pub fn with_config(storage: S, config: LedgerConfig) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultTransactionValidator),
            config,
        }
    }

    pub(crate) fn set_config(&mut self, config: LedgerConfig) {
        self.config = config;
    }

    pub(crate) fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Field rules a transaction must pass before it is written
    pub(crate) fn check_transaction(&self, transaction: &Transaction) -> LedgerResult<()> {
        self.validator.validate_transaction(transaction)?;
        validate_amount_scale(&transaction.amount, self.config.amount_scale)
    }

    /// Record a new transaction
    pub async fn record_transaction(
        &mut self,
        mut transaction: Transaction,
    ) -> LedgerResult<Transaction> {
        self.check_transaction(&transaction)?;

        if self.storage.get_account(&transaction.account_id).await?.is_none() {
            return Err(LedgerError::AccountNotFound(transaction.account_id.clone()));
        }

        if self.storage.get_transaction(&transaction.id).await?.is_some() {
            return Err(LedgerError::Validation(format!(
                "Transaction with ID '{}' already exists",
                transaction.id
            )));
        }

        transaction.amount = transaction.amount.with_scale(self.config.amount_scale);
        transaction.updated_at = chrono::Utc::now().naive_utc();

        self.storage.save_transaction(&transaction).await?;

        debug!(
            transaction_id = %transaction.id,
            account_id = %transaction.account_id,
            amount = %transaction.amount,
            "recorded transaction"
        );

        Ok(transaction)
    }

    /// Get a transaction by ID
    pub async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>> {
        self.storage.get_transaction(transaction_id).await
    }

    /// Get a transaction by ID, returning an error if not found
    pub async fn get_transaction_required(
        &self,
        transaction_id: &str,
    ) -> LedgerResult<Transaction> {
        self.storage
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.to_string()))
    }

    /// Account register in date order, optionally bounded by an inclusive date range
    pub async fn get_account_transactions(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.storage
            .get_account_transactions(account_id, start_date, end_date)
            .await
    }

    /// Transactions of one type in an account register
    pub async fn transactions_by_type(
        &self,
        account_id: &str,
        transaction_type: TransactionType,
    ) -> LedgerResult<Vec<Transaction>> {
        self.storage
            .get_account_transactions_by_type(account_id, transaction_type)
            .await
    }

    /// Update a transaction; it may not move to another account
    pub async fn update_transaction(
        &mut self,
        transaction: &Transaction,
    ) -> LedgerResult<Transaction> {
        let existing = self.get_transaction_required(&transaction.id).await?;

        self.check_transaction(transaction)?;

        if existing.account_id != transaction.account_id {
            return Err(LedgerError::InvalidTransaction(format!(
                "Transaction '{}' cannot move from account '{}' to '{}'",
                transaction.id, existing.account_id, transaction.account_id
            )));
        }

        let mut updated = transaction.clone();
        updated.amount = updated.amount.with_scale(self.config.amount_scale);
        updated.created_at = existing.created_at;
        updated.updated_at = chrono::Utc::now().naive_utc();

        self.storage.update_transaction(&updated).await?;
        Ok(updated)
    }

    /// Mark a transaction as matched against the bank
    pub async fn set_registered(
        &mut self,
        transaction_id: &str,
        registered: bool,
    ) -> LedgerResult<Transaction> {
        let mut transaction = self.get_transaction_required(transaction_id).await?;
        transaction.registered = registered;
        transaction.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_transaction(&transaction).await?;
        Ok(transaction)
    }

    /// Delete a transaction
    pub async fn delete_transaction(&mut self, transaction_id: &str) -> LedgerResult<()> {
        self.get_transaction_required(transaction_id).await?;
        self.storage.delete_transaction(transaction_id).await
    }

    /// Balance of an account up to a cut-off
    pub async fn balance(&self, account_id: &str, as_of: BalanceAsOf) -> LedgerResult<BigDecimal> {
        if self.storage.get_account(account_id).await?.is_none() {
            return Err(LedgerError::AccountNotFound(account_id.to_string()));
        }

        let transactions = self
            .storage
            .get_account_transactions(account_id, None, None)
            .await?;
        Ok(sum_balance(&transactions, as_of))
    }
}

/// Transaction builder for register entries
#[derive(Debug)]
pub struct TransactionBuilder {
    transaction: Transaction,
}

impl TransactionBuilder {
    /// Start a transaction whose type follows the sign of the amount
    pub fn new(account_id: String, date: NaiveDate, amount: BigDecimal) -> Self {
        let transaction_type = TransactionType::for_amount(&amount);
        Self {
            transaction: Transaction::new(
                uuid::Uuid::new_v4().to_string(),
                account_id,
                date,
                amount,
                transaction_type,
            ),
        }
    }

    /// Use a caller-chosen ID instead of a generated one
    pub fn id(mut self, id: String) -> Self {
        self.transaction.id = id;
        self
    }

    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction.transaction_type = transaction_type;
        self
    }

    /// Set the bank-assigned identifier
    pub fn external_id(mut self, external_id: String) -> Self {
        self.transaction.external_id = Some(external_id);
        self
    }

    pub fn check_num(mut self, check_num: String) -> Self {
        self.transaction.check_num = Some(check_num);
        self
    }

    pub fn target(mut self, target: String) -> Self {
        self.transaction.target = Some(target);
        self
    }

    pub fn description(mut self, description: String) -> Self {
        self.transaction.description = Some(description);
        self
    }

    pub fn registered(mut self, registered: bool) -> Self {
        self.transaction.registered = registered;
        self
    }

    /// Build the transaction
    pub fn build(self) -> LedgerResult<Transaction> {
        self.transaction.validate()?;
        Ok(self.transaction)
    }
}
