//! Main ledger orchestrator that coordinates accounts, registers, interest and imports

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use tracing::info;

use crate::config::LedgerConfig;
use crate::interest::AccrualCalculator;
use crate::ledger::{sum_balance, AccountManager, TransactionManager};
use crate::reconciliation::{ImportReconciler, ImportRecord, ImportSummary};
use crate::traits::*;
use crate::types::*;

/// Main ledger system that orchestrates all bookkeeping operations
pub struct Ledger<S: LedgerStorage> {
    account_manager: AccountManager<S>,
    transaction_manager: TransactionManager<S>,
    accrual: AccrualCalculator,
}

impl<S: LedgerStorage + Clone> Ledger<S> {
    /// Create a new ledger with the given storage backend
    pub fn new(storage: S) -> Self {
        let config = LedgerConfig::default();
        Self {
            accrual: AccrualCalculator::new(config.amount_scale),
            account_manager: AccountManager::with_config(storage.clone(), config.clone()),
            transaction_manager: TransactionManager::with_config(storage, config),
        }
    }

    /// Create a new ledger with a validated configuration
    pub fn with_config(storage: S, config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self {
            accrual: AccrualCalculator::new(config.amount_scale),
            account_manager: AccountManager::with_config(storage.clone(), config.clone()),
            transaction_manager: TransactionManager::with_config(storage, config),
        })
    }

    /// Create a new ledger with custom validators
    pub fn with_validators(
        storage: S,
        account_validator: Box<dyn AccountValidator>,
        transaction_validator: Box<dyn TransactionValidator>,
    ) -> Self {
        let config = LedgerConfig::default();
        Self {
            accrual: AccrualCalculator::new(config.amount_scale),
            account_manager: AccountManager::with_validator(storage.clone(), account_validator),
            transaction_manager: TransactionManager::with_validator(storage, transaction_validator),
        }
    }
}

impl<S: LedgerStorage> Ledger<S> {
    /// Replace the configuration used for new rows
    pub fn set_config(&mut self, config: LedgerConfig) -> LedgerResult<()> {
        config.validate()?;
        self.accrual = AccrualCalculator::new(config.amount_scale);
        self.account_manager.set_config(config.clone());
        self.transaction_manager.set_config(config);
        Ok(())
    }

    pub fn config(&self) -> &LedgerConfig {
        self.transaction_manager.config()
    }

    // Reference data
    /// Save a workgroup
    pub async fn create_workgroup(&mut self, workgroup: Workgroup) -> LedgerResult<Workgroup> {
        self.account_manager.create_workgroup(workgroup).await
    }

    /// Save an institution
    pub async fn create_institution(
        &mut self,
        institution: Institution,
    ) -> LedgerResult<Institution> {
        self.account_manager.create_institution(institution).await
    }

    /// Save a user
    pub async fn create_user(&mut self, user: User) -> LedgerResult<User> {
        self.account_manager.create_user(user).await
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: &str) -> LedgerResult<User> {
        self.account_manager.get_user(user_id).await
    }

    // Account operations
    /// Create a new account and its opening-balance transaction
    pub async fn create_account(&mut self, params: AccountParams) -> LedgerResult<Account> {
        self.account_manager.create_account(params).await
    }

    /// Get an account by ID
    pub async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        self.account_manager.get_account(account_id).await
    }

    /// Get an account by ID, returning an error if not found
    pub async fn get_account_required(&self, account_id: &str) -> LedgerResult<Account> {
        self.account_manager.get_account_required(account_id).await
    }

    /// List all accounts
    pub async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        self.account_manager.list_accounts().await
    }

    /// Accounts visible to a user through their workgroups
    pub async fn accounts_by_user(&self, user: &User) -> LedgerResult<Vec<Account>> {
        self.account_manager.accounts_by_user(user).await
    }

    /// `"<institution>:<account>"` display name
    pub async fn long_name(&self, account: &Account) -> LedgerResult<String> {
        self.account_manager.long_name(account).await
    }

    /// Update an account
    pub async fn update_account(&mut self, account: &Account) -> LedgerResult<Account> {
        self.account_manager.update_account(account).await
    }

    /// Delete an account and its register
    pub async fn delete_account(&mut self, account_id: &str) -> LedgerResult<()> {
        self.account_manager.delete_account(account_id).await
    }

    // Transaction operations
    /// Record a new transaction
    pub async fn record_transaction(
        &mut self,
        transaction: Transaction,
    ) -> LedgerResult<Transaction> {
        self.transaction_manager
            .record_transaction(transaction)
            .await
    }

    /// Get a transaction by ID
    pub async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>> {
        self.transaction_manager
            .get_transaction(transaction_id)
            .await
    }

    /// Account register in date order
    pub async fn get_account_transactions(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.transaction_manager
            .get_account_transactions(account_id, start_date, end_date)
            .await
    }

    /// Transactions of one type in an account register
    pub async fn transactions_by_type(
        &self,
        account_id: &str,
        transaction_type: TransactionType,
    ) -> LedgerResult<Vec<Transaction>> {
        self.transaction_manager
            .transactions_by_type(account_id, transaction_type)
            .await
    }

    /// Update a transaction
    pub async fn update_transaction(
        &mut self,
        transaction: &Transaction,
    ) -> LedgerResult<Transaction> {
        self.transaction_manager
            .update_transaction(transaction)
            .await
    }

    /// Delete a transaction
    pub async fn delete_transaction(&mut self, transaction_id: &str) -> LedgerResult<()> {
        self.transaction_manager
            .delete_transaction(transaction_id)
            .await
    }

    // Balances
    /// Balance of an account up to a cut-off
    pub async fn balance(&self, account_id: &str, as_of: BalanceAsOf) -> LedgerResult<BigDecimal> {
        self.transaction_manager.balance(account_id, as_of).await
    }

    /// Total balance of an account
    pub async fn current_balance(&self, account_id: &str) -> LedgerResult<BigDecimal> {
        self.balance(account_id, BalanceAsOf::All).await
    }

    // Interest
    /// Date of the most recent interest transaction, if any
    pub async fn last_interest_accrual(&self, account_id: &str) -> LedgerResult<Option<NaiveDate>> {
        let interest = self
            .transactions_by_type(account_id, TransactionType::Int)
            .await?;
        Ok(self.accrual.last_interest_accrual(&interest))
    }

    /// Date on which interest is next due
    pub async fn next_interest_accrual(&self, account_id: &str) -> LedgerResult<NaiveDate> {
        let account = self.get_account_required(account_id).await?;
        let interest = self
            .transactions_by_type(account_id, TransactionType::Int)
            .await?;
        self.accrual.next_interest_accrual(&account, &interest)
    }

    /// Post interest for every accrual period that has come due by `today`
    ///
    /// Each period yields at most one INT transaction, dated on the accrual
    /// date and computed from the balance of the days before it. Periods in
    /// which the interest condition does not hold, or the interest rounds to
    /// zero, are skipped.
    pub async fn post_interest_due(
        &mut self,
        account_id: &str,
        today: NaiveDate,
    ) -> LedgerResult<Vec<Transaction>> {
        let account = self.get_account_required(account_id).await?;
        let last = self.last_interest_accrual(account_id).await?;
        let due = self.accrual.due_dates(&account, last, today)?;

        let mut posted = Vec::new();
        for accrual_date in due {
            let register = self
                .get_account_transactions(account_id, None, None)
                .await?;
            let balance = sum_balance(&register, BalanceAsOf::Date(accrual_date));

            if !account.interest_condition.is_satisfied_by(&balance) {
                continue;
            }

            let amount = self
                .accrual
                .interest_amount(&balance, &account.interest_rate);
            if amount.is_zero() {
                continue;
            }

            let mut transaction = Transaction::new(
                uuid::Uuid::new_v4().to_string(),
                account.id.clone(),
                accrual_date,
                amount,
                TransactionType::Int,
            );
            transaction.description = Some(self.config().interest_description.clone());

            let transaction = self.record_transaction(transaction).await?;
            info!(
                account_id = %account.id,
                date = %accrual_date,
                amount = %transaction.amount,
                "posted interest"
            );
            posted.push(transaction);
        }

        Ok(posted)
    }

    // Imports
    /// Reconcile bank statement records against an account register
    pub async fn process_import_transactions(
        &mut self,
        account_id: &str,
        records: Vec<ImportRecord>,
    ) -> LedgerResult<ImportSummary> {
        let account = self.get_account_required(account_id).await?;
        ImportReconciler::new(&mut self.transaction_manager)
            .process(&account, records)
            .await
    }
}
