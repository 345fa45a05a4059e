//! Account management functionality

use bigdecimal::BigDecimal;
use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::traits::*;
use crate::types::*;
use crate::utils::validate_amount_scale;

/// Account manager for handling account lifecycle and lookups
pub struct AccountManager<S: LedgerStorage> {
    pub(crate) storage: S,
    validator: Box<dyn AccountValidator>,
    config: LedgerConfig,
}

impl<S: LedgerStorage> AccountManager<S> {
    /// Create a new account manager
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, LedgerConfig::default())
    }

    /// Create a new account manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn AccountValidator>) -> Self {
        Self {
            storage,
            validator,
            config: LedgerConfig::default(),
        }
    }

    /// Create a new account manager with a configuration
    pub fn with_config(storage: S, config: LedgerConfig) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultAccountValidator),
            config,
        }
    }

    pub(crate) fn set_config(&mut self, config: LedgerConfig) {
        self.config = config;
    }

    /// Save a workgroup
    pub async fn create_workgroup(&mut self, workgroup: Workgroup) -> LedgerResult<Workgroup> {
        if workgroup.id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Workgroup ID cannot be empty".to_string(),
            ));
        }
        self.storage.save_workgroup(&workgroup).await?;
        Ok(workgroup)
    }

    /// Save an institution
    pub async fn create_institution(
        &mut self,
        institution: Institution,
    ) -> LedgerResult<Institution> {
        if institution.id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Institution ID cannot be empty".to_string(),
            ));
        }
        self.storage.save_institution(&institution).await?;
        Ok(institution)
    }

    /// Save a user; every workgroup they reference must exist
    pub async fn create_user(&mut self, user: User) -> LedgerResult<User> {
        for workgroup_id in user.visible_workgroups() {
            if self.storage.get_workgroup(workgroup_id).await?.is_none() {
                return Err(LedgerError::WorkgroupNotFound(workgroup_id.to_string()));
            }
        }
        self.storage.save_user(&user).await?;
        Ok(user)
    }

    /// Get a user by ID, returning an error if not found
    pub async fn get_user(&self, user_id: &str) -> LedgerResult<User> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))
    }

    /// Create a new account together with its opening-balance transaction
    pub async fn create_account(&mut self, params: AccountParams) -> LedgerResult<Account> {
        let mut account = params.into_account().inspect_err(|e| {
            warn!(error = %e, "rejected account params");
        })?;
        validate_amount_scale(&account.opening_balance, self.config.amount_scale)?;
        account.interest_rate = self.normalize_rate(&account.interest_rate);
        account.opening_balance = account
            .opening_balance
            .with_scale(self.config.amount_scale);

        // Validate the account
        self.validator.validate_account(&account)?;

        // Check if account already exists
        if let Some(_existing) = self.storage.get_account(&account.id).await? {
            return Err(LedgerError::Validation(format!(
                "Account with ID '{}' already exists",
                account.id
            )));
        }

        self.ensure_references(&account).await?;

        self.storage.save_account(&account).await?;

        let opening = account.opening_transaction(
            uuid::Uuid::new_v4().to_string(),
            &self.config.opening_description,
        );
        self.storage.save_transaction(&opening).await?;

        info!(
            account_id = %account.id,
            opening_balance = %account.opening_balance,
            "created account"
        );

        Ok(account)
    }

    /// Get an account by ID
    pub async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        self.storage.get_account(account_id).await
    }

    /// Get an account by ID, returning an error if not found
    pub async fn get_account_required(&self, account_id: &str) -> LedgerResult<Account> {
        self.storage
            .get_account(account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))
    }

    /// List all accounts
    pub async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        self.storage.list_accounts().await
    }

    /// Accounts visible to a user through their workgroups
    pub async fn accounts_by_user(&self, user: &User) -> LedgerResult<Vec<Account>> {
        self.storage
            .list_accounts_by_workgroups(&user.visible_workgroups())
            .await
    }

    /// `"<institution>:<account>"` display name
    pub async fn long_name(&self, account: &Account) -> LedgerResult<String> {
        let institution = self
            .storage
            .get_institution(&account.institution_id)
            .await?
            .ok_or_else(|| LedgerError::InstitutionNotFound(account.institution_id.clone()))?;
        Ok(account.long_name(&institution))
    }

    /// Update an account
    ///
    /// The opening balance is fixed at creation; edit the opening
    /// transaction to change it.
    pub async fn update_account(&mut self, account: &Account) -> LedgerResult<Account> {
        self.validator.validate_account(account)?;

        let existing = self.get_account_required(&account.id).await?;
        self.ensure_references(account).await?;

        let mut updated = account.clone();
        updated.interest_rate = self.normalize_rate(&account.interest_rate);
        updated.opening_balance = existing.opening_balance;
        updated.created_at = existing.created_at;
        updated.updated_at = chrono::Utc::now().naive_utc();

        self.storage.update_account(&updated).await?;
        Ok(updated)
    }

    /// Delete an account and its register
    pub async fn delete_account(&mut self, account_id: &str) -> LedgerResult<()> {
        let account = self.get_account_required(account_id).await?;
        self.validator.validate_account_deletion(&account)?;

        let removed = self.storage.delete_account_transactions(account_id).await?;
        self.storage.delete_account(account_id).await?;

        info!(account_id, removed_transactions = removed, "deleted account");
        Ok(())
    }

    async fn ensure_references(&self, account: &Account) -> LedgerResult<()> {
        if self
            .storage
            .get_workgroup(&account.workgroup_id)
            .await?
            .is_none()
        {
            return Err(LedgerError::WorkgroupNotFound(account.workgroup_id.clone()));
        }

        if self
            .storage
            .get_institution(&account.institution_id)
            .await?
            .is_none()
        {
            return Err(LedgerError::InstitutionNotFound(
                account.institution_id.clone(),
            ));
        }

        Ok(())
    }

    // Extra digits are dropped, not rounded: 4.45678 is stored as 4.4567
    fn normalize_rate(&self, rate: &BigDecimal) -> BigDecimal {
        rate.with_scale(self.config.interest_rate_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryStorage;
    use chrono::NaiveDate;
    use std::str::FromStr;

    async fn manager() -> AccountManager<MemoryStorage> {
        let mut manager = AccountManager::new(MemoryStorage::new());
        manager
            .create_workgroup(Workgroup::new("wg1".to_string(), "Home".to_string()))
            .await
            .unwrap();
        manager
            .create_institution(Institution::new(
                "bank1".to_string(),
                "First Bank".to_string(),
            ))
            .await
            .unwrap();
        manager
    }

    fn params(name: &str) -> AccountParams {
        AccountParams::new(
            "wg1",
            "bank1",
            name,
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            InterestAccrual::Monthly,
        )
    }

    #[tokio::test]
    async fn test_interest_rate_keeps_four_places() {
        let mut manager = manager().await;
        let account = manager
            .create_account(
                params("Savings").interest_rate(BigDecimal::from_str("4.45678").unwrap()),
            )
            .await
            .unwrap();

        let stored = manager.get_account_required(&account.id).await.unwrap();
        assert_eq!(stored.interest_rate, BigDecimal::from_str("4.4567").unwrap());
    }

    #[tokio::test]
    async fn test_unknown_references_rejected() {
        let mut manager = manager().await;

        let mut bad_workgroup = params("Checking");
        bad_workgroup.workgroup_id = Some("nope".to_string());
        let result = manager.create_account(bad_workgroup).await;
        assert!(matches!(result, Err(LedgerError::WorkgroupNotFound(_))));

        let mut bad_institution = params("Checking");
        bad_institution.institution_id = Some("nope".to_string());
        let result = manager.create_account(bad_institution).await;
        assert!(matches!(result, Err(LedgerError::InstitutionNotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_account_id_rejected() {
        let mut manager = manager().await;
        manager
            .create_account(params("Checking").id("acc1"))
            .await
            .unwrap();
        let result = manager.create_account(params("Other").id("acc1")).await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_long_name() {
        let mut manager = manager().await;
        let account = manager.create_account(params("Checking")).await.unwrap();
        assert_eq!(
            manager.long_name(&account).await.unwrap(),
            "First Bank:Checking"
        );
    }

    #[tokio::test]
    async fn test_update_keeps_opening_balance() {
        let mut manager = manager().await;
        let mut account = manager
            .create_account(params("Checking").opening_balance(BigDecimal::from(50)))
            .await
            .unwrap();

        account.name = "Everyday".to_string();
        account.opening_balance = BigDecimal::from(999);
        let updated = manager.update_account(&account).await.unwrap();

        assert_eq!(updated.name, "Everyday");
        assert_eq!(updated.opening_balance, BigDecimal::from(50));
    }

    #[tokio::test]
    async fn test_user_with_unknown_workgroup_rejected() {
        let mut manager = manager().await;
        let mut user = User::new("u1".to_string(), "Sam".to_string(), "wg1".to_string());
        user.workgroup_ids.push("missing".to_string());
        let result = manager.create_user(user).await;
        assert!(matches!(result, Err(LedgerError::WorkgroupNotFound(_))));
    }
}
