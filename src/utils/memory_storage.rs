//! In-memory storage implementation for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct Tables {
    workgroups: HashMap<String, Workgroup>,
    institutions: HashMap<String, Institution>,
    users: HashMap<String, User>,
    accounts: HashMap<String, Account>,
    // Insertion order doubles as the tie-breaker for same-day transactions
    transactions: Vec<Transaction>,
}

/// In-memory storage implementation for testing and development
///
/// Clones share the same tables, so an account manager and a transaction
/// manager built from clones of one `MemoryStorage` see each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> LedgerResult<()> {
        *self.write()? = Tables::default();
        Ok(())
    }

    /// Number of stored transactions across all accounts
    pub fn transaction_count(&self) -> LedgerResult<usize> {
        Ok(self.read()?.transactions.len())
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(poisoned)
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(poisoned)
    }

    fn select_transactions<F>(&self, predicate: F) -> LedgerResult<Vec<Transaction>>
    where
        F: Fn(&Transaction) -> bool,
    {
        let mut selected: Vec<Transaction> = self
            .read()?
            .transactions
            .iter()
            .filter(|txn| predicate(txn))
            .cloned()
            .collect();
        // Stable sort keeps insertion order within a day
        selected.sort_by_key(|txn| txn.date);
        Ok(selected)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> LedgerError {
    LedgerError::Storage("memory storage lock poisoned".to_string())
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn save_workgroup(&mut self, workgroup: &Workgroup) -> LedgerResult<()> {
        self.write()?
            .workgroups
            .insert(workgroup.id.clone(), workgroup.clone());
        Ok(())
    }

    async fn get_workgroup(&self, workgroup_id: &str) -> LedgerResult<Option<Workgroup>> {
        Ok(self.read()?.workgroups.get(workgroup_id).cloned())
    }

    async fn save_institution(&mut self, institution: &Institution) -> LedgerResult<()> {
        self.write()?
            .institutions
            .insert(institution.id.clone(), institution.clone());
        Ok(())
    }

    async fn get_institution(&self, institution_id: &str) -> LedgerResult<Option<Institution>> {
        Ok(self.read()?.institutions.get(institution_id).cloned())
    }

    async fn save_user(&mut self, user: &User) -> LedgerResult<()> {
        self.write()?.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> LedgerResult<Option<User>> {
        Ok(self.read()?.users.get(user_id).cloned())
    }

    async fn save_account(&mut self, account: &Account) -> LedgerResult<()> {
        self.write()?
            .accounts
            .insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        Ok(self.read()?.accounts.get(account_id).cloned())
    }

    async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self.read()?.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(accounts)
    }

    async fn list_accounts_by_workgroups(
        &self,
        workgroup_ids: &[&str],
    ) -> LedgerResult<Vec<Account>> {
        let accounts = self.list_accounts().await?;
        Ok(accounts
            .into_iter()
            .filter(|account| workgroup_ids.contains(&account.workgroup_id.as_str()))
            .collect())
    }

    async fn update_account(&mut self, account: &Account) -> LedgerResult<()> {
        let mut tables = self.write()?;
        match tables.accounts.get_mut(&account.id) {
            Some(existing) => {
                *existing = account.clone();
                Ok(())
            }
            None => Err(LedgerError::AccountNotFound(account.id.clone())),
        }
    }

    async fn delete_account(&mut self, account_id: &str) -> LedgerResult<()> {
        if self.write()?.accounts.remove(account_id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::AccountNotFound(account_id.to_string()))
        }
    }

    async fn save_transaction(&mut self, transaction: &Transaction) -> LedgerResult<()> {
        let mut tables = self.write()?;
        match tables
            .transactions
            .iter()
            .position(|txn| txn.id == transaction.id)
        {
            Some(index) => tables.transactions[index] = transaction.clone(),
            None => tables.transactions.push(transaction.clone()),
        }
        Ok(())
    }

    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>> {
        Ok(self
            .read()?
            .transactions
            .iter()
            .find(|txn| txn.id == transaction_id)
            .cloned())
    }

    async fn get_account_transactions(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.select_transactions(|txn| {
            if txn.account_id != account_id {
                return false;
            }

            // Check date range
            if let Some(start) = start_date {
                if txn.date < start {
                    return false;
                }
            }
            if let Some(end) = end_date {
                if txn.date > end {
                    return false;
                }
            }

            true
        })
    }

    async fn get_account_transactions_by_type(
        &self,
        account_id: &str,
        transaction_type: TransactionType,
    ) -> LedgerResult<Vec<Transaction>> {
        self.select_transactions(|txn| {
            txn.account_id == account_id && txn.transaction_type == transaction_type
        })
    }

    async fn find_transactions_by_external_id(
        &self,
        account_id: &str,
        external_id: &str,
    ) -> LedgerResult<Vec<Transaction>> {
        self.select_transactions(|txn| {
            txn.account_id == account_id && txn.external_id.as_deref() == Some(external_id)
        })
    }

    async fn find_transactions_by_check_num(
        &self,
        account_id: &str,
        check_num: &str,
    ) -> LedgerResult<Vec<Transaction>> {
        self.select_transactions(|txn| {
            txn.account_id == account_id && txn.check_num.as_deref() == Some(check_num)
        })
    }

    async fn update_transaction(&mut self, transaction: &Transaction) -> LedgerResult<()> {
        let mut tables = self.write()?;
        match tables
            .transactions
            .iter_mut()
            .find(|txn| txn.id == transaction.id)
        {
            Some(existing) => {
                *existing = transaction.clone();
                Ok(())
            }
            None => Err(LedgerError::TransactionNotFound(transaction.id.clone())),
        }
    }

    async fn delete_transaction(&mut self, transaction_id: &str) -> LedgerResult<()> {
        let mut tables = self.write()?;
        let before = tables.transactions.len();
        tables.transactions.retain(|txn| txn.id != transaction_id);
        if tables.transactions.len() < before {
            Ok(())
        } else {
            Err(LedgerError::TransactionNotFound(transaction_id.to_string()))
        }
    }

    async fn delete_account_transactions(&mut self, account_id: &str) -> LedgerResult<usize> {
        let mut tables = self.write()?;
        let before = tables.transactions.len();
        tables.transactions.retain(|txn| txn.account_id != account_id);
        Ok(before - tables.transactions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(id: &str, account_id: &str, day: u32) -> Transaction {
        Transaction::new(
            id.to_string(),
            account_id.to_string(),
            date(2010, 1, day),
            BigDecimal::from(1),
            TransactionType::Credit,
        )
    }

    #[tokio::test]
    async fn test_transactions_come_back_in_register_order() {
        let mut storage = MemoryStorage::new();
        storage.save_transaction(&txn("c", "acc", 3)).await.unwrap();
        storage.save_transaction(&txn("a", "acc", 1)).await.unwrap();
        storage.save_transaction(&txn("b2", "acc", 2)).await.unwrap();
        storage.save_transaction(&txn("b1", "acc", 2)).await.unwrap();
        storage.save_transaction(&txn("x", "other", 1)).await.unwrap();

        let ids: Vec<String> = storage
            .get_account_transactions("acc", None, None)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["a", "b2", "b1", "c"]);

        let bounded = storage
            .get_account_transactions("acc", Some(date(2010, 1, 2)), Some(date(2010, 1, 2)))
            .await
            .unwrap();
        assert_eq!(bounded.len(), 2);
    }

    #[tokio::test]
    async fn test_shared_tables_across_clones() {
        let mut storage = MemoryStorage::new();
        let view = storage.clone();
        storage.save_transaction(&txn("a", "acc", 1)).await.unwrap();
        assert!(view.get_transaction("a").await.unwrap().is_some());
        assert_eq!(view.transaction_count().unwrap(), 1);

        view.clear().unwrap();
        assert_eq!(storage.transaction_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lookup_by_external_id_and_check_num() {
        let mut storage = MemoryStorage::new();
        let mut first = txn("a", "acc", 1);
        first.external_id = Some("FIT1".to_string());
        first.check_num = Some("100".to_string());
        storage.save_transaction(&first).await.unwrap();

        let mut second = txn("b", "acc", 2);
        second.external_id = Some("FIT1".to_string());
        storage.save_transaction(&second).await.unwrap();

        let found: Vec<String> = storage
            .find_transactions_by_external_id("acc", "FIT1")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(found, vec!["a", "b"]);
        assert!(storage
            .find_transactions_by_external_id("other", "FIT1")
            .await
            .unwrap()
            .is_empty());

        let by_check = storage
            .find_transactions_by_check_num("acc", "100")
            .await
            .unwrap();
        assert_eq!(by_check.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_rows() {
        let mut storage = MemoryStorage::new();
        let result = storage.update_transaction(&txn("missing", "acc", 1)).await;
        assert!(matches!(result, Err(LedgerError::TransactionNotFound(_))));

        let result = storage.delete_account("missing").await;
        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));

        storage.save_transaction(&txn("a", "acc", 1)).await.unwrap();
        storage.save_transaction(&txn("b", "acc", 2)).await.unwrap();
        assert_eq!(storage.delete_account_transactions("acc").await.unwrap(), 2);
    }
}
