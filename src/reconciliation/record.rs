//! Statement records as they arrive from a bank download

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// One line of an imported bank statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub date: NaiveDate,
    pub amount: BigDecimal,
    /// Falls back to the sign of the amount when absent
    pub transaction_type: Option<TransactionType>,
    /// Bank-assigned identifier
    pub external_id: Option<String>,
    pub check_num: Option<String>,
    pub target: Option<String>,
    pub description: Option<String>,
}

impl ImportRecord {
    pub fn new(date: NaiveDate, amount: BigDecimal) -> Self {
        Self {
            date,
            amount,
            transaction_type: None,
            external_id: None,
            check_num: None,
            target: None,
            description: None,
        }
    }

    pub fn with_transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn with_check_num(mut self, check_num: impl Into<String>) -> Self {
        self.check_num = Some(check_num.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Exchange the payee and memo columns
    pub fn switch_target_and_description(&mut self) {
        std::mem::swap(&mut self.target, &mut self.description);
    }

    /// External id with blanks treated as absent
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// Check number with blanks treated as absent
    pub fn check_num(&self) -> Option<&str> {
        self.check_num.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// New unregistered register entry for the record
    pub fn to_transaction(&self, account_id: &str) -> Transaction {
        let transaction_type = self
            .transaction_type
            .unwrap_or_else(|| TransactionType::for_amount(&self.amount));

        let mut transaction = Transaction::new(
            uuid::Uuid::new_v4().to_string(),
            account_id.to_string(),
            self.date,
            self.amount.clone(),
            transaction_type,
        );
        transaction.external_id = non_blank(self.external_id.clone());
        transaction.check_num = non_blank(self.check_num.clone());
        transaction.target = self.target.clone();
        transaction.description = self.description.clone();
        transaction
    }
}
