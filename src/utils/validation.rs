//! Validation utilities

use bigdecimal::BigDecimal;

use crate::traits::*;
use crate::types::*;

/// Validate that an amount carries no more decimal places than `scale`
pub fn validate_amount_scale(amount: &BigDecimal, scale: i64) -> LedgerResult<()> {
    if amount.with_scale(scale) != *amount {
        Err(LedgerError::Validation(format!(
            "Amount {} has more than {} decimal places",
            amount, scale
        )))
    } else {
        Ok(())
    }
}

/// Validate that an identifier is valid
pub fn validate_id(kind: &str, id: &str) -> LedgerResult<()> {
    if id.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{} ID cannot be empty", kind)));
    }

    if id.len() > 64 {
        return Err(LedgerError::Validation(format!(
            "{} ID cannot exceed 64 characters",
            kind
        )));
    }

    // Check for valid characters (alphanumeric, dashes, underscores)
    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LedgerError::Validation(format!(
            "{} ID can only contain alphanumeric characters, dashes, and underscores",
            kind
        )));
    }

    Ok(())
}

/// Validate that an account name is valid
pub fn validate_account_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(LedgerError::Validation(
            "Account name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that a check number is purely numeric
pub fn validate_check_num(check_num: &str) -> LedgerResult<()> {
    if check_num.is_empty() || !check_num.chars().all(|c| c.is_ascii_digit()) {
        return Err(LedgerError::Validation(format!(
            "Check number '{}' must contain only digits",
            check_num
        )));
    }

    Ok(())
}

/// Validate that a free-text field is not too long
pub fn validate_text(field: &str, value: Option<&str>) -> LedgerResult<()> {
    if value.is_some_and(|v| v.len() > 255) {
        return Err(LedgerError::Validation(format!(
            "{} cannot exceed 255 characters",
            field
        )));
    }

    Ok(())
}

/// Enhanced transaction validator with detailed checks
pub struct EnhancedTransactionValidator;

impl TransactionValidator for EnhancedTransactionValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> LedgerResult<()> {
        // Basic validation
        transaction.validate()?;

        validate_id("Transaction", &transaction.id)?;
        validate_amount_scale(&transaction.amount, 2)?;
        if let Some(check_num) = transaction.check_num.as_deref() {
            validate_check_num(check_num)?;
        }
        validate_text("Target", transaction.target.as_deref())?;
        validate_text("Description", transaction.description.as_deref())?;

        Ok(())
    }
}

/// Enhanced account validator with detailed checks
pub struct EnhancedAccountValidator;

impl AccountValidator for EnhancedAccountValidator {
    fn validate_account(&self, account: &Account) -> LedgerResult<()> {
        DefaultAccountValidator.validate_account(account)?;

        validate_id("Account", &account.id)?;
        validate_account_name(&account.name)?;

        if account.interest_rate < BigDecimal::from(0) {
            return Err(LedgerError::Validation(
                "Interest rate cannot be negative".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_account_deletion(&self, _account: &Account) -> LedgerResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_amount_scale() {
        assert!(validate_amount_scale(&BigDecimal::from_str("3.33").unwrap(), 2).is_ok());
        assert!(validate_amount_scale(&BigDecimal::from(3), 2).is_ok());
        assert!(validate_amount_scale(&BigDecimal::from_str("3.333").unwrap(), 2).is_err());
    }

    #[test]
    fn test_ids_and_check_numbers() {
        assert!(validate_id("Account", "acc-1_a").is_ok());
        assert!(validate_id("Account", "acc 1").is_err());
        assert!(validate_id("Account", "").is_err());

        assert!(validate_check_num("1024").is_ok());
        assert!(validate_check_num("10a").is_err());
    }

    #[test]
    fn test_enhanced_transaction_validator() {
        let date = chrono::NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        let mut txn = Transaction::new(
            "t1".to_string(),
            "acc".to_string(),
            date,
            BigDecimal::from_str("-12.50").unwrap(),
            TransactionType::Debit,
        );
        txn.check_num = Some("101".to_string());
        assert!(EnhancedTransactionValidator.validate_transaction(&txn).is_ok());

        txn.check_num = Some("ten".to_string());
        assert!(EnhancedTransactionValidator.validate_transaction(&txn).is_err());
    }
}
