//! Core types and data structures for the bookkeeping system

use bigdecimal::{BigDecimal, Zero};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a register entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money coming into the account (positive amount)
    Credit,
    /// Money leaving the account (negative amount)
    Debit,
    /// Interest posted by accrual
    Int,
}

impl TransactionType {
    /// Type implied by the sign of an amount: CREDIT for zero or positive, DEBIT otherwise
    pub fn for_amount(amount: &BigDecimal) -> Self {
        if *amount < BigDecimal::zero() {
            TransactionType::Debit
        } else {
            TransactionType::Credit
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Debit => "DEBIT",
            TransactionType::Int => "INT",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREDIT" => Ok(TransactionType::Credit),
            "DEBIT" => Ok(TransactionType::Debit),
            "INT" => Ok(TransactionType::Int),
            _ => Err(LedgerError::Validation(format!("Unknown transaction type '{}'", s))),
        }
    }
}

/// Cadence at which interest is computed for an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestAccrual {
    Monthly,
    Annually,
}

impl InterestAccrual {
    /// Number of calendar months in one accrual period
    pub fn months(&self) -> u32 {
        match self {
            InterestAccrual::Monthly => 1,
            InterestAccrual::Annually => 12,
        }
    }
}

impl FromStr for InterestAccrual {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(InterestAccrual::Monthly),
            "annually" => Ok(InterestAccrual::Annually),
            _ => Err(LedgerError::Validation(format!("Unknown interest accrual '{}'", s))),
        }
    }
}

/// Balance condition that must hold for interest to be posted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestCondition {
    #[default]
    Always,
    /// Only charge interest while the account is overdrawn
    NegativeBalance,
    /// Only pay interest while the account holds money
    PositiveBalance,
}

impl InterestCondition {
    pub fn is_satisfied_by(&self, balance: &BigDecimal) -> bool {
        match self {
            InterestCondition::Always => true,
            InterestCondition::NegativeBalance => *balance < BigDecimal::zero(),
            InterestCondition::PositiveBalance => *balance > BigDecimal::zero(),
        }
    }
}

impl FromStr for InterestCondition {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "always" => Ok(InterestCondition::Always),
            "negative_balance" => Ok(InterestCondition::NegativeBalance),
            "positive_balance" => Ok(InterestCondition::PositiveBalance),
            _ => Err(LedgerError::Validation(format!("Unknown interest condition '{}'", s))),
        }
    }
}

/// Group of users sharing a set of accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workgroup {
    pub id: String,
    pub name: String,
}

impl Workgroup {
    pub fn new(id: String, name: String) -> Self {
        Self { id, name }
    }
}

/// Bank or other institution holding accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: String,
    pub name: String,
}

impl Institution {
    pub fn new(id: String, name: String) -> Self {
        Self { id, name }
    }
}

/// A user and the workgroups they can see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Workgroup created for the user on sign-up
    pub default_workgroup_id: String,
    /// Additional workgroups the user is a member of
    pub workgroup_ids: Vec<String>,
}

impl User {
    pub fn new(id: String, name: String, default_workgroup_id: String) -> Self {
        Self {
            id,
            name,
            default_workgroup_id,
            workgroup_ids: Vec::new(),
        }
    }

    /// All workgroups visible to the user, default first, without duplicates
    pub fn visible_workgroups(&self) -> Vec<&str> {
        let mut ids = vec![self.default_workgroup_id.as_str()];
        for id in &self.workgroup_ids {
            if !ids.contains(&id.as_str()) {
                ids.push(id.as_str());
            }
        }
        ids
    }
}

/// Account input as it arrives from a form or an API payload
///
/// Every mandatory field is optional here so that a missing value can be
/// reported as a validation error instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountParams {
    pub id: Option<String>,
    pub workgroup_id: Option<String>,
    pub institution_id: Option<String>,
    pub name: Option<String>,
    pub opening_date: Option<NaiveDate>,
    pub opening_balance: Option<BigDecimal>,
    pub interest_rate: Option<BigDecimal>,
    pub interest_accrual: Option<InterestAccrual>,
    #[serde(default)]
    pub interest_condition: InterestCondition,
    #[serde(default)]
    pub switch_target_and_description: bool,
}

impl AccountParams {
    /// Params with every mandatory field set
    pub fn new(
        workgroup_id: impl Into<String>,
        institution_id: impl Into<String>,
        name: impl Into<String>,
        opening_date: NaiveDate,
        interest_accrual: InterestAccrual,
    ) -> Self {
        Self {
            workgroup_id: Some(workgroup_id.into()),
            institution_id: Some(institution_id.into()),
            name: Some(name.into()),
            opening_date: Some(opening_date),
            interest_accrual: Some(interest_accrual),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn opening_balance(mut self, balance: BigDecimal) -> Self {
        self.opening_balance = Some(balance);
        self
    }

    pub fn interest_rate(mut self, rate: BigDecimal) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn interest_condition(mut self, condition: InterestCondition) -> Self {
        self.interest_condition = condition;
        self
    }

    pub fn switch_target_and_description(mut self, switch: bool) -> Self {
        self.switch_target_and_description = switch;
        self
    }

    /// Turn the params into an account, reporting the first missing mandatory field
    pub fn into_account(self) -> LedgerResult<Account> {
        fn required<T>(value: Option<T>, field: &str) -> LedgerResult<T> {
            value.ok_or_else(|| LedgerError::Validation(format!("{} is required", field)))
        }

        let workgroup_id = required(non_blank(self.workgroup_id), "Workgroup")?;
        let institution_id = required(non_blank(self.institution_id), "Institution")?;
        let name = required(non_blank(self.name), "Name")?;
        let opening_date = required(self.opening_date, "Opening date")?;
        let interest_accrual = required(self.interest_accrual, "Interest accrual")?;

        let id = self
            .id
            .and_then(|id| non_blank(Some(id)))
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut account = Account::new(
            id,
            workgroup_id,
            institution_id,
            name,
            opening_date,
            interest_accrual,
        );
        account.opening_balance = self.opening_balance.unwrap_or_else(BigDecimal::zero);
        account.interest_rate = self.interest_rate.unwrap_or_else(BigDecimal::zero);
        account.interest_condition = self.interest_condition;
        account.switch_target_and_description = self.switch_target_and_description;
        Ok(account)
    }
}

/// A bank, card or cash account tracked by the register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    pub id: String,
    /// Workgroup owning the account
    pub workgroup_id: String,
    /// Institution holding the account
    pub institution_id: String,
    /// Human-readable account name
    pub name: String,
    /// Date of the opening balance
    pub opening_date: NaiveDate,
    /// Balance when the account was opened
    pub opening_balance: BigDecimal,
    /// Interest percentage per accrual period, four decimal places
    pub interest_rate: BigDecimal,
    /// How often interest is accrued
    pub interest_accrual: InterestAccrual,
    /// When interest applies
    pub interest_condition: InterestCondition,
    /// Imported statements carry the payee in the description column
    pub switch_target_and_description: bool,
    /// When the account was created
    pub created_at: NaiveDateTime,
    /// When the account was last updated
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Create a new account with zero opening balance and no interest
    pub fn new(
        id: String,
        workgroup_id: String,
        institution_id: String,
        name: String,
        opening_date: NaiveDate,
        interest_accrual: InterestAccrual,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            workgroup_id,
            institution_id,
            name,
            opening_date,
            opening_balance: BigDecimal::zero(),
            interest_rate: BigDecimal::zero(),
            interest_accrual,
            interest_condition: InterestCondition::Always,
            switch_target_and_description: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display name qualified by the institution name
    pub fn long_name(&self, institution: &Institution) -> String {
        format!("{}:{}", institution.name, self.name)
    }

    /// The transaction recording the opening balance
    pub fn opening_transaction(&self, id: String, description: &str) -> Transaction {
        let mut transaction = Transaction::new(
            id,
            self.id.clone(),
            self.opening_date,
            self.opening_balance.clone(),
            TransactionType::for_amount(&self.opening_balance),
        );
        transaction.description = Some(description.to_string());
        transaction
    }
}

/// A single entry in an account register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier for the transaction
    pub id: String,
    /// Account owning the transaction
    pub account_id: String,
    /// Date when the transaction occurred
    pub date: NaiveDate,
    /// Signed amount: credits positive, debits negative
    pub amount: BigDecimal,
    pub transaction_type: TransactionType,
    /// Identifier assigned by the bank (FITID on OFX statements)
    pub external_id: Option<String>,
    pub check_num: Option<String>,
    /// Payee or payer
    pub target: Option<String>,
    pub description: Option<String>,
    /// Matched against a bank statement
    pub registered: bool,
    /// When the transaction was created
    pub created_at: NaiveDateTime,
    /// When the transaction was last updated
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    /// Create a new unregistered transaction
    pub fn new(
        id: String,
        account_id: String,
        date: NaiveDate,
        amount: BigDecimal,
        transaction_type: TransactionType,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            account_id,
            date,
            amount,
            transaction_type,
            external_id: None,
            check_num: None,
            target: None,
            description: None,
            registered: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.id.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction(
                "Transaction ID cannot be empty".to_string(),
            ));
        }

        if self.account_id.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction(
                "Transaction must belong to an account".to_string(),
            ));
        }

        match self.transaction_type {
            TransactionType::Credit if self.amount < BigDecimal::zero() => {
                Err(LedgerError::InvalidTransaction(format!(
                    "CREDIT amount cannot be negative: {}",
                    self.amount
                )))
            }
            TransactionType::Debit if self.amount > BigDecimal::zero() => {
                Err(LedgerError::InvalidTransaction(format!(
                    "DEBIT amount cannot be positive: {}",
                    self.amount
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Point up to which a balance is summed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceAsOf {
    /// Every transaction in the register
    #[default]
    All,
    /// Transactions dated strictly before the date
    Date(NaiveDate),
    /// Register positions `0..=n`, position 0 being the opening transaction
    Position(usize),
}

impl From<NaiveDate> for BalanceAsOf {
    fn from(date: NaiveDate) -> Self {
        BalanceAsOf::Date(date)
    }
}

impl From<usize> for BalanceAsOf {
    fn from(position: usize) -> Self {
        BalanceAsOf::Position(position)
    }
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Workgroup not found: {0}")]
    WorkgroupNotFound(String),
    #[error("Institution not found: {0}")]
    InstitutionNotFound(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Treat `None`, empty and whitespace-only strings alike
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn valid_params() -> AccountParams {
        AccountParams::new(
            "wg1",
            "bank1",
            "Checking",
            date(2010, 1, 1),
            InterestAccrual::Monthly,
        )
    }

    #[test]
    fn test_params_into_account() {
        let account = valid_params()
            .id("acc1")
            .opening_balance(BigDecimal::from_str("12.22").unwrap())
            .into_account()
            .unwrap();

        assert_eq!(account.id, "acc1");
        assert_eq!(account.workgroup_id, "wg1");
        assert_eq!(account.opening_balance, BigDecimal::from_str("12.22").unwrap());
        assert_eq!(account.interest_condition, InterestCondition::Always);
    }

    #[test]
    fn test_missing_mandatory_fields_are_rejected() {
        let cases = [
            AccountParams {
                workgroup_id: None,
                ..valid_params()
            },
            AccountParams {
                institution_id: None,
                ..valid_params()
            },
            AccountParams {
                name: Some("  ".to_string()),
                ..valid_params()
            },
            AccountParams {
                opening_date: None,
                ..valid_params()
            },
            AccountParams {
                interest_accrual: None,
                ..valid_params()
            },
        ];

        for params in cases {
            assert!(matches!(
                params.into_account(),
                Err(LedgerError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_generated_id_when_missing() {
        let account = valid_params().into_account().unwrap();
        assert!(uuid::Uuid::parse_str(&account.id).is_ok());
    }

    #[test]
    fn test_opening_transaction_type_follows_sign() {
        let mut account = valid_params().into_account().unwrap();

        account.opening_balance = BigDecimal::from_str("-12.22").unwrap();
        let txn = account.opening_transaction("t1".to_string(), "Opening balance");
        assert_eq!(txn.transaction_type, TransactionType::Debit);
        assert_eq!(txn.date, date(2010, 1, 1));

        account.opening_balance = BigDecimal::zero();
        let txn = account.opening_transaction("t2".to_string(), "Opening balance");
        assert_eq!(txn.transaction_type, TransactionType::Credit);
    }

    #[test]
    fn test_interest_condition() {
        let negative = BigDecimal::from(-1);
        let positive = BigDecimal::from(1);

        assert!(InterestCondition::Always.is_satisfied_by(&BigDecimal::zero()));
        assert!(InterestCondition::NegativeBalance.is_satisfied_by(&negative));
        assert!(!InterestCondition::NegativeBalance.is_satisfied_by(&positive));
        assert!(InterestCondition::PositiveBalance.is_satisfied_by(&positive));
        assert!(!InterestCondition::PositiveBalance.is_satisfied_by(&BigDecimal::zero()));
    }

    #[test]
    fn test_enum_string_forms() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Int).unwrap(),
            "\"INT\""
        );
        assert_eq!(
            serde_json::to_string(&InterestCondition::NegativeBalance).unwrap(),
            "\"negative_balance\""
        );
        assert_eq!(
            "annually".parse::<InterestAccrual>().unwrap(),
            InterestAccrual::Annually
        );
        assert_eq!("credit".parse::<TransactionType>().unwrap(), TransactionType::Credit);
        assert!("weekly".parse::<InterestAccrual>().is_err());
    }

    #[test]
    fn test_parse_error_echoes_input() {
        let err = "Transfer".parse::<TransactionType>().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Unknown transaction type 'Transfer'");

        let err = "Weekly".parse::<InterestAccrual>().unwrap_err();
        assert!(err.to_string().contains("'Weekly'"));

        let err = "Sometimes".parse::<InterestCondition>().unwrap_err();
        assert!(err.to_string().contains("'Sometimes'"));
    }

    #[test]
    fn test_user_visible_workgroups() {
        let mut user = User::new("u1".to_string(), "Sam".to_string(), "wg1".to_string());
        user.workgroup_ids = vec!["wg2".to_string(), "wg1".to_string()];
        assert_eq!(user.visible_workgroups(), vec!["wg1", "wg2"]);
    }
}
