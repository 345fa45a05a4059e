//! # Personal Ledger
//!
//! Bookkeeping core for a personal finance application: account registers,
//! interest accrual, and bank statement import with reconciliation.
//!
//! ## Features
//!
//! - **Account registers**: signed fixed-point amounts, opening balance recorded at creation
//! - **Balances**: total, before a date, or up to a register position
//! - **Interest accrual**: monthly or annual schedules with month-length clamping
//! - **Statement import**: de-duplication by bank id and clearing of open checks
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use personal_ledger::utils::MemoryStorage;
//! use personal_ledger::{AccountParams, InterestAccrual, Institution, Ledger, Workgroup};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # async fn run() -> personal_ledger::LedgerResult<()> {
//! let mut ledger = Ledger::new(MemoryStorage::new());
//! ledger.create_workgroup(Workgroup::new("home".into(), "Home".into())).await?;
//! ledger.create_institution(Institution::new("bank".into(), "Bank".into())).await?;
//!
//! let opened = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
//! let params = AccountParams::new("home", "bank", "Checking", opened, InterestAccrual::Monthly)
//!     .opening_balance(BigDecimal::from(250));
//! let account = ledger.create_account(params).await?;
//! assert_eq!(ledger.current_balance(&account.id).await?, BigDecimal::from(250));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod interest;
pub mod ledger;
pub mod logging;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use interest::*;
pub use ledger::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
