//! Ledger module containing account management and register processing

pub mod account;
pub mod core;
pub mod transaction;

pub use self::core::*;
pub use account::*;
pub use transaction::*;
