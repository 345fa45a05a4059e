//! Reconciliation of bank statement imports against the register

pub mod reconciler;
pub mod record;

pub use reconciler::*;
pub use record::*;
