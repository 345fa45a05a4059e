//! Interest accrual

pub mod accrual;

pub use accrual::*;
