//! Interest accrual date arithmetic and amounts

use bigdecimal::BigDecimal;
use chrono::{Months, NaiveDate};

use crate::types::*;

/// Stateless calculator for accrual schedules
///
/// Monthly accruals land on the same day of the following month, clamped to
/// the month length (March 31 is followed by April 30). Annual accruals land
/// on the same month and day of the following year (February 29 is followed
/// by February 28).
#[derive(Debug, Clone, Copy)]
pub struct AccrualCalculator {
    amount_scale: i64,
}

impl AccrualCalculator {
    pub fn new(amount_scale: i64) -> Self {
        Self { amount_scale }
    }

    /// The accrual date following `from`
    pub fn next_accrual(
        &self,
        from: NaiveDate,
        frequency: InterestAccrual,
    ) -> LedgerResult<NaiveDate> {
        from.checked_add_months(Months::new(frequency.months()))
            .ok_or_else(|| {
                LedgerError::Validation(format!(
                    "No accrual date after {} fits the calendar",
                    from
                ))
            })
    }

    /// Date of the most recent interest transaction in a register
    pub fn last_interest_accrual(&self, transactions: &[Transaction]) -> Option<NaiveDate> {
        transactions
            .iter()
            .filter(|txn| txn.transaction_type == TransactionType::Int)
            .map(|txn| txn.date)
            .max()
    }

    /// Next accrual for an account, counted from the last posted interest
    /// or, if none has been posted, from the opening date
    pub fn next_interest_accrual(
        &self,
        account: &Account,
        transactions: &[Transaction],
    ) -> LedgerResult<NaiveDate> {
        let from = self
            .last_interest_accrual(transactions)
            .unwrap_or(account.opening_date);
        self.next_accrual(from, account.interest_accrual)
    }

    /// Every accrual date after `last` up to and including `today`
    pub fn due_dates(
        &self,
        account: &Account,
        last: Option<NaiveDate>,
        today: NaiveDate,
    ) -> LedgerResult<Vec<NaiveDate>> {
        let mut dates = Vec::new();
        let mut cursor = last.unwrap_or(account.opening_date);

        loop {
            let next = self.next_accrual(cursor, account.interest_accrual)?;
            if next > today {
                break;
            }
            dates.push(next);
            cursor = next;
        }

        Ok(dates)
    }

    /// Interest for one period: `balance × rate / 100`, rounded to the amount scale
    pub fn interest_amount(&self, balance: &BigDecimal, rate: &BigDecimal) -> BigDecimal {
        let raw = balance * rate / BigDecimal::from(100);
        raw.round(self.amount_scale)
    }
}
