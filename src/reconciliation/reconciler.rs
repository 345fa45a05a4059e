//! Matching of imported statement records against the register

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ledger::TransactionManager;
use crate::reconciliation::ImportRecord;
use crate::traits::*;
use crate::types::*;

/// Why an import produced a new register entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateReason {
    /// A transaction with the same external id exists but for another amount
    ExternalIdAmountMismatch,
    /// Open checks with the same number exist but none for this amount
    CheckNumberAmountMismatch,
    /// Nothing in the register resembles the record
    NoMatch,
}

/// What to do with one record, decided from the matching candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportDecision {
    /// Already imported; leave the register alone
    Skip { existing_id: String },
    /// An open check was cleared by the bank
    Register { existing_id: String },
    Create(CreateReason),
}

/// Result of importing one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImportOutcome {
    Duplicate { existing_id: String },
    Registered { transaction_id: String },
    Created {
        transaction: Transaction,
        reason: CreateReason,
    },
}

/// Result of importing a statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub account_id: String,
    /// One outcome per record, in input order
    pub outcomes: Vec<ImportOutcome>,
}

impl ImportSummary {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, ImportOutcome::Created { .. }))
    }

    pub fn registered(&self) -> usize {
        self.count(|o| matches!(o, ImportOutcome::Registered { .. }))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|o| matches!(o, ImportOutcome::Duplicate { .. }))
    }

    fn count(&self, predicate: impl Fn(&ImportOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}

/// Decide how a record relates to the register
///
/// `by_external_id` are the register entries sharing the record's external
/// id; `by_check_num` are the entries sharing its check number. The external
/// id wins over the check number, and only unregistered checks can be cleared.
pub fn decide(
    record: &ImportRecord,
    by_external_id: &[Transaction],
    by_check_num: &[Transaction],
) -> ImportDecision {
    if !by_external_id.is_empty() {
        // An earlier mismatch leaves several rows under one id
        return match by_external_id.iter().find(|txn| txn.amount == record.amount) {
            Some(existing) => ImportDecision::Skip {
                existing_id: existing.id.clone(),
            },
            None => ImportDecision::Create(CreateReason::ExternalIdAmountMismatch),
        };
    }

    let mut open_checks = by_check_num.iter().filter(|txn| !txn.registered).peekable();
    if open_checks.peek().is_none() {
        return ImportDecision::Create(CreateReason::NoMatch);
    }

    match open_checks.find(|txn| txn.amount == record.amount) {
        Some(existing) => ImportDecision::Register {
            existing_id: existing.id.clone(),
        },
        None => ImportDecision::Create(CreateReason::CheckNumberAmountMismatch),
    }
}

/// Applies import decisions for one account to the register
pub struct ImportReconciler<'a, S: LedgerStorage> {
    transactions: &'a mut TransactionManager<S>,
}

impl<'a, S: LedgerStorage> ImportReconciler<'a, S> {
    pub fn new(transactions: &'a mut TransactionManager<S>) -> Self {
        Self { transactions }
    }

    /// Import statement records into an account, in order
    ///
    /// Every record is checked before the register is touched, so a bad
    /// record rejects the whole statement. Entries created for earlier
    /// records take part in matching later ones.
    pub async fn process(
        &mut self,
        account: &Account,
        records: Vec<ImportRecord>,
    ) -> LedgerResult<ImportSummary> {
        let staged = self.stage(account, records)?;

        let mut summary = ImportSummary {
            account_id: account.id.clone(),
            outcomes: Vec::with_capacity(staged.len()),
        };

        for (record, candidate) in staged {
            let outcome = self.import_one(account, &record, candidate).await?;
            summary.outcomes.push(outcome);
        }

        info!(
            account_id = %account.id,
            created = summary.created(),
            registered = summary.registered(),
            duplicates = summary.duplicates(),
            "processed statement import"
        );

        Ok(summary)
    }

    /// Normalize each record and build the row it would create
    fn stage(
        &self,
        account: &Account,
        records: Vec<ImportRecord>,
    ) -> LedgerResult<Vec<(ImportRecord, Transaction)>> {
        records
            .into_iter()
            .enumerate()
            .map(|(line, mut record)| {
                if account.switch_target_and_description {
                    record.switch_target_and_description();
                }
                let candidate = record.to_transaction(&account.id);
                self.transactions
                    .check_transaction(&candidate)
                    .inspect_err(|e| {
                        warn!(
                            account_id = %account.id,
                            record = line + 1,
                            error = %e,
                            "rejected statement import"
                        );
                    })?;
                Ok((record, candidate))
            })
            .collect()
    }

    async fn import_one(
        &mut self,
        account: &Account,
        record: &ImportRecord,
        candidate: Transaction,
    ) -> LedgerResult<ImportOutcome> {
        let storage = &self.transactions.storage;

        let by_external_id = match record.external_id() {
            Some(external_id) => {
                storage
                    .find_transactions_by_external_id(&account.id, external_id)
                    .await?
            }
            None => Vec::new(),
        };

        let by_check_num = match record.check_num() {
            Some(check_num) => {
                storage
                    .find_transactions_by_check_num(&account.id, check_num)
                    .await?
            }
            None => Vec::new(),
        };

        let decision = decide(record, &by_external_id, &by_check_num);
        debug!(
            account_id = %account.id,
            external_id = ?record.external_id(),
            check_num = ?record.check_num(),
            ?decision,
            "import decision"
        );

        match decision {
            ImportDecision::Skip { existing_id } => Ok(ImportOutcome::Duplicate { existing_id }),
            ImportDecision::Register { existing_id } => {
                let transaction = self.transactions.set_registered(&existing_id, true).await?;
                Ok(ImportOutcome::Registered {
                    transaction_id: transaction.id,
                })
            }
            ImportDecision::Create(reason) => {
                let transaction = self.transactions.record_transaction(candidate).await?;
                Ok(ImportOutcome::Created {
                    transaction,
                    reason,
                })
            }
        }
    }
}
