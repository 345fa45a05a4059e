//! Household ledger walkthrough: accounts, interest and a statement import

use personal_ledger::utils::MemoryStorage;
use personal_ledger::{
    logging, AccountParams, BalanceAsOf, ImportOutcome, ImportRecord, Institution,
    InterestAccrual, InterestCondition, Ledger, TransactionBuilder, Workgroup,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut ledger = Ledger::new(MemoryStorage::new());

    ledger
        .create_workgroup(Workgroup::new("home".to_string(), "Home".to_string()))
        .await?;
    ledger
        .create_institution(Institution::new(
            "bank".to_string(),
            "First Bank".to_string(),
        ))
        .await?;

    let opened = NaiveDate::from_ymd_opt(2010, 1, 1).ok_or("invalid date")?;

    // 1. Accounts
    let checking = ledger
        .create_account(
            AccountParams::new("home", "bank", "Checking", opened, InterestAccrual::Monthly)
                .opening_balance(BigDecimal::from_str("1250.00")?)
                .switch_target_and_description(true),
        )
        .await?;
    let card = ledger
        .create_account(
            AccountParams::new("home", "bank", "Credit card", opened, InterestAccrual::Monthly)
                .opening_balance(BigDecimal::from_str("-300.00")?)
                .interest_rate(BigDecimal::from_str("1.5")?)
                .interest_condition(InterestCondition::NegativeBalance),
        )
        .await?;

    for account in ledger.list_accounts().await? {
        println!(
            "{:<24} {:>10}",
            ledger.long_name(&account).await?,
            ledger.current_balance(&account.id).await?
        );
    }

    // 2. Write a check
    let rent = TransactionBuilder::new(
        checking.id.clone(),
        NaiveDate::from_ymd_opt(2010, 1, 3).ok_or("invalid date")?,
        BigDecimal::from_str("-800.00")?,
    )
    .check_num("101".to_string())
    .target("Landlord".to_string())
    .build()?;
    ledger.record_transaction(rent).await?;

    // 3. Import the bank statement
    let statement = vec![
        ImportRecord::new(
            NaiveDate::from_ymd_opt(2010, 1, 6).ok_or("invalid date")?,
            BigDecimal::from_str("-800.00")?,
        )
        .with_external_id("FIT-0001")
        .with_check_num("101"),
        ImportRecord::new(
            NaiveDate::from_ymd_opt(2010, 1, 9).ok_or("invalid date")?,
            BigDecimal::from_str("-54.20")?,
        )
        .with_external_id("FIT-0002")
        .with_target("POS PURCHASE")
        .with_description("Corner Grocer"),
    ];
    let summary = ledger
        .process_import_transactions(&checking.id, statement)
        .await?;
    for outcome in &summary.outcomes {
        match outcome {
            ImportOutcome::Duplicate { existing_id } => {
                println!("  already imported {}", existing_id)
            }
            ImportOutcome::Registered { transaction_id } => {
                println!("  cleared {}", transaction_id)
            }
            ImportOutcome::Created { transaction, reason } => println!(
                "  new {} {:?} ({:?})",
                transaction.amount, transaction.target, reason
            ),
        }
    }

    // 4. Interest on the card
    let today = NaiveDate::from_ymd_opt(2010, 4, 15).ok_or("invalid date")?;
    let posted = ledger.post_interest_due(&card.id, today).await?;
    for txn in &posted {
        println!("  interest {} on {}", txn.amount, txn.date);
    }
    println!(
        "Card balance {} (next accrual {})",
        ledger.current_balance(&card.id).await?,
        ledger.next_interest_accrual(&card.id).await?
    );
    println!(
        "Checking balance before Jan 5: {}",
        ledger
            .balance(
                &checking.id,
                BalanceAsOf::Date(NaiveDate::from_ymd_opt(2010, 1, 5).ok_or("invalid date")?)
            )
            .await?
    );

    Ok(())
}
