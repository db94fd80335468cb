use std::sync::Arc;

use chrono::NaiveDate;
use demobank_api::{
    account::{total_balance, AccountKind},
    clock::FixedClock,
    ledger::{Ledger, LedgerError},
    processor::ProcessError,
    storage::{FileStore, KeyValueStore},
    transaction::TransactionKind,
};
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn clock() -> FixedClock {
    FixedClock {
        millis: 1_717_000_000_000,
        date: NaiveDate::from_ymd_opt(2024, 5, 29).unwrap(),
    }
}

fn file_ledger(dir: &std::path::Path) -> Ledger {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir));
    Ledger::with_clock(store, clock())
}

#[test]
fn deposit_scenario() {
    let dir = tempdir().unwrap();
    let mut ledger = file_ledger(dir.path());
    let account = ledger.create_account(AccountKind::Checking, dec!(100)).unwrap();

    let receipt = ledger.deposit(account.id, dec!(50), None).unwrap();
    assert_eq!(receipt.accounts[0].balance, dec!(150));
    assert_eq!(receipt.records.len(), 1);
    assert_eq!(receipt.records[0].kind, TransactionKind::Deposit);
    assert_eq!(receipt.records[0].amount, dec!(50));
    assert_eq!(receipt.records[0].description, "Deposit");
}

#[test]
fn overdraft_scenario() {
    let dir = tempdir().unwrap();
    let mut ledger = file_ledger(dir.path());
    let account = ledger.create_account(AccountKind::Checking, dec!(100)).unwrap();
    let records_before = ledger.history().unwrap().len();

    let err = ledger.withdraw(account.id, dec!(150), None).unwrap_err();
    assert!(matches!(err, LedgerError::Rejected(ProcessError::InsufficientFunds)));
    assert_eq!(ledger.account(account.id).unwrap().unwrap().balance, dec!(100));
    assert_eq!(ledger.history().unwrap().len(), records_before);
}

#[test]
fn transfer_scenario_survives_reopening() {
    let dir = tempdir().unwrap();
    let (from, to) = {
        let mut ledger = file_ledger(dir.path());
        let from = ledger.create_account(AccountKind::Checking, dec!(100)).unwrap();
        let to = ledger.create_account(AccountKind::Savings, dec!(20)).unwrap();
        ledger.transfer(from.id, to.id, dec!(30), None).unwrap();
        (from.id, to.id)
    };

    let ledger = file_ledger(dir.path());
    assert_eq!(ledger.account(from).unwrap().unwrap().balance, dec!(70));
    assert_eq!(ledger.account(to).unwrap().unwrap().balance, dec!(50));
    assert_eq!(total_balance(&ledger.accounts().unwrap()), dec!(120));

    let derived = ledger.derived_balances().unwrap();
    assert_eq!(derived[&from], dec!(70));
    assert_eq!(derived[&to], dec!(50));
    assert!(ledger.verify().unwrap().is_empty());
}

#[test]
fn invalid_amounts_touch_nothing() {
    let dir = tempdir().unwrap();
    let mut ledger = file_ledger(dir.path());
    let a = ledger.create_account(AccountKind::Checking, dec!(10)).unwrap();
    let b = ledger.create_account(AccountKind::Checking, dec!(10)).unwrap();

    for amount in [dec!(0), dec!(-5)] {
        assert!(matches!(
            ledger.deposit(a.id, amount, None),
            Err(LedgerError::Rejected(ProcessError::InvalidAmount))
        ));
        assert!(matches!(
            ledger.transfer(a.id, b.id, amount, None),
            Err(LedgerError::Rejected(ProcessError::InvalidAmount))
        ));
    }
    assert!(matches!(
        ledger.transfer(a.id, a.id, dec!(1), None),
        Err(LedgerError::Rejected(ProcessError::SameAccount))
    ));
    assert_eq!(ledger.history().unwrap().len(), 2);
    assert_eq!(total_balance(&ledger.accounts().unwrap()), dec!(20));
}

#[test]
fn transaction_ids_increase_under_frozen_clock() {
    let dir = tempdir().unwrap();
    let mut ledger = file_ledger(dir.path());
    let a = ledger.create_account(AccountKind::Checking, dec!(10)).unwrap();
    let b = ledger.create_account(AccountKind::Checking, dec!(10)).unwrap();
    ledger.transfer(a.id, b.id, dec!(5), None).unwrap();
    ledger.deposit(b.id, dec!(1), None).unwrap();

    let ids: Vec<i64> = ledger.history().unwrap().iter().map(|r| r.id.get()).collect();
    assert_eq!(ids.len(), 5);
    assert!(ids.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn clear_wipes_the_directory() {
    let dir = tempdir().unwrap();
    let mut ledger = file_ledger(dir.path());
    ledger.create_account(AccountKind::Checking, dec!(10)).unwrap();
    ledger.clear().unwrap();

    assert!(ledger.all_accounts().unwrap().is_empty());
    assert!(ledger.history().unwrap().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
