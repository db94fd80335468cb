//! # Ledger
//!
//! `ledger` owns the locally stored accounts, cards and transaction log. Every balance change
//! goes through [`Ledger::execute`], which validates it with the processor, persists the
//! updated accounts, prepends the transaction records and notifies subscribers.

use std::{collections::BTreeMap, fmt, sync::Arc};

use futures_util::stream::Stream;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, trace, warn};

use crate::{
    account::{Account, AccountKind},
    card::{Card, NewCard},
    clock::{Clock, SystemClock},
    constants::{ACCOUNTS_KEY, ACTIVE_CARD_KEY, CARDS_KEY, CARD_ACCOUNTS_KEY, TRANSACTIONS_KEY},
    processor::{self, Posting, ProcessError, TransactionRequest},
    storage::{load_json, save_json, KeyValueStore, StorageError},
    transaction::{next_transaction_id, TransactionKind, TransactionRecord},
    types::{AccountId, CardId, ValueError},
};

const EVENT_CAPACITY: usize = 64;
const OPENING_BALANCE: &str = "Opening balance";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Rejected(#[from] ProcessError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error("card not found: #{0}")]
    CardNotFound(CardId),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Account collection a mutation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Partition {
    #[default]
    Default,
    Card(CardId),
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Default => write!(f, "default"),
            Partition::Card(id) => write!(f, "card #{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    AccountsChanged {
        partition: Partition,
        accounts: Vec<Account>,
    },
    TransactionRecorded(TransactionRecord),
    CardAdded(Card),
    CardRemoved(CardId),
    PartitionSelected(Partition),
    Cleared,
}

/// Result of an accepted transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub accounts: Vec<Account>,
    /// New records, newest first
    pub records: Vec<TransactionRecord>,
}

/// Account whose stored balance does not match the sum of its records
#[derive(Debug, Clone, PartialEq)]
pub struct Discrepancy {
    pub account: AccountId,
    pub balance: Decimal,
    pub derived: Decimal,
}

pub struct Ledger {
    store: Arc<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    events: broadcast::Sender<LedgerEvent>,
}

impl Ledger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, SystemClock)
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: impl Clock + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            clock: Box::new(clock),
            events,
        }
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Events emitted from now on, as a stream ending once the ledger is dropped
    pub fn events(&self) -> impl Stream<Item = LedgerEvent> {
        let mut receiver = self.events.subscribe();
        async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => yield event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Ledger subscriber lagging, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    fn emit(&self, event: LedgerEvent) {
        if self.events.send(event).is_err() {
            trace!("No ledger subscriber");
        }
    }

    pub fn active_partition(&self) -> Result<Partition> {
        Ok(match load_json::<CardId>(self.store.as_ref(), ACTIVE_CARD_KEY)? {
            Some(id) => Partition::Card(id),
            None => Partition::Default,
        })
    }

    pub fn select_partition(&mut self, partition: Partition) -> Result<()> {
        match partition {
            Partition::Default => self.store.remove(ACTIVE_CARD_KEY)?,
            Partition::Card(id) => {
                if !self.cards()?.iter().any(|c| c.id == id) {
                    return Err(LedgerError::CardNotFound(id));
                }
                save_json(self.store.as_ref(), ACTIVE_CARD_KEY, &id)?;
            }
        }
        debug!(%partition, "Selected partition");
        self.emit(LedgerEvent::PartitionSelected(partition));
        Ok(())
    }

    fn card_accounts(&self) -> Result<BTreeMap<CardId, Vec<Account>>> {
        Ok(load_json(self.store.as_ref(), CARD_ACCOUNTS_KEY)?.unwrap_or_default())
    }

    pub fn accounts_in(&self, partition: Partition) -> Result<Vec<Account>> {
        match partition {
            Partition::Default => Ok(load_json(self.store.as_ref(), ACCOUNTS_KEY)?.unwrap_or_default()),
            Partition::Card(id) => Ok(self.card_accounts()?.remove(&id).unwrap_or_default()),
        }
    }

    /// Accounts of the active partition
    pub fn accounts(&self) -> Result<Vec<Account>> {
        self.accounts_in(self.active_partition()?)
    }

    /// Accounts of every partition
    pub fn all_accounts(&self) -> Result<Vec<Account>> {
        let mut accounts = self.accounts_in(Partition::Default)?;
        accounts.extend(self.card_accounts()?.into_values().flatten());
        Ok(accounts)
    }

    pub fn account(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.all_accounts()?.into_iter().find(|a| a.id == id))
    }

    fn store_accounts(&self, partition: Partition, accounts: &[Account]) -> Result<()> {
        match partition {
            Partition::Default => save_json(self.store.as_ref(), ACCOUNTS_KEY, accounts)?,
            Partition::Card(id) => {
                let mut side_table = self.card_accounts()?;
                side_table.insert(id, accounts.to_vec());
                save_json(self.store.as_ref(), CARD_ACCOUNTS_KEY, &side_table)?;
            }
        }
        Ok(())
    }

    fn save_accounts(&self, partition: Partition, accounts: &[Account]) -> Result<()> {
        self.store_accounts(partition, accounts)?;
        self.emit(LedgerEvent::AccountsChanged {
            partition,
            accounts: accounts.to_vec(),
        });
        Ok(())
    }

    // Ids of deleted accounts still appear in the log and are never reused.
    fn next_account_id(&self) -> Result<AccountId> {
        let live = self.all_accounts()?.into_iter().map(|a| a.id.get());
        let logged = self.history()?.into_iter().map(|r| r.account_id.get());
        let max = live.chain(logged).max().unwrap_or(0);
        Ok(AccountId::from(max + 1))
    }

    /// Open an account in the active partition
    ///
    /// A positive opening balance is recorded as a deposit so the log accounts for it.
    pub fn create_account(&mut self, kind: AccountKind, opening_balance: Decimal) -> Result<Account> {
        if opening_balance < Decimal::ZERO {
            return Err(ProcessError::InvalidAmount.into());
        }
        let partition = self.active_partition()?;
        let card_id = match partition {
            Partition::Card(id) => Some(id),
            Partition::Default => None,
        };
        let account = Account::new(self.next_account_id()?, kind, opening_balance, card_id);

        let previous = self.accounts_in(partition)?;
        let mut accounts = previous.clone();
        accounts.push(account.clone());

        let postings = if opening_balance > Decimal::ZERO {
            vec![Posting {
                account: account.id,
                counterparty: None,
                amount: opening_balance,
            }]
        } else {
            Vec::new()
        };
        self.commit(
            partition,
            &previous,
            &accounts,
            TransactionKind::Deposit,
            &postings,
            Some(OPENING_BALANCE),
        )?;

        info!(id = %account.id, kind = %account.kind, %partition, "Account created");
        Ok(account)
    }

    pub fn cards(&self) -> Result<Vec<Card>> {
        Ok(load_json(self.store.as_ref(), CARDS_KEY)?.unwrap_or_default())
    }

    /// Add a card along with an empty checking and savings account
    pub fn add_card(&mut self, new_card: NewCard) -> Result<Card> {
        let mut cards = self.cards()?;
        let id = CardId::from(cards.iter().map(|c| c.id.get()).max().unwrap_or(0) + 1);
        let card = new_card.into_card(id);
        cards.push(card.clone());
        save_json(self.store.as_ref(), CARDS_KEY, &cards)?;

        let first = self.next_account_id()?.get();
        let accounts = vec![
            Account::new(AccountId::from(first), AccountKind::Checking, Decimal::ZERO, Some(id)),
            Account::new(AccountId::from(first + 1), AccountKind::Savings, Decimal::ZERO, Some(id)),
        ];
        self.save_accounts(Partition::Card(id), &accounts)?;

        info!(id = %card.id, number = %card.number, "Card added");
        self.emit(LedgerEvent::CardAdded(card.clone()));
        Ok(card)
    }

    /// Delete a card and its accounts; records that mention them stay in the log
    pub fn delete_card(&mut self, id: CardId) -> Result<()> {
        let mut cards = self.cards()?;
        let before = cards.len();
        cards.retain(|c| c.id != id);
        if cards.len() == before {
            return Err(LedgerError::CardNotFound(id));
        }
        save_json(self.store.as_ref(), CARDS_KEY, &cards)?;

        let mut side_table = self.card_accounts()?;
        side_table.remove(&id);
        save_json(self.store.as_ref(), CARD_ACCOUNTS_KEY, &side_table)?;

        if self.active_partition()? == Partition::Card(id) {
            self.select_partition(Partition::Default)?;
        }

        info!(%id, "Card deleted");
        self.emit(LedgerEvent::CardRemoved(id));
        Ok(())
    }

    pub fn deposit(&mut self, account: AccountId, amount: Decimal, description: Option<&str>) -> Result<Receipt> {
        self.execute(&TransactionRequest::deposit(account, amount), description)
    }

    pub fn withdraw(&mut self, account: AccountId, amount: Decimal, description: Option<&str>) -> Result<Receipt> {
        self.execute(&TransactionRequest::withdrawal(account, amount), description)
    }

    pub fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        reason: Option<&str>,
    ) -> Result<Receipt> {
        self.execute(&TransactionRequest::transfer(from, to, amount), reason)
    }

    /// Validate and apply `request` to the active partition
    pub fn execute(&mut self, request: &TransactionRequest, description: Option<&str>) -> Result<Receipt> {
        let partition = self.active_partition()?;
        let accounts = self.accounts_in(partition)?;

        let processed = processor::process(request, &accounts).map_err(|e| {
            warn!(kind = %request.kind, source = %request.source, "Transaction rejected: {}", e);
            e
        })?;

        let records = self.commit(
            partition,
            &accounts,
            &processed.accounts,
            request.kind,
            &processed.postings,
            description,
        )?;

        info!(
            kind = %request.kind,
            amount = %request.amount,
            source = %request.source,
            %partition,
            "Transaction recorded"
        );
        Ok(Receipt {
            accounts: processed.accounts,
            records,
        })
    }

    /// Persist `accounts` together with the records of `postings`
    ///
    /// The log is read and the records built before anything is written. When the log cannot
    /// be saved, `previous` is written back so balances never change without a record.
    fn commit(
        &self,
        partition: Partition,
        previous: &[Account],
        accounts: &[Account],
        kind: TransactionKind,
        postings: &[Posting],
        description: Option<&str>,
    ) -> Result<Vec<TransactionRecord>> {
        let mut log = self.history()?;
        let mut last = log.iter().map(|r| r.id).max();
        let date = self.clock.today();

        let mut records = Vec::with_capacity(postings.len());
        for posting in postings {
            let id = next_transaction_id(self.clock.now_millis(), last);
            last = Some(id);
            records.push(TransactionRecord {
                id,
                kind,
                description: describe(kind, posting, description),
                amount: posting.amount,
                date,
                account_id: posting.account,
                counterparty: posting.counterparty,
            });
        }
        for record in &records {
            log.insert(0, record.clone());
        }

        self.store_accounts(partition, accounts)?;
        if !records.is_empty() {
            if let Err(e) = save_json(self.store.as_ref(), TRANSACTIONS_KEY, &log) {
                warn!(%partition, "Transaction log not saved, restoring balances: {}", e);
                self.store_accounts(partition, previous)?;
                return Err(e.into());
            }
        }

        self.emit(LedgerEvent::AccountsChanged {
            partition,
            accounts: accounts.to_vec(),
        });
        for record in &records {
            self.emit(LedgerEvent::TransactionRecorded(record.clone()));
        }
        records.reverse();
        Ok(records)
    }

    /// Transaction log, newest first
    pub fn history(&self) -> Result<Vec<TransactionRecord>> {
        Ok(load_json(self.store.as_ref(), TRANSACTIONS_KEY)?.unwrap_or_default())
    }

    pub fn history_for(&self, account: AccountId) -> Result<Vec<TransactionRecord>> {
        Ok(self
            .history()?
            .into_iter()
            .filter(|r| r.account_id == account)
            .collect())
    }

    /// Balances recomputed from the transaction log
    pub fn derived_balances(&self) -> Result<BTreeMap<AccountId, Decimal>> {
        let mut balances = BTreeMap::new();
        for record in self.history()? {
            let balance = balances.entry(record.account_id).or_insert(Decimal::ZERO);
            *balance = balance
                .checked_add(record.amount)
                .ok_or(ProcessError::Overflow)?;
        }
        Ok(balances)
    }

    /// Compare every stored balance with the one derived from the log
    pub fn verify(&self) -> Result<Vec<Discrepancy>> {
        let derived = self.derived_balances()?;
        let discrepancies: Vec<Discrepancy> = self
            .all_accounts()?
            .into_iter()
            .filter_map(|account| {
                let sum = derived.get(&account.id).copied().unwrap_or(Decimal::ZERO);
                (sum != account.balance).then_some(Discrepancy {
                    account: account.id,
                    balance: account.balance,
                    derived: sum,
                })
            })
            .collect();
        if !discrepancies.is_empty() {
            warn!(count = discrepancies.len(), "Ledger does not reconcile");
        }
        Ok(discrepancies)
    }

    /// Wipe every key of the store, sessions included
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        info!("Ledger cleared");
        self.emit(LedgerEvent::Cleared);
        Ok(())
    }
}

fn describe(kind: TransactionKind, posting: &Posting, custom: Option<&str>) -> String {
    let custom = custom.map(str::trim).filter(|s| !s.is_empty());
    match (kind, posting.counterparty, custom) {
        (TransactionKind::Transfer, Some(other), custom) => {
            let base = if posting.amount.is_sign_negative() {
                format!("Transfer to #{}", other)
            } else {
                format!("Transfer from #{}", other)
            };
            match custom {
                Some(reason) => format!("{} - {}", base, reason),
                None => base,
            }
        }
        (_, _, Some(custom)) => custom.to_string(),
        (TransactionKind::Deposit, _, None) => "Deposit".to_string(),
        (TransactionKind::Withdrawal, _, None) => "Withdrawal".to_string(),
        (TransactionKind::Transfer, None, None) => "Transfer".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{card::CardTemplate, clock::FixedClock, storage::MemoryStore};
    use chrono::NaiveDate;
    use futures_util::{pin_mut, StreamExt};
    use rust_decimal_macros::dec;

    fn ledger() -> Ledger {
        Ledger::with_clock(
            Arc::new(MemoryStore::new()),
            FixedClock {
                millis: 1_700_000_000_000,
                date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            },
        )
    }

    fn new_card() -> NewCard {
        NewCard::new(CardTemplate::Gold, "4000 1234 5678 9010", "12/28").unwrap()
    }

    #[test]
    fn create_account_records_opening_balance() {
        let mut ledger = ledger();
        let account = ledger.create_account(AccountKind::Checking, dec!(100)).unwrap();
        assert_eq!(account.id.get(), 1);
        assert_eq!(account.number, "****0001");

        let history = ledger.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].description, "Opening balance");
        assert_eq!(history[0].amount, dec!(100));

        let empty = ledger.create_account(AccountKind::Savings, dec!(0)).unwrap();
        assert_eq!(empty.id.get(), 2);
        assert_eq!(ledger.history().unwrap().len(), 1);
        assert!(ledger.verify().unwrap().is_empty());
    }

    #[test]
    fn negative_opening_balance_rejected() {
        let mut ledger = ledger();
        let err = ledger.create_account(AccountKind::Checking, dec!(-1)).unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(ProcessError::InvalidAmount)));
        assert!(ledger.accounts().unwrap().is_empty());
    }

    #[test]
    fn transfer_records_both_legs_newest_first() {
        let mut ledger = ledger();
        let from = ledger.create_account(AccountKind::Checking, dec!(100)).unwrap();
        let to = ledger.create_account(AccountKind::Savings, dec!(20)).unwrap();

        let receipt = ledger.transfer(from.id, to.id, dec!(30), Some("rent")).unwrap();
        assert_eq!(receipt.records.len(), 2);
        assert_eq!(receipt.records[0].account_id, to.id);
        assert_eq!(receipt.records[0].description, "Transfer from #1 - rent");
        assert_eq!(receipt.records[1].description, "Transfer to #2 - rent");
        assert!(receipt.records[0].id > receipt.records[1].id);

        let history = ledger.history().unwrap();
        assert_eq!(history[0], receipt.records[0]);
        assert_eq!(history[1], receipt.records[1]);
        assert!(ledger.verify().unwrap().is_empty());

        let total: Decimal = history.iter().map(|r| r.amount).sum();
        assert_eq!(total, dec!(120));
    }

    #[test]
    fn rejected_transaction_leaves_store_untouched() {
        let mut ledger = ledger();
        let account = ledger.create_account(AccountKind::Checking, dec!(100)).unwrap();
        let err = ledger.withdraw(account.id, dec!(150), None).unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(ProcessError::InsufficientFunds)));
        assert_eq!(ledger.accounts().unwrap()[0].balance, dec!(100));
        assert_eq!(ledger.history().unwrap().len(), 1);
    }

    #[test]
    fn card_partition_is_isolated() {
        let mut ledger = ledger();
        let default_account = ledger.create_account(AccountKind::Checking, dec!(10)).unwrap();
        let card = ledger.add_card(new_card()).unwrap();
        assert_eq!(card.id.get(), 1);

        let card_accounts = ledger.accounts_in(Partition::Card(card.id)).unwrap();
        assert_eq!(card_accounts.len(), 2);
        assert_eq!(card_accounts[0].id.get(), 2);
        assert_eq!(card_accounts[1].kind, AccountKind::Savings);
        assert!(card_accounts.iter().all(|a| a.card_id == Some(card.id)));

        ledger.select_partition(Partition::Card(card.id)).unwrap();
        ledger.deposit(card_accounts[0].id, dec!(40), None).unwrap();
        let err = ledger.deposit(default_account.id, dec!(1), None).unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(ProcessError::AccountNotFound(_))));

        assert_eq!(ledger.accounts().unwrap()[0].balance, dec!(40));
        assert_eq!(ledger.accounts_in(Partition::Default).unwrap()[0].balance, dec!(10));
        assert_eq!(ledger.all_accounts().unwrap().len(), 3);
    }

    #[test]
    fn deleting_active_card_resets_partition() {
        let mut ledger = ledger();
        let card = ledger.add_card(new_card()).unwrap();
        ledger.select_partition(Partition::Card(card.id)).unwrap();

        ledger.delete_card(card.id).unwrap();
        assert_eq!(ledger.active_partition().unwrap(), Partition::Default);
        assert!(ledger.cards().unwrap().is_empty());
        assert!(ledger.all_accounts().unwrap().is_empty());
        assert!(matches!(
            ledger.delete_card(card.id),
            Err(LedgerError::CardNotFound(_))
        ));
        assert!(matches!(
            ledger.select_partition(Partition::Card(card.id)),
            Err(LedgerError::CardNotFound(_))
        ));
    }

    #[test]
    fn deleted_account_ids_are_not_reused() {
        let mut ledger = ledger();
        let card = ledger.add_card(new_card()).unwrap();
        ledger.select_partition(Partition::Card(card.id)).unwrap();
        let accounts = ledger.accounts().unwrap();
        ledger.deposit(accounts[1].id, dec!(12), None).unwrap();
        ledger.delete_card(card.id).unwrap();

        let account = ledger.create_account(AccountKind::Checking, dec!(0)).unwrap();
        assert_eq!(account.id.get(), 3);
        assert!(ledger.verify().unwrap().is_empty());
    }

    #[test]
    fn unreadable_log_leaves_balances_untouched() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut ledger = Ledger::new(store.clone());
        let account = ledger.create_account(AccountKind::Checking, dec!(100)).unwrap();

        store.set(TRANSACTIONS_KEY, "not json").unwrap();
        let err = ledger.deposit(account.id, dec!(50), None).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(StorageError::Malformed { .. })));
        assert_eq!(ledger.accounts().unwrap()[0].balance, dec!(100));

        assert!(ledger.create_account(AccountKind::Savings, dec!(10)).is_err());
        assert_eq!(ledger.accounts().unwrap().len(), 1);
    }

    #[test]
    fn deposit_beyond_decimal_range_rejected() {
        let mut ledger = ledger();
        let account = ledger.create_account(AccountKind::Checking, Decimal::MAX).unwrap();
        let err = ledger.deposit(account.id, dec!(1), None).unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(ProcessError::Overflow)));
        assert_eq!(ledger.accounts().unwrap()[0].balance, Decimal::MAX);
        assert_eq!(ledger.history().unwrap().len(), 1);
        assert!(ledger.verify().unwrap().is_empty());
    }

    #[test]
    fn verify_reports_tampered_balance() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut ledger = Ledger::new(store.clone());
        let account = ledger.create_account(AccountKind::Checking, dec!(100)).unwrap();

        let mut accounts = ledger.accounts().unwrap();
        accounts[0].balance = dec!(999);
        save_json(store.as_ref(), ACCOUNTS_KEY, &accounts).unwrap();

        let discrepancies = ledger.verify().unwrap();
        assert_eq!(
            discrepancies,
            vec![Discrepancy {
                account: account.id,
                balance: dec!(999),
                derived: dec!(100),
            }]
        );
    }

    #[tokio::test]
    async fn events_stream_ends_when_ledger_dropped() {
        let mut ledger = ledger();
        let events = ledger.events();
        let account = ledger.create_account(AccountKind::Checking, dec!(5)).unwrap();
        ledger.clear().unwrap();
        drop(ledger);

        pin_mut!(events);
        let mut got = Vec::new();
        while let Some(event) = events.next().await {
            got.push(event);
        }
        assert_eq!(got.len(), 3);
        assert!(matches!(&got[0], LedgerEvent::AccountsChanged { accounts, .. } if accounts[0] == account));
        assert!(matches!(&got[1], LedgerEvent::TransactionRecorded(r) if r.amount == dec!(5)));
        assert_eq!(got[2], LedgerEvent::Cleared);
    }
}
