//! # Dashboard
//!
//! Read-only summary of accounts, cards and recent transactions. [`Dashboard::build`] works on
//! data fetched from the backend, [`Dashboard::from_ledger`] on the local ledger.

use std::{collections::HashSet, fmt};

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    account::{total_balance, Account},
    card::Card,
    client::models::{Page, RemoteTransaction, User},
    ledger::{self, Ledger},
    transaction::{TransactionKind, TransactionRecord},
    types::{AccountId, TransactionId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => write!(f, "in"),
            Direction::Outgoing => write!(f, "out"),
        }
    }
}

/// A transaction ready to be displayed
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLine {
    pub id: TransactionId,
    pub date: Option<NaiveDate>,
    pub direction: Direction,
    pub label: String,
    pub description: Option<String>,
    /// Positive when incoming, negative when outgoing
    pub amount: Decimal,
    pub formatted_amount: String,
}

impl HistoryLine {
    fn new(
        id: TransactionId,
        date: Option<NaiveDate>,
        direction: Direction,
        label: String,
        description: Option<String>,
        amount: Decimal,
    ) -> Self {
        let amount = match direction {
            Direction::Incoming => amount.abs(),
            Direction::Outgoing => -amount.abs(),
        };
        Self {
            id,
            date,
            direction,
            label,
            description,
            amount,
            formatted_amount: format_amount(amount),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub user: Option<String>,
    pub accounts: Vec<Account>,
    pub total_balance: Decimal,
    pub card_count: usize,
    pub recent: Vec<HistoryLine>,
}

impl Dashboard {
    /// Summarize data fetched from the backend for `user`.
    ///
    /// Transactions of `page` that involve neither the user nor one of `accounts` are skipped.
    pub fn build(user: &User, accounts: &[Account], cards: &[Card], page: &Page<RemoteTransaction>) -> Self {
        let owned: HashSet<AccountId> = accounts.iter().map(|a| a.id).collect();
        let recent = page
            .content
            .iter()
            .filter_map(|transaction| remote_line(user, &owned, transaction))
            .collect();

        Self {
            user: Some(user.display_name().to_string()),
            accounts: accounts.to_vec(),
            total_balance: total_balance(accounts),
            card_count: cards.len(),
            recent,
        }
    }

    /// Summarize the local ledger, across every partition, with at most `limit` recent lines
    pub fn from_ledger(ledger: &Ledger, user: Option<&str>, limit: usize) -> ledger::Result<Self> {
        let accounts = ledger.all_accounts()?;
        let recent = ledger.history()?.iter().take(limit).map(HistoryLine::from).collect();

        Ok(Self {
            user: user.map(str::to_string),
            total_balance: total_balance(&accounts),
            accounts,
            card_count: ledger.cards()?.len(),
            recent,
        })
    }
}

fn remote_line(user: &User, owned: &HashSet<AccountId>, transaction: &RemoteTransaction) -> Option<HistoryLine> {
    let is_mine = |account: Option<AccountId>, user_id: Option<u64>| {
        user_id == Some(user.id) || account.is_some_and(|id| owned.contains(&id))
    };
    let sent = is_mine(transaction.from_account_id, transaction.from_user_id);
    let received = is_mine(transaction.to_account_id, transaction.to_user_id);

    let (direction, label) = match transaction.kind {
        TransactionKind::Deposit => (Direction::Incoming, "Deposit".to_string()),
        TransactionKind::Withdrawal => (Direction::Outgoing, "Withdrawal".to_string()),
        TransactionKind::Transfer if sent => (
            Direction::Outgoing,
            format!("Transfer to #{}", account_ref(transaction.to_account_id)),
        ),
        TransactionKind::Transfer => (
            Direction::Incoming,
            format!("Transfer from #{}", account_ref(transaction.from_account_id)),
        ),
    };

    // A deposit or withdrawal naming no side at all was already scoped to the user by the backend.
    let unattributed = transaction.kind != TransactionKind::Transfer
        && transaction.from_account_id.is_none()
        && transaction.to_account_id.is_none()
        && transaction.from_user_id.is_none()
        && transaction.to_user_id.is_none();
    if !(sent || received || unattributed) {
        return None;
    }

    Some(HistoryLine::new(
        transaction.id,
        transaction.date,
        direction,
        label,
        transaction.description.clone(),
        transaction.amount,
    ))
}

fn account_ref(id: Option<AccountId>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string())
}

impl From<&TransactionRecord> for HistoryLine {
    fn from(record: &TransactionRecord) -> Self {
        let direction = if record.is_credit() {
            Direction::Incoming
        } else {
            Direction::Outgoing
        };
        let label = match (record.kind, record.counterparty) {
            (TransactionKind::Deposit, _) => "Deposit".to_string(),
            (TransactionKind::Withdrawal, _) => "Withdrawal".to_string(),
            (TransactionKind::Transfer, Some(other)) if direction == Direction::Outgoing => {
                format!("Transfer to #{}", other)
            }
            (TransactionKind::Transfer, Some(other)) => format!("Transfer from #{}", other),
            (TransactionKind::Transfer, None) => "Transfer".to_string(),
        };
        HistoryLine::new(
            record.id,
            Some(record.date),
            direction,
            label,
            Some(record.description.clone()),
            record.amount,
        )
    }
}

/// Format a signed amount as dollars, e.g. `+$1,234.50` or `-$30.00`
pub fn format_amount(amount: Decimal) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        '-'
    } else {
        '+'
    };
    let fixed = format!(
        "{:.2}",
        amount
            .abs()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    );
    let (units, cents) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        account::AccountKind,
        card::{CardTemplate, NewCard},
        clock::FixedClock,
        storage::MemoryStore,
    };
    use rust_decimal_macros::dec;

    fn user() -> User {
        User {
            id: 1,
            username: "jane".to_string(),
            email: None,
            full_name: None,
        }
    }

    fn remote(id: i64, kind: TransactionKind, amount: Decimal) -> RemoteTransaction {
        RemoteTransaction {
            id: TransactionId::from(id),
            kind,
            amount,
            description: None,
            date: None,
            from_account_id: None,
            to_account_id: None,
            from_user_id: None,
            to_user_id: None,
        }
    }

    fn page(content: Vec<RemoteTransaction>) -> Page<RemoteTransaction> {
        Page {
            total_elements: content.len() as u64,
            content,
            page: 0,
            size: 10,
            total_pages: 1,
        }
    }

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(dec!(1234.5)), "+$1,234.50");
        assert_eq!(format_amount(dec!(-30)), "-$30.00");
        assert_eq!(format_amount(dec!(0)), "+$0.00");
        assert_eq!(format_amount(dec!(1234567.891)), "+$1,234,567.89");
        assert_eq!(format_amount(dec!(-999.999)), "-$1,000.00");
    }

    #[test]
    fn format_amount_rounds_half_cents_away_from_zero() {
        assert_eq!(format_amount(dec!(0.125)), "+$0.13");
        assert_eq!(format_amount(dec!(-0.125)), "-$0.13");
        assert_eq!(format_amount(dec!(2.675)), "+$2.68");
    }

    #[test]
    fn build_labels_and_filters_by_user() {
        let accounts = vec![
            Account::new(AccountId::from(1), AccountKind::Checking, dec!(70), None),
            Account::new(AccountId::from(2), AccountKind::Savings, dec!(1200), None),
        ];

        let mut outgoing = remote(4, TransactionKind::Transfer, dec!(30));
        outgoing.from_account_id = Some(AccountId::from(1));
        outgoing.to_account_id = Some(AccountId::from(7));
        outgoing.from_user_id = Some(1);
        outgoing.to_user_id = Some(2);

        let mut incoming = remote(3, TransactionKind::Transfer, dec!(15));
        incoming.from_account_id = Some(AccountId::from(9));
        incoming.to_account_id = Some(AccountId::from(2));
        incoming.from_user_id = Some(3);

        let mut foreign = remote(2, TransactionKind::Transfer, dec!(99));
        foreign.from_account_id = Some(AccountId::from(8));
        foreign.to_account_id = Some(AccountId::from(9));
        foreign.from_user_id = Some(5);
        foreign.to_user_id = Some(6);

        let mut deposit = remote(1, TransactionKind::Deposit, dec!(1000));
        deposit.to_account_id = Some(AccountId::from(2));

        let dashboard = Dashboard::build(&user(), &accounts, &[], &page(vec![outgoing, incoming, foreign, deposit]));

        assert_eq!(dashboard.user.as_deref(), Some("jane"));
        assert_eq!(dashboard.total_balance, dec!(1270));
        assert_eq!(dashboard.card_count, 0);
        assert_eq!(dashboard.recent.len(), 3);

        let labels: Vec<&str> = dashboard.recent.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Transfer to #7", "Transfer from #9", "Deposit"]);
        assert_eq!(dashboard.recent[0].direction, Direction::Outgoing);
        assert_eq!(dashboard.recent[0].formatted_amount, "-$30.00");
        assert_eq!(dashboard.recent[1].amount, dec!(15));
        assert_eq!(dashboard.recent[2].formatted_amount, "+$1,000.00");
    }

    #[test]
    fn withdrawal_is_outgoing() {
        let mut withdrawal = remote(1, TransactionKind::Withdrawal, dec!(20));
        withdrawal.from_user_id = Some(1);
        let dashboard = Dashboard::build(&user(), &[], &[], &page(vec![withdrawal]));
        assert_eq!(dashboard.recent[0].label, "Withdrawal");
        assert_eq!(dashboard.recent[0].amount, dec!(-20));
    }

    #[test]
    fn from_ledger_uses_every_partition() {
        let mut ledger = Ledger::with_clock(
            Arc::new(MemoryStore::new()),
            FixedClock {
                millis: 1_000,
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            },
        );
        let checking = ledger.create_account(AccountKind::Checking, dec!(100)).unwrap();
        let savings = ledger.create_account(AccountKind::Savings, dec!(0)).unwrap();
        ledger.transfer(checking.id, savings.id, dec!(40), None).unwrap();
        ledger
            .add_card(NewCard::new(CardTemplate::Classic, "4000 0000 0000 0002", "02/27").unwrap())
            .unwrap();

        let dashboard = Dashboard::from_ledger(&ledger, None, 2).unwrap();
        assert_eq!(dashboard.accounts.len(), 4);
        assert_eq!(dashboard.total_balance, dec!(100));
        assert_eq!(dashboard.card_count, 1);
        assert_eq!(dashboard.recent.len(), 2);
        assert_eq!(dashboard.recent[0].label, "Transfer from #1");
        assert_eq!(dashboard.recent[0].formatted_amount, "+$40.00");
        assert_eq!(dashboard.recent[1].label, "Transfer to #2");
        assert_eq!(dashboard.recent[1].direction, Direction::Outgoing);
    }
}
